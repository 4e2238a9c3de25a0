pub fn is_var_start(ch: char) -> bool {
    ch == '_' || ch.is_ascii_alphabetic()
}

pub fn is_var_char(ch: char) -> bool {
    ch == '_' || ch.is_ascii_alphanumeric()
}

/// `?` and single digits are one-character special parameters.
pub fn is_special_param(ch: char) -> bool {
    ch == '?' || ch.is_ascii_digit()
}

pub fn is_valid_var_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if is_var_start(first) => chars.all(is_var_char),
        _ => false,
    }
}
