use crate::parse::command_parser::{skip_whitespace, take_word, WordMode};
use crate::parse::{RedirectKind, Redirection, Token};

/// Reads the target that follows a redirection operator. `pos` must point
/// just past the operator.
pub(crate) fn take_redirection(
    tokens: &[Token],
    pos: &mut usize,
    kind: RedirectKind,
) -> Redirection {
    skip_whitespace(tokens, pos);
    // Heredoc delimiters are matched as typed against body lines later.
    let mode = match kind {
        RedirectKind::Heredoc => WordMode::Literal,
        RedirectKind::Input | RedirectKind::Output | RedirectKind::Append => WordMode::Expandable,
    };
    let target = take_word(tokens, pos, mode);
    Redirection::new(kind, target)
}
