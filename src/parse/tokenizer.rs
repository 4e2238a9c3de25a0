//! Tokenizer for shell input.
//!
//! Emits a flat, typed token stream. Whitespace is kept as tokens so later
//! stages can tell glued word pieces (`a"b"`) from separate words. Quoting
//! problems never fail here: an unclosed quote becomes an
//! `UnterminatedQuote` token and the syntax checker reports it.
use log::trace;

use crate::parse::{Quote, Token, TokenKind};
use crate::utils::{is_special_param, is_valid_var_name, is_var_char, is_var_start};

pub fn tokenize(input: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(input);
    lexer.run();
    trace!("tokenized {} tokens from {:?}", lexer.tokens.len(), input);
    lexer.tokens
}

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    tokens: Vec<Token>,
    // The current command already has its command-name word.
    have_command: bool,
    // Words are being read as the target of the last redirection operator.
    redirect_target: bool,
    // Inside a run of glued word pieces.
    in_word: bool,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Lexer {
            input,
            pos: 0,
            tokens: Vec::new(),
            have_command: false,
            redirect_target: false,
            in_word: false,
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.input[self.pos..].chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn push(&mut self, kind: TokenKind, content: impl Into<String>, position: usize) {
        self.tokens.push(Token::new(kind, content, position));
    }

    fn run(&mut self) {
        while let Some(ch) = self.peek() {
            match ch {
                ' ' | '\t' | '\n' | '\r' => {
                    let start = self.pos;
                    self.bump();
                    self.end_word();
                    let kind = match ch {
                        ' ' => TokenKind::Space,
                        '\t' => TokenKind::Tab,
                        _ => TokenKind::Newline,
                    };
                    self.push(kind, ch.to_string(), start);
                }
                '|' | '&' | '<' | '>' | ';' | '(' | ')' => {
                    self.end_word();
                    self.read_operator();
                }
                '\'' => self.read_single_quoted(),
                '"' => self.read_double_quoted(),
                _ => self.read_bare_word(),
            }
        }
    }

    fn end_word(&mut self) {
        if self.in_word {
            self.in_word = false;
            self.redirect_target = false;
        }
    }

    /// Records that a word piece was emitted and decides its kind when it is
    /// a bare word.
    fn begin_piece(&mut self) -> TokenKind {
        let continuing = std::mem::replace(&mut self.in_word, true);
        if self.redirect_target || continuing || self.have_command {
            return TokenKind::Argument;
        }
        self.have_command = true;
        TokenKind::Command
    }

    fn read_operator(&mut self) {
        let start = self.pos;
        let Some(first) = self.bump() else {
            return;
        };
        // Two-character operators win over their one-character prefixes.
        let doubled = matches!(first, '|' | '&' | '<' | '>') && self.peek() == Some(first);
        if doubled {
            self.bump();
        }
        let kind = match (first, doubled) {
            ('|', false) => TokenKind::Pipe,
            ('|', true) => TokenKind::OrIf,
            ('&', true) => TokenKind::AndIf,
            ('<', false) => TokenKind::RedirectIn,
            ('<', true) => TokenKind::Heredoc,
            ('>', false) => TokenKind::RedirectOut,
            ('>', true) => TokenKind::Append,
            _ => TokenKind::Unknown,
        };
        if kind.is_operator() {
            self.have_command = false;
            self.redirect_target = false;
        } else if kind.redirect_kind().is_some() {
            self.redirect_target = true;
        }
        let input = self.input;
        self.push(kind, &input[start..self.pos], start);
    }

    fn read_single_quoted(&mut self) {
        let start = self.pos;
        self.bump();
        self.begin_piece();
        let rest = &self.input[self.pos..];
        match rest.find('\'') {
            Some(end) => {
                let content = rest[..end].to_string();
                self.pos += end + 1;
                self.push(TokenKind::SingleQuoted, content, start);
            }
            None => {
                let content = rest.to_string();
                self.pos = self.input.len();
                self.push(TokenKind::UnterminatedQuote(Quote::Single), content, start);
            }
        }
    }

    fn read_double_quoted(&mut self) {
        let start = self.pos;
        self.bump();
        self.begin_piece();
        let mut text = String::new();
        let mut text_start = start;
        // An empty `""` still has to produce a (empty) word piece.
        let mut emitted = false;

        loop {
            match self.peek() {
                None => {
                    self.push(TokenKind::UnterminatedQuote(Quote::Double), text, start);
                    return;
                }
                Some('"') => {
                    self.bump();
                    if !text.is_empty() || !emitted {
                        self.push(TokenKind::DoubleQuoted, text, text_start);
                    }
                    return;
                }
                Some('\\') => {
                    self.bump();
                    match self.bump() {
                        Some(next) => text.push(next),
                        None => text.push('\\'),
                    }
                }
                Some('$') => {
                    if let Some((name, len, braced)) = self.scan_variable() {
                        if !text.is_empty() {
                            let piece = std::mem::take(&mut text);
                            self.push(TokenKind::DoubleQuoted, piece, text_start);
                        }
                        let var_start = self.pos;
                        self.pos += len;
                        self.push(TokenKind::Variable { braced }, name, var_start);
                        emitted = true;
                        text_start = self.pos;
                    } else {
                        self.bump();
                        text.push('$');
                    }
                }
                Some(ch) => {
                    self.bump();
                    text.push(ch);
                }
            }
        }
    }

    fn read_bare_word(&mut self) {
        let mut word = String::new();
        let mut word_start = self.pos;

        while let Some(ch) = self.peek() {
            match ch {
                ' ' | '\t' | '\n' | '\r' | '|' | '&' | '<' | '>' | ';' | '(' | ')' | '\''
                | '"' => break,
                '\\' => {
                    self.bump();
                    match self.bump() {
                        Some(next) => word.push(next),
                        None => word.push('\\'),
                    }
                }
                '$' => {
                    if let Some((name, len, braced)) = self.scan_variable() {
                        if !word.is_empty() {
                            let piece = std::mem::take(&mut word);
                            self.push_bare(piece, word_start);
                        }
                        let var_start = self.pos;
                        self.begin_piece();
                        self.pos += len;
                        self.push(TokenKind::Variable { braced }, name, var_start);
                        word_start = self.pos;
                    } else {
                        self.bump();
                        word.push('$');
                    }
                }
                _ => {
                    self.bump();
                    word.push(ch);
                }
            }
        }

        if !word.is_empty() {
            self.push_bare(word, word_start);
        }
    }

    fn push_bare(&mut self, word: String, start: usize) {
        let kind = self.begin_piece();
        self.push(kind, word, start);
    }

    /// With `pos` on a `$`, returns the referenced name, the byte length of
    /// the whole reference and whether it was braced, or `None` when the
    /// dollar is literal.
    fn scan_variable(&self) -> Option<(String, usize, bool)> {
        let rest = &self.input[self.pos + 1..];
        let first = self.peek_second()?;
        if is_var_start(first) {
            let name: String = rest.chars().take_while(|ch| is_var_char(*ch)).collect();
            let len = 1 + name.len();
            return Some((name, len, false));
        }
        if is_special_param(first) {
            return Some((first.to_string(), 2, false));
        }
        if first == '{' {
            let close = rest.find('}')?;
            let name = &rest[1..close];
            let special = name.len() == 1 && name.chars().all(is_special_param);
            if is_valid_var_name(name) || special {
                return Some((name.to_string(), 1 + close + 1, true));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn significant(input: &str) -> Vec<(TokenKind, String)> {
        tokenize(input)
            .into_iter()
            .filter(|t| !t.kind.is_whitespace())
            .map(|t| (t.kind, t.content))
            .collect()
    }

    fn kinds(input: &str) -> Vec<TokenKind> {
        significant(input).into_iter().map(|(k, _)| k).collect()
    }

    #[test]
    fn tokenize_basic() {
        let tokens = tokenize("ls -la /tmp");
        let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Command,
                TokenKind::Space,
                TokenKind::Argument,
                TokenKind::Space,
                TokenKind::Argument
            ]
        );
        assert_eq!(tokens[4].content, "/tmp");
        assert_eq!(tokens[4].position, 7);
    }

    #[test]
    fn pipe_restarts_command_slot() {
        assert_eq!(
            significant("a | b"),
            vec![
                (TokenKind::Command, "a".to_string()),
                (TokenKind::Pipe, "|".to_string()),
                (TokenKind::Command, "b".to_string()),
            ]
        );
    }

    #[test]
    fn two_char_operators_are_greedy() {
        assert_eq!(
            kinds("a&&b||c>>d<<e>f<g|h"),
            vec![
                TokenKind::Command,
                TokenKind::AndIf,
                TokenKind::Command,
                TokenKind::OrIf,
                TokenKind::Command,
                TokenKind::Append,
                TokenKind::Argument,
                TokenKind::Heredoc,
                TokenKind::Argument,
                TokenKind::RedirectOut,
                TokenKind::Argument,
                TokenKind::RedirectIn,
                TokenKind::Argument,
                TokenKind::Pipe,
                TokenKind::Command,
            ]
        );
    }

    #[test]
    fn quotes_are_stripped() {
        assert_eq!(
            significant("echo \"x\" 'y'"),
            vec![
                (TokenKind::Command, "echo".to_string()),
                (TokenKind::DoubleQuoted, "x".to_string()),
                (TokenKind::SingleQuoted, "y".to_string()),
            ]
        );
    }

    #[test]
    fn single_quotes_keep_dollar_literal() {
        assert_eq!(
            significant("echo '$HOME \\n'"),
            vec![
                (TokenKind::Command, "echo".to_string()),
                (TokenKind::SingleQuoted, "$HOME \\n".to_string()),
            ]
        );
    }

    #[test]
    fn double_quotes_mark_variables() {
        assert_eq!(
            significant("echo \"hi $USER!\""),
            vec![
                (TokenKind::Command, "echo".to_string()),
                (TokenKind::DoubleQuoted, "hi ".to_string()),
                (TokenKind::Variable { braced: false }, "USER".to_string()),
                (TokenKind::DoubleQuoted, "!".to_string()),
            ]
        );
        assert_eq!(
            significant("echo \"$X\""),
            vec![
                (TokenKind::Command, "echo".to_string()),
                (TokenKind::Variable { braced: false }, "X".to_string()),
            ]
        );
    }

    #[test]
    fn empty_double_quotes_make_a_piece() {
        assert_eq!(
            significant("echo \"\""),
            vec![
                (TokenKind::Command, "echo".to_string()),
                (TokenKind::DoubleQuoted, String::new()),
            ]
        );
    }

    #[test]
    fn special_and_braced_parameters() {
        assert_eq!(
            significant("echo $? $1x ${HOME}y"),
            vec![
                (TokenKind::Command, "echo".to_string()),
                (TokenKind::Variable { braced: false }, "?".to_string()),
                (TokenKind::Variable { braced: false }, "1".to_string()),
                (TokenKind::Argument, "x".to_string()),
                (TokenKind::Variable { braced: true }, "HOME".to_string()),
                (TokenKind::Argument, "y".to_string()),
            ]
        );
    }

    #[test]
    fn lone_dollar_is_literal() {
        assert_eq!(
            significant("echo $ a$ $- ${1x}"),
            vec![
                (TokenKind::Command, "echo".to_string()),
                (TokenKind::Argument, "$".to_string()),
                (TokenKind::Argument, "a$".to_string()),
                (TokenKind::Argument, "$-".to_string()),
                (TokenKind::Argument, "${1x}".to_string()),
            ]
        );
    }

    #[test]
    fn backslash_escapes_next_char() {
        assert_eq!(
            significant("echo foo\\ bar \\| \\$HOME \"a\\\"b\" end\\"),
            vec![
                (TokenKind::Command, "echo".to_string()),
                (TokenKind::Argument, "foo bar".to_string()),
                (TokenKind::Argument, "|".to_string()),
                (TokenKind::Argument, "$HOME".to_string()),
                (TokenKind::DoubleQuoted, "a\"b".to_string()),
                (TokenKind::Argument, "end\\".to_string()),
            ]
        );
    }

    #[test]
    fn unterminated_quotes_are_tokens() {
        let tokens = tokenize("echo 'abc");
        let last = tokens.last().unwrap();
        assert_eq!(last.kind, TokenKind::UnterminatedQuote(Quote::Single));
        assert_eq!(last.content, "abc");
        assert_eq!(last.position, 5);

        let tokens = tokenize("echo \"a $B");
        let last = tokens.last().unwrap();
        assert_eq!(last.kind, TokenKind::UnterminatedQuote(Quote::Double));
        assert_eq!(last.position, 5);
    }

    #[test]
    fn redirection_target_does_not_take_command_slot() {
        assert_eq!(
            significant("> out.txt cat"),
            vec![
                (TokenKind::RedirectOut, ">".to_string()),
                (TokenKind::Argument, "out.txt".to_string()),
                (TokenKind::Command, "cat".to_string()),
            ]
        );
        assert_eq!(
            kinds("> \"o\"x cat"),
            vec![
                TokenKind::RedirectOut,
                TokenKind::DoubleQuoted,
                TokenKind::Argument,
                TokenKind::Command,
            ]
        );
    }

    #[test]
    fn quoted_program_fills_command_slot() {
        assert_eq!(
            kinds("'ls' -l"),
            vec![TokenKind::SingleQuoted, TokenKind::Argument]
        );
    }

    #[test]
    fn whitespace_only() {
        let tokens = tokenize(" \t\n\r");
        assert_eq!(
            tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
            vec![
                TokenKind::Space,
                TokenKind::Tab,
                TokenKind::Newline,
                TokenKind::Newline
            ]
        );
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn unsupported_operators_are_unknown() {
        assert_eq!(
            significant("a ; b & (c)"),
            vec![
                (TokenKind::Command, "a".to_string()),
                (TokenKind::Unknown, ";".to_string()),
                (TokenKind::Argument, "b".to_string()),
                (TokenKind::Unknown, "&".to_string()),
                (TokenKind::Unknown, "(".to_string()),
                (TokenKind::Argument, "c".to_string()),
                (TokenKind::Unknown, ")".to_string()),
            ]
        );
    }

    #[test]
    fn multibyte_positions() {
        let tokens = tokenize("é | ü");
        let pipe = tokens.iter().find(|t| t.kind == TokenKind::Pipe).unwrap();
        assert_eq!(pipe.position, 3);
    }
}
