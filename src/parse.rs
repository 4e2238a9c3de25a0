//! Token vocabulary and command tree shared by the front-end stages.
//!
//! Sentinel markers preserve intent across parsing and expansion:
//! - `VARIABLE_MARKER` brackets the source text of a reference the expander
//!   must substitute (`\x1e$NAME\x1e`). A `$` outside a bracketed pair came
//!   from single quotes, an escape or a lone dollar sign and is always literal.
//! - A marker typed by the user is stored doubled, so it can never open a
//!   reference.
use std::fmt;

pub const VARIABLE_MARKER: char = '\x1e';

mod command_parser;
mod redirection_parser;
mod syntax_checker;
mod tokenizer;

pub use command_parser::{parse, ParseOptions};
pub use syntax_checker::{check_syntax, CheckedTokens};
pub use tokenizer::tokenize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quote {
    Single,
    Double,
}

impl Quote {
    pub fn as_char(self) -> char {
        match self {
            Quote::Single => '\'',
            Quote::Double => '"',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Command,
    Argument,
    SingleQuoted,
    DoubleQuoted,
    /// Content is the name; `braced` records the `${NAME}` spelling.
    Variable { braced: bool },
    Pipe,
    AndIf,
    OrIf,
    RedirectIn,
    RedirectOut,
    Append,
    Heredoc,
    Space,
    Tab,
    Newline,
    /// Quote span cut off by end of input; content is the text read so far.
    UnterminatedQuote(Quote),
    Unknown,
}

impl TokenKind {
    pub fn is_whitespace(self) -> bool {
        matches!(self, TokenKind::Space | TokenKind::Tab | TokenKind::Newline)
    }

    /// Tokens that contribute text to an argument or redirection target.
    pub fn is_word(self) -> bool {
        matches!(
            self,
            TokenKind::Command
                | TokenKind::Argument
                | TokenKind::SingleQuoted
                | TokenKind::DoubleQuoted
                | TokenKind::Variable { .. }
                | TokenKind::UnterminatedQuote(_)
        )
    }

    /// Pipeline and logical operators.
    pub fn is_operator(self) -> bool {
        matches!(self, TokenKind::Pipe | TokenKind::AndIf | TokenKind::OrIf)
    }

    pub fn redirect_kind(self) -> Option<RedirectKind> {
        match self {
            TokenKind::RedirectIn => Some(RedirectKind::Input),
            TokenKind::RedirectOut => Some(RedirectKind::Output),
            TokenKind::Append => Some(RedirectKind::Append),
            TokenKind::Heredoc => Some(RedirectKind::Heredoc),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Command => "CMD",
            TokenKind::Argument => "ARG",
            TokenKind::SingleQuoted => "SQUOTE",
            TokenKind::DoubleQuoted => "DQUOTE",
            TokenKind::Variable { .. } => "VAR",
            TokenKind::Pipe => "PIPE",
            TokenKind::AndIf => "AND_IF",
            TokenKind::OrIf => "OR_IF",
            TokenKind::RedirectIn => "REDIR_IN",
            TokenKind::RedirectOut => "REDIR_OUT",
            TokenKind::Append => "APPEND",
            TokenKind::Heredoc => "HEREDOC",
            TokenKind::Space => "SPACE",
            TokenKind::Tab => "TAB",
            TokenKind::Newline => "NEW_LINE",
            TokenKind::UnterminatedQuote(_) => "UNTERMINATED",
            TokenKind::Unknown => "UNKNOWN",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub content: String,
    /// Byte offset of the token's first character in the input line.
    pub position: usize,
}

impl Token {
    pub fn new(kind: TokenKind, content: impl Into<String>, position: usize) -> Self {
        Token {
            kind,
            content: content.into(),
            position,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}] '{}'", self.kind.name(), self.content)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectKind {
    Input,
    Output,
    Append,
    Heredoc,
}

impl RedirectKind {
    pub fn symbol(self) -> &'static str {
        match self {
            RedirectKind::Input => "<",
            RedirectKind::Output => ">",
            RedirectKind::Append => ">>",
            RedirectKind::Heredoc => "<<",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirection {
    pub kind: RedirectKind,
    /// File name, or the delimiter for heredocs.
    pub target: String,
    /// Filled in by the execution layer once the target is opened.
    pub fd: Option<i32>,
}

impl Redirection {
    pub fn new(kind: RedirectKind, target: impl Into<String>) -> Self {
        Redirection {
            kind,
            target: target.into(),
            fd: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Command {
    /// `args[0]` is the program name when present.
    pub args: Vec<String>,
    pub redirections: Vec<Redirection>,
    /// Set by the command resolver, never by the parser.
    pub is_builtin: bool,
}

impl Command {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn program(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let args: Vec<String> = self.args.iter().map(|arg| strip_markers(arg)).collect();
        write!(f, "{:?}", args)?;
        for redir in &self.redirections {
            // Heredoc delimiters are stored as typed, without markers.
            let target = match redir.kind {
                RedirectKind::Heredoc => redir.target.clone(),
                _ => strip_markers(&redir.target),
            };
            write!(f, " {} {:?}", redir.kind.symbol(), target)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Pipe,
    And,
    Or,
}

impl Operator {
    pub fn name(self) -> &'static str {
        match self {
            Operator::Pipe => "pipe",
            Operator::And => "and_if",
            Operator::Or => "or_if",
        }
    }
}

/// Binary command tree. Every leaf is a `Command`; operator nodes own both
/// children, so dropping the root frees the whole tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Command(Command),
    Operator {
        op: Operator,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    pub fn operator(op: Operator, left: Node, right: Node) -> Self {
        Node::Operator {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn as_command(&self) -> Option<&Command> {
        match self {
            Node::Command(cmd) => Some(cmd),
            Node::Operator { .. } => None,
        }
    }

    /// Leaves in left-to-right order.
    pub fn commands(&self) -> Vec<&Command> {
        let mut out = Vec::new();
        self.collect_commands(&mut out);
        out
    }

    fn collect_commands<'a>(&'a self, out: &mut Vec<&'a Command>) {
        match self {
            Node::Command(cmd) => out.push(cmd),
            Node::Operator { left, right, .. } => {
                left.collect_commands(out);
                right.collect_commands(out);
            }
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Node::Command(cmd) => write!(f, "{}", cmd),
            Node::Operator { op, left, right } => {
                write!(f, "{}({}, {})", op.name(), left, right)
            }
        }
    }
}

/// Render a not-yet-expanded string the way it was typed: marked references
/// become their `$NAME` or `${NAME}` source again.
pub fn strip_markers(input: &str) -> String {
    decode_marked(input, |source, _name, out| out.push_str(source))
}

/// Source text of a variable reference.
pub(crate) fn variable_source(name: &str, braced: bool) -> String {
    if braced {
        format!("${{{name}}}")
    } else {
        format!("${name}")
    }
}

/// A live reference: the marker, its source text, then a closing marker.
pub(crate) fn marked_variable(name: &str, braced: bool) -> String {
    format!("{VARIABLE_MARKER}{}{VARIABLE_MARKER}", variable_source(name, braced))
}

/// Appends user text, doubling any marker so it decodes back to itself.
pub(crate) fn push_literal(word: &mut String, text: &str) {
    for ch in text.chars() {
        if ch == VARIABLE_MARKER {
            word.push(VARIABLE_MARKER);
        }
        word.push(ch);
    }
}

/// Walks a marked string, copying literal text to the output and handing
/// each reference's `(source, name)` to `reference`.
pub(crate) fn decode_marked<F>(input: &str, mut reference: F) -> String
where
    F: FnMut(&str, &str, &mut String),
{
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(idx) = rest.find(VARIABLE_MARKER) {
        out.push_str(&rest[..idx]);
        let after = &rest[idx + VARIABLE_MARKER.len_utf8()..];
        if let Some(tail) = after.strip_prefix(VARIABLE_MARKER) {
            out.push(VARIABLE_MARKER);
            rest = tail;
            continue;
        }
        let closed = after.strip_prefix('$').and_then(|_| after.find(VARIABLE_MARKER));
        let Some(close) = closed else {
            // Unpaired marker; drop it.
            rest = after;
            continue;
        };
        let source = &after[..close];
        let name = source[1..]
            .strip_prefix('{')
            .and_then(|braced| braced.strip_suffix('}'))
            .unwrap_or(&source[1..]);
        reference(source, name, &mut out);
        rest = &after[close + VARIABLE_MARKER.len_utf8()..];
    }
    out.push_str(rest);
    out
}
