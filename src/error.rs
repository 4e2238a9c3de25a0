//! Error types and reporting for the shell front-end.
//!
//! Each stage reports its own structured error:
//! - `SyntaxError` from the syntax checker (the lexer never fails)
//! - `ParseError` from the parser
//!
//! Both convert into `ShellError`, which adds a stage kind, an optional hint
//! and the byte position in the input line so the caller can point at it.

use std::fmt;

use crate::parse::Quote;

/// Categorized error types for better diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The token sequence is not structurally well-formed
    Syntax,
    /// The parser refused a checked token sequence
    Parse,
    /// Error loading/parsing configuration
    Config,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ErrorKind::Syntax => write!(f, "Syntax error"),
            ErrorKind::Parse => write!(f, "Parse error"),
            ErrorKind::Config => write!(f, "Config error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    /// A quote span reached end of input without its closing quote.
    UnbalancedQuote { quote: Quote, position: usize },
    /// `|`, `&&` or `||` with no command before or after it.
    DanglingOperator { operator: String, position: usize },
    /// Redirection operator not followed by a word.
    MissingRedirectionTarget { operator: String, position: usize },
    /// Operator characters this shell does not implement (`&`, `;`, `(`, `)`).
    UnsupportedOperator { operator: String, position: usize },
}

impl SyntaxError {
    pub fn position(&self) -> usize {
        match self {
            SyntaxError::UnbalancedQuote { position, .. }
            | SyntaxError::DanglingOperator { position, .. }
            | SyntaxError::MissingRedirectionTarget { position, .. }
            | SyntaxError::UnsupportedOperator { position, .. } => *position,
        }
    }

    fn hint(&self) -> &'static str {
        match self {
            SyntaxError::UnbalancedQuote { .. } => "Close the quote before the end of the line",
            SyntaxError::DanglingOperator { .. } => "Operators need a command on both sides",
            SyntaxError::MissingRedirectionTarget { .. } => {
                "Expected: cmd > filename, cmd < filename or cmd << DELIMITER"
            }
            SyntaxError::UnsupportedOperator { .. } => {
                "Supported operators: |, &&, ||, <, >, >>, <<"
            }
        }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SyntaxError::UnbalancedQuote { quote, .. } => {
                write!(f, "Unterminated {} quote", quote.as_char())
            }
            SyntaxError::DanglingOperator { operator, .. } => {
                write!(f, "Unexpected operator '{}'", operator)
            }
            SyntaxError::MissingRedirectionTarget { operator, .. } => {
                write!(f, "Missing target after '{}'", operator)
            }
            SyntaxError::UnsupportedOperator { operator, .. } => {
                write!(f, "Unsupported operator '{}'", operator)
            }
        }
    }
}

impl std::error::Error for SyntaxError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Only raised when `ParseOptions::strict_empty_commands` is set.
    EmptyCommand { position: usize },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParseError::EmptyCommand { .. } => write!(f, "Command has no program name"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Rich error type with context information
#[derive(Debug, Clone)]
pub struct ShellError {
    pub kind: ErrorKind,
    pub message: String,
    /// Additional context explaining what was being processed
    pub context: Option<String>,
    /// Byte position in input where the error occurred
    pub position: Option<usize>,
}

impl ShellError {
    /// Create a new error with just the kind and message
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        ShellError {
            kind,
            message: message.into(),
            context: None,
            position: None,
        }
    }

    /// Add context string (e.g., "Expected: cmd < filename")
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add byte position in input where error occurred
    pub fn with_position(mut self, pos: usize) -> Self {
        self.position = Some(pos);
        self
    }

    /// Format error with a snippet of the input showing where the problem is
    pub fn display_with_input(&self, input: &str) -> String {
        let mut msg = format!("{}: {}", self.kind, self.message);

        if let Some(pos) = self.position {
            if pos < input.len() {
                let start = floor_char_boundary(input, pos.saturating_sub(15));
                let end = floor_char_boundary(input, (pos + 15).min(input.len()));
                let end = if end <= pos { input.len() } else { end };
                let snippet = &input[start..end];

                msg.push_str(&format!("\n  near: '{}'", snippet.replace('\n', "↵")));
                msg.push('\n');

                let offset = input[start..pos].chars().count();
                msg.push_str(&format!("  {}{}", " ".repeat(offset + 9), "^"));
            } else {
                msg.push_str(&format!("\n  at position {} (end of input)", pos));
            }
        }
        if let Some(context) = &self.context {
            msg.push_str(&format!("\n  hint: {}", context));
        }

        msg
    }

    /// Simplified display without input context
    pub fn display_simple(&self) -> String {
        let mut msg = format!("{}: {}", self.kind, self.message);
        if let Some(context) = &self.context {
            msg.push_str(&format!("\n  hint: {}", context));
        }
        msg
    }
}

impl fmt::Display for ShellError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.display_simple())
    }
}

impl std::error::Error for ShellError {}

impl From<SyntaxError> for ShellError {
    fn from(err: SyntaxError) -> Self {
        ShellError::new(ErrorKind::Syntax, err.to_string())
            .with_context(err.hint())
            .with_position(err.position())
    }
}

impl From<ParseError> for ShellError {
    fn from(err: ParseError) -> Self {
        let ParseError::EmptyCommand { position } = &err;
        let position = *position;
        ShellError::new(ErrorKind::Parse, err.to_string())
            .with_context("Strict mode rejects redirections without a command")
            .with_position(position)
    }
}

/// Convenience type alias for Results with ShellError
pub type ShellResult<T> = Result<T, ShellError>;

fn floor_char_boundary(input: &str, mut idx: usize) -> usize {
    while idx > 0 && !input.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}
