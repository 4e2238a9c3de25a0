//! Recursive-descent parser from a checked token stream to a command tree.
//!
//! ```text
//! logical  := pipeline ( ("&&" | "||") logical )?
//! pipeline := command ( "|" pipeline )?
//! command  := ( word | redirection word )*
//! ```
//!
//! Both binary levels recurse on the right, so `a | b | c` becomes
//! `pipe(a, pipe(b, c))`.
use log::trace;

use crate::error::ParseError;
use crate::parse::redirection_parser::take_redirection;
use crate::parse::{
    marked_variable, push_literal, variable_source, CheckedTokens, Command, Node, Operator, Token,
    TokenKind,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Reject commands that have redirections but no words (`> out.txt`).
    pub strict_empty_commands: bool,
}

/// Returns `Ok(None)` for a line with no commands (empty or whitespace only).
pub fn parse(tokens: &CheckedTokens, options: &ParseOptions) -> Result<Option<Node>, ParseError> {
    let mut parser = Parser {
        tokens: tokens.tokens(),
        pos: 0,
        options,
    };
    parser.skip_whitespace();
    if parser.peek().is_none() {
        return Ok(None);
    }
    let tree = parser.parse_logical()?;
    trace!("parsed tree: {tree}");
    Ok(Some(tree))
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    options: &'a ParseOptions,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn skip_whitespace(&mut self) {
        skip_whitespace(self.tokens, &mut self.pos);
    }

    fn parse_logical(&mut self) -> Result<Node, ParseError> {
        let left = self.parse_pipeline()?;
        self.skip_whitespace();
        let op = match self.peek().map(|t| t.kind) {
            Some(TokenKind::AndIf) => Operator::And,
            Some(TokenKind::OrIf) => Operator::Or,
            _ => return Ok(left),
        };
        self.pos += 1;
        let right = self.parse_logical()?;
        Ok(Node::operator(op, left, right))
    }

    fn parse_pipeline(&mut self) -> Result<Node, ParseError> {
        let left = self.parse_command()?;
        self.skip_whitespace();
        if self.peek().map(|t| t.kind) != Some(TokenKind::Pipe) {
            return Ok(left);
        }
        self.pos += 1;
        let right = self.parse_pipeline()?;
        Ok(Node::operator(Operator::Pipe, left, right))
    }

    fn parse_command(&mut self) -> Result<Node, ParseError> {
        self.skip_whitespace();
        let position = self.peek().map_or(0, |t| t.position);
        let mut cmd = Command::new();

        while let Some(token) = self.peek() {
            if token.kind.is_operator() {
                break;
            }
            if let Some(kind) = token.kind.redirect_kind() {
                self.pos += 1;
                let redir = take_redirection(self.tokens, &mut self.pos, kind);
                cmd.redirections.push(redir);
                continue;
            }
            if token.kind.is_word() {
                let arg = take_word(self.tokens, &mut self.pos, WordMode::Expandable);
                cmd.args.push(arg);
                continue;
            }
            // Whitespace; unknown operators never survive the checker.
            self.pos += 1;
        }

        if cmd.args.is_empty() && self.options.strict_empty_commands {
            return Err(ParseError::EmptyCommand { position });
        }
        Ok(Node::Command(cmd))
    }
}

#[derive(Copy, Clone, Eq, PartialEq)]
pub(super) enum WordMode {
    /// Variables become marked references for the expander.
    Expandable,
    /// The word is kept exactly as typed, variables included.
    Literal,
}

pub(super) fn skip_whitespace(tokens: &[Token], pos: &mut usize) {
    while tokens.get(*pos).is_some_and(|t| t.kind.is_whitespace()) {
        *pos += 1;
    }
}

/// Joins the run of word pieces starting at `pos` into one string.
pub(super) fn take_word(tokens: &[Token], pos: &mut usize, mode: WordMode) -> String {
    let mut word = String::new();
    while let Some(token) = tokens.get(*pos) {
        if !token.kind.is_word() {
            break;
        }
        match (token.kind, mode) {
            (TokenKind::Variable { braced }, WordMode::Expandable) => {
                word.push_str(&marked_variable(&token.content, braced));
            }
            (TokenKind::Variable { braced }, WordMode::Literal) => {
                word.push_str(&variable_source(&token.content, braced));
            }
            (_, WordMode::Expandable) => push_literal(&mut word, &token.content),
            (_, WordMode::Literal) => word.push_str(&token.content),
        }
        *pos += 1;
    }
    word
}
