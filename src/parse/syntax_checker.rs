//! Structural validation of a token stream before parsing.
//!
//! Four checks run in order and the first violation is reported: quote
//! balance, unsupported operators, operator placement, and redirection
//! targets. Empty and whitespace-only streams are valid no-op lines.
use log::debug;

use crate::error::SyntaxError;
use crate::parse::{Token, TokenKind};

/// A token stream that passed `check_syntax`. The parser only accepts this
/// type, so unchecked input cannot reach it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckedTokens {
    tokens: Vec<Token>,
}

impl CheckedTokens {
    pub fn new(tokens: Vec<Token>) -> Result<Self, SyntaxError> {
        check_syntax(&tokens)?;
        Ok(CheckedTokens { tokens })
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn into_inner(self) -> Vec<Token> {
        self.tokens
    }
}

pub fn check_syntax(tokens: &[Token]) -> Result<(), SyntaxError> {
    let result = check_balanced_quotes(tokens)
        .and_then(|()| check_supported_operators(tokens))
        .and_then(|()| check_operators(tokens))
        .and_then(|()| check_redirections(tokens));
    if let Err(err) = &result {
        debug!("syntax check rejected line: {err:?}");
    }
    result
}

fn check_balanced_quotes(tokens: &[Token]) -> Result<(), SyntaxError> {
    for token in tokens {
        if let TokenKind::UnterminatedQuote(quote) = token.kind {
            return Err(SyntaxError::UnbalancedQuote {
                quote,
                position: token.position,
            });
        }
    }
    Ok(())
}

fn check_supported_operators(tokens: &[Token]) -> Result<(), SyntaxError> {
    match tokens.iter().find(|t| t.kind == TokenKind::Unknown) {
        Some(token) => Err(SyntaxError::UnsupportedOperator {
            operator: token.content.clone(),
            position: token.position,
        }),
        None => Ok(()),
    }
}

fn check_operators(tokens: &[Token]) -> Result<(), SyntaxError> {
    let mut seen_cmd = false;
    // Operator still waiting for a command on its right-hand side.
    let mut pending: Option<&Token> = None;

    for token in tokens.iter().filter(|t| !t.kind.is_whitespace()) {
        if token.kind.is_operator() {
            if !seen_cmd {
                return Err(dangling(token));
            }
            seen_cmd = false;
            pending = Some(token);
        } else if token.kind.is_word() {
            seen_cmd = true;
            pending = None;
        }
    }

    match pending {
        Some(token) => Err(dangling(token)),
        None => Ok(()),
    }
}

fn check_redirections(tokens: &[Token]) -> Result<(), SyntaxError> {
    for (idx, token) in tokens.iter().enumerate() {
        if token.kind.redirect_kind().is_none() {
            continue;
        }
        let target = tokens[idx + 1..].iter().find(|t| !t.kind.is_whitespace());
        match target {
            Some(next) if next.kind.is_word() => {}
            _ => {
                return Err(SyntaxError::MissingRedirectionTarget {
                    operator: token.content.clone(),
                    position: token.position,
                })
            }
        }
    }
    Ok(())
}

fn dangling(token: &Token) -> SyntaxError {
    SyntaxError::DanglingOperator {
        operator: token.content.clone(),
        position: token.position,
    }
}
