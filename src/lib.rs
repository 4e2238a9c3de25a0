//! Shell front-end: turns one input line into a validated command tree.
//!
//! The four stages run in order, each consuming the previous one's output:
//! `tokenize` → `check_syntax` (via `CheckedTokens`) → `parse` → `expand`.
//! `parse_line` runs all of them. Execution, job control and heredoc bodies
//! belong to the caller.

pub mod config;
pub mod error;
mod expansion;
mod parse;
mod utils;

use log::debug;

pub use error::{ErrorKind, ParseError, ShellError, ShellResult, SyntaxError};
pub use expansion::{expand, expand_word, EnvLookup, LookupFn, ProcessEnv};
pub use parse::{
    check_syntax, parse, strip_markers, tokenize, CheckedTokens, Command, Node, Operator,
    ParseOptions, Quote, RedirectKind, Redirection, Token, TokenKind, VARIABLE_MARKER,
};

/// Tokenize, check, parse and expand one line. `Ok(None)` means the line
/// held no command.
pub fn parse_line(
    input: &str,
    options: &ParseOptions,
    env: &dyn EnvLookup,
) -> ShellResult<Option<Node>> {
    let tokens = tokenize(input);
    let checked = CheckedTokens::new(tokens)?;
    let Some(mut tree) = parse(&checked, options)? else {
        debug!("no command in line");
        return Ok(None);
    };
    expand(&mut tree, env);
    debug!("command tree: {tree}");
    Ok(Some(tree))
}

/// Fuzz helper for parser-only targets.
pub fn fuzz_parse_bytes(data: &[u8]) {
    let input = String::from_utf8_lossy(data);
    let tokens = tokenize(&input);
    if let Ok(checked) = CheckedTokens::new(tokens) {
        let _ = parse(&checked, &ParseOptions::default());
        let _ = parse(
            &checked,
            &ParseOptions {
                strict_empty_commands: true,
            },
        );
    }
}

/// Fuzz helper for parser+expansion targets.
pub fn fuzz_expand_bytes(data: &[u8]) {
    let input = String::from_utf8_lossy(data);
    let env = LookupFn(|name: &str| Some(format!("<{name}>")));
    let _ = parse_line(&input, &ParseOptions::default(), &env);
}
