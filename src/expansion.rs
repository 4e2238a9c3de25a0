//! Variable expansion over a parsed command tree.
//!
//! Only references the parser marked with `VARIABLE_MARKER` are substituted,
//! so single-quoted and escaped dollars stay literal. Substituted values are
//! never rescanned and never split into fields. Heredoc delimiters are left
//! alone because they are compared literally against body lines.
use std::collections::HashMap;
use std::env;

use log::trace;

use crate::parse::{decode_marked, Command, Node, RedirectKind};

/// Read-only name to value lookup handed to the expander.
pub trait EnvLookup {
    /// Value of `name`, or the empty string when it is not set.
    fn lookup(&self, name: &str) -> String;
}

impl EnvLookup for HashMap<String, String> {
    fn lookup(&self, name: &str) -> String {
        self.get(name).cloned().unwrap_or_default()
    }
}

/// Reads the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvLookup for ProcessEnv {
    fn lookup(&self, name: &str) -> String {
        env::var(name).unwrap_or_default()
    }
}

/// Adapts a closure; `None` means unset.
pub struct LookupFn<F>(pub F);

impl<F> EnvLookup for LookupFn<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn lookup(&self, name: &str) -> String {
        (self.0)(name).unwrap_or_default()
    }
}

/// Substitutes variables in every command of the tree, in pre-order.
pub fn expand(tree: &mut Node, env: &dyn EnvLookup) {
    match tree {
        Node::Command(cmd) => expand_command(cmd, env),
        Node::Operator { left, right, .. } => {
            expand(left, env);
            expand(right, env);
        }
    }
}

fn expand_command(cmd: &mut Command, env: &dyn EnvLookup) {
    for arg in cmd.args.iter_mut() {
        *arg = expand_word(arg, env);
    }
    for redir in cmd.redirections.iter_mut() {
        if redir.kind == RedirectKind::Heredoc {
            continue;
        }
        redir.target = expand_word(&redir.target, env);
    }
}

/// Rebuilds `word` with each marked reference replaced by its value.
/// Doubled markers decode to the literal character the user typed.
pub fn expand_word(word: &str, env: &dyn EnvLookup) -> String {
    decode_marked(word, |source, name, out| {
        let value = env.lookup(name);
        trace!("expanded {source} to {value:?}");
        out.push_str(&value);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::{parse, tokenize, CheckedTokens, ParseOptions, VARIABLE_MARKER};

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn expanded(input: &str, env: &dyn EnvLookup) -> Node {
        let checked = CheckedTokens::new(tokenize(input)).unwrap();
        let mut tree = parse(&checked, &ParseOptions::default()).unwrap().unwrap();
        expand(&mut tree, env);
        tree
    }

    #[test]
    fn substitutes_home() {
        let env = vars(&[("HOME", "/home/der")]);
        let tree = expanded("echo $HOME", &env);
        assert_eq!(tree.as_command().unwrap().args, vec!["echo", "/home/der"]);
    }

    #[test]
    fn single_quotes_stay_literal() {
        let env = vars(&[("HOME", "/home/der")]);
        let tree = expanded("echo '$HOME' \\$HOME \"$HOME\"", &env);
        assert_eq!(
            tree.as_command().unwrap().args,
            vec!["echo", "$HOME", "$HOME", "/home/der"]
        );
    }

    #[test]
    fn undefined_is_empty() {
        let tree = expanded("echo a$NOPE-b \"$NOPE\"", &vars(&[]));
        assert_eq!(tree.as_command().unwrap().args, vec!["echo", "a-b", ""]);
    }

    #[test]
    fn names_are_case_sensitive() {
        let env = vars(&[("home", "lower")]);
        let tree = expanded("echo $HOME$home", &env);
        assert_eq!(tree.as_command().unwrap().args, vec!["echo", "lower"]);
    }

    #[test]
    fn quote_ends_the_name() {
        let env = vars(&[("X", "v"), ("Xabc", "wrong")]);
        let tree = expanded("echo \"$X\"abc ${X}abc $Xabc", &env);
        assert_eq!(
            tree.as_command().unwrap().args,
            vec!["echo", "vabc", "vabc", "wrong"]
        );
    }

    #[test]
    fn values_are_not_rescanned() {
        let env = vars(&[("A", "$B"), ("B", "nested")]);
        let tree = expanded("echo $A", &env);
        assert_eq!(tree.as_command().unwrap().args, vec!["echo", "$B"]);
    }

    #[test]
    fn redirections_expand_except_heredoc() {
        let env = vars(&[("F", "out.txt"), ("EOF", "nope")]);
        let tree = expanded("cat << $EOF > $F", &env);
        let cmd = tree.as_command().unwrap();
        assert_eq!(cmd.redirections[0].target, "$EOF");
        assert_eq!(cmd.redirections[1].target, "out.txt");
    }

    #[test]
    fn walks_every_leaf() {
        let env = vars(&[("A", "1"), ("B", "2"), ("C", "3")]);
        let tree = expanded("echo $A | cat $B && echo $C", &env);
        let args: Vec<Vec<String>> = tree.commands().iter().map(|c| c.args.clone()).collect();
        assert_eq!(
            args,
            vec![
                vec!["echo".to_string(), "1".to_string()],
                vec!["cat".to_string(), "2".to_string()],
                vec!["echo".to_string(), "3".to_string()],
            ]
        );
    }

    #[test]
    fn empty_lookup_keeps_literal_text() {
        let tree = expanded("printf 'a $b' x$Y.z \"<$Q>\"", &vars(&[]));
        assert_eq!(
            tree.as_command().unwrap().args,
            vec!["printf", "a $b", "x.z", "<>"]
        );
    }

    #[test]
    fn special_parameters_use_lookup() {
        let env = LookupFn(|name: &str| match name {
            "?" => Some("2".to_string()),
            "1" => Some("first".to_string()),
            _ => None,
        });
        let tree = expanded("echo $? $1 $2", &env);
        assert_eq!(
            tree.as_command().unwrap().args,
            vec!["echo", "2", "first", ""]
        );
    }

    #[test]
    fn unpaired_marker_is_dropped() {
        let word = format!("a{VARIABLE_MARKER}b");
        assert_eq!(expand_word(&word, &vars(&[])), "ab");
    }

    #[test]
    fn typed_markers_stay_literal() {
        let env = vars(&[("HOME", "/home/x")]);
        let tree = expanded("echo '\u{1e}${HOME}' a\u{1e}b \"\u{1e}$HOME\"", &env);
        assert_eq!(
            tree.as_command().unwrap().args,
            vec!["echo", "\u{1e}${HOME}", "a\u{1e}b", "\u{1e}/home/x"]
        );
    }

    #[test]
    fn braced_references_expand() {
        let env = vars(&[("X", "v")]);
        let tree = expanded("echo E${X}Y", &env);
        assert_eq!(tree.as_command().unwrap().args, vec!["echo", "EvY"]);
    }
}
