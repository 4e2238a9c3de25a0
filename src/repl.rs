use std::collections::HashMap;
use std::env;
use std::io;

use log::{debug, warn};
use rustyline::config::Configurer;
use rustyline::{DefaultEditor, EditMode};

use minishell::config::{self, Config};
use minishell::{parse_line, tokenize, EnvLookup, ProcessEnv};

use crate::io_helpers::read_input_line;

/// Status reported for a line the front-end rejected.
pub(crate) const SYNTAX_STATUS: i32 = 2;

pub(crate) struct ShellState {
    pub(crate) config: Config,
    pub(crate) last_status: i32,
}

impl ShellState {
    pub(crate) fn new(config: Config) -> Self {
        ShellState {
            config,
            last_status: 0,
        }
    }
}

/// `$?` first, then config exports, then the process environment.
struct ShellEnv<'a> {
    exports: &'a HashMap<String, String>,
    last_status: i32,
}

impl EnvLookup for ShellEnv<'_> {
    fn lookup(&self, name: &str) -> String {
        if name == "?" {
            return self.last_status.to_string();
        }
        match self.exports.get(name) {
            Some(value) => value.clone(),
            None => ProcessEnv.lookup(name),
        }
    }
}

/// Runs one line through the front-end and prints the resulting tree.
pub(crate) fn run_line(state: &mut ShellState, line: &str) {
    if state.config.show_tokens {
        println!("TOKEN LIST:");
        for token in tokenize(line) {
            println!("{token}");
        }
    }

    let env = ShellEnv {
        exports: &state.config.exports,
        last_status: state.last_status,
    };
    match parse_line(line, &state.config.parse_options(), &env) {
        Ok(Some(tree)) => {
            println!("{tree}");
            state.last_status = 0;
        }
        Ok(None) => {}
        Err(err) => {
            eprintln!("minishell: {}", err.display_with_input(line));
            state.last_status = SYNTAX_STATUS;
        }
    }
}

pub(crate) fn run(state: &mut ShellState, interactive: bool) -> io::Result<i32> {
    let mut editor = build_editor(&state.config)?;
    let history_path = state.config.history_file.clone();
    if interactive {
        if let Some(path) = &history_path {
            if let Err(err) = editor.load_history(path) {
                debug!("history not loaded from {}: {err}", path.display());
            }
        }
    }

    loop {
        let prompt = if interactive {
            state.config.prompt.as_str()
        } else {
            ""
        };
        let Some(line) = read_input_line(&mut editor, interactive, prompt)? else {
            break;
        };
        run_line(state, &line);
    }

    if interactive {
        println!();
        if let Some(path) = &history_path {
            if let Err(err) = editor.save_history(path) {
                warn!("failed to save history to {}: {err}", path.display());
            }
        }
    }
    Ok(state.last_status)
}

fn build_editor(config: &Config) -> io::Result<DefaultEditor> {
    let edit_mode = match env::var("MINISHELL_EDITMODE").ok().as_deref() {
        Some("vi") | Some("VI") => EditMode::Vi,
        Some("emacs") | Some("EMACS") => EditMode::Emacs,
        _ => match config.edit_mode {
            config::EditMode::Vi => EditMode::Vi,
            config::EditMode::Emacs => EditMode::Emacs,
        },
    };
    let mut editor = DefaultEditor::new().map_err(io::Error::other)?;
    editor.set_auto_add_history(true);
    editor.set_edit_mode(edit_mode);
    editor
        .set_max_history_size(config.history_size)
        .map_err(io::Error::other)?;
    Ok(editor)
}
