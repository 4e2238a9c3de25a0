//! `~/.minishellrc` loading.
//!
//! Line-oriented `key = value` pairs with `#` comments. Bad lines are
//! reported back as `config:<line>: <message>` warnings and skipped, so a
//! broken rc file never keeps the shell from starting.
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{ErrorKind, ShellError, ShellResult};
use crate::parse::ParseOptions;
use crate::utils::is_valid_var_name;

pub const CONFIG_FILE: &str = ".minishellrc";
pub const HISTORY_FILE: &str = ".minishell_history";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMode {
    Emacs,
    Vi,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub strict_empty_commands: bool,
    pub edit_mode: EditMode,
    pub prompt: String,
    pub history_file: Option<PathBuf>,
    pub history_size: usize,
    pub show_tokens: bool,
    /// Variables from `export` lines, layered over the process environment.
    pub exports: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            strict_empty_commands: false,
            edit_mode: EditMode::Emacs,
            prompt: "minishell$ ".to_string(),
            history_file: None,
            history_size: 1000,
            show_tokens: false,
            exports: HashMap::new(),
        }
    }
}

impl Config {
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            strict_empty_commands: self.strict_empty_commands,
        }
    }
}

/// Loads `<home>/.minishellrc`. A missing file yields the defaults.
pub fn load_config(home: Option<&Path>) -> io::Result<(Config, Vec<String>)> {
    let Some(home) = home else {
        return Ok((default_with_history(None), Vec::new()));
    };
    let path = home.join(CONFIG_FILE);
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!("no config at {}", path.display());
            return Ok((default_with_history(Some(home)), Vec::new()));
        }
        Err(err) => return Err(err),
    };
    let (mut config, warnings) = parse_config(&content, Some(home));
    if config.history_file.is_none() {
        config.history_file = Some(home.join(HISTORY_FILE));
    }
    Ok((config, warnings))
}

fn default_with_history(home: Option<&Path>) -> Config {
    Config {
        history_file: home.map(|home| home.join(HISTORY_FILE)),
        ..Config::default()
    }
}

pub fn parse_config(content: &str, home: Option<&Path>) -> (Config, Vec<String>) {
    let mut config = Config::default();
    let mut warnings = Vec::new();

    for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let result = if let Some(rest) = line.strip_prefix("export ") {
            parse_export(&mut config.exports, rest)
        } else if let Some((key, value)) = line.split_once('=') {
            apply_setting(&mut config, key.trim(), strip_quotes(value.trim()), home)
        } else {
            Err(ShellError::new(ErrorKind::Config, "unrecognized directive"))
        };
        if let Err(err) = result {
            let msg = format!("config:{}: {}", idx + 1, err.message);
            debug!("{msg}");
            warnings.push(msg);
        }
    }

    (config, warnings)
}

fn apply_setting(
    config: &mut Config,
    key: &str,
    value: &str,
    home: Option<&Path>,
) -> ShellResult<()> {
    match key.to_ascii_lowercase().as_str() {
        "strict" | "strict_empty_commands" => config.strict_empty_commands = parse_bool(value)?,
        "show_tokens" => config.show_tokens = parse_bool(value)?,
        "edit_mode" => config.edit_mode = parse_edit_mode(value)?,
        "prompt" => config.prompt = value.to_string(),
        "history_file" => config.history_file = Some(resolve_home(value, home)),
        "history_size" => {
            config.history_size = value
                .parse::<usize>()
                .ok()
                .filter(|size| *size > 0)
                .ok_or_else(|| {
                    ShellError::new(ErrorKind::Config, format!("Invalid history size: {value}"))
                })?;
        }
        _ => {
            return Err(ShellError::new(
                ErrorKind::Config,
                format!("unknown setting '{key}'"),
            ))
        }
    }
    Ok(())
}

pub fn parse_bool(value: &str) -> ShellResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "yes" | "true" | "on" => Ok(true),
        "0" | "no" | "false" | "off" => Ok(false),
        _ => Err(
            ShellError::new(ErrorKind::Config, format!("Invalid boolean value: {value}"))
                .with_context("Valid values: 1/yes/true/on, 0/no/false/off"),
        ),
    }
}

pub fn parse_edit_mode(value: &str) -> ShellResult<EditMode> {
    match value.trim().to_ascii_lowercase().as_str() {
        "emacs" => Ok(EditMode::Emacs),
        "vi" => Ok(EditMode::Vi),
        _ => Err(
            ShellError::new(ErrorKind::Config, format!("Invalid edit mode: {value}"))
                .with_context("Valid values: emacs, vi"),
        ),
    }
}

fn parse_export(exports: &mut HashMap<String, String>, input: &str) -> ShellResult<()> {
    let (name, value) = input.trim().split_once('=').ok_or_else(|| {
        ShellError::new(ErrorKind::Config, "export missing '='")
    })?;
    let name = name.trim();
    if !is_valid_var_name(name) {
        return Err(ShellError::new(
            ErrorKind::Config,
            format!("invalid variable name '{name}'"),
        ));
    }
    exports.insert(name.to_string(), strip_quotes(value.trim()).to_string());
    Ok(())
}

fn resolve_home(value: &str, home: Option<&Path>) -> PathBuf {
    match (value.strip_prefix("~/"), home) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(value),
    }
}

fn strip_quotes(input: &str) -> &str {
    let bytes = input.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        let last = bytes[bytes.len() - 1];
        if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
            return &input[1..bytes.len() - 1];
        }
    }
    input
}
