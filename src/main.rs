use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use minishell::config::{load_config, Config};

mod io_helpers;
mod repl;

use repl::{run, run_line, ShellState, SYNTAX_STATUS};

fn main() -> ExitCode {
    init_logging();
    let mut show_tokens = false;
    let mut strict = false;
    let mut command: Option<String> = None;
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--tokens" => show_tokens = true,
            "--strict" => strict = true,
            "-c" => match args.next() {
                Some(line) => command = Some(line),
                None => {
                    eprintln!("minishell: -c: option requires an argument");
                    return exit_code(SYNTAX_STATUS);
                }
            },
            other => {
                eprintln!("minishell: unknown option '{other}'");
                return exit_code(SYNTAX_STATUS);
            }
        }
    }

    let home = env::var_os("HOME").map(PathBuf::from);
    let mut config = match load_config(home.as_deref()) {
        Ok((config, warnings)) => {
            for warning in warnings {
                eprintln!("{warning}");
            }
            config
        }
        Err(err) => {
            eprintln!("config error: {err}");
            Config::default()
        }
    };
    config.show_tokens |= show_tokens;
    config.strict_empty_commands |= strict;

    let mut state = ShellState::new(config);
    if let Some(line) = command {
        run_line(&mut state, &line);
        return exit_code(state.last_status);
    }

    let interactive = unsafe { libc::isatty(libc::STDIN_FILENO) == 1 };
    match run(&mut state, interactive) {
        Ok(status) => exit_code(status),
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging() {
    let env = env_logger::Env::default().filter_or("MINISHELL_LOG", "info");
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .try_init();
}

fn exit_code(status: i32) -> ExitCode {
    ExitCode::from(u8::try_from(status).unwrap_or(1))
}
