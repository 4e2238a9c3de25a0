use std::io;

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// Next input line, or `None` at end of input. Ctrl-C yields an empty line.
pub fn read_input_line(
    editor: &mut DefaultEditor,
    interactive: bool,
    prompt: &str,
) -> io::Result<Option<String>> {
    if interactive {
        let line = match editor.readline(prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => return Ok(Some(String::new())),
            Err(ReadlineError::Eof) => return Ok(None),
            Err(err) => return Err(io::Error::other(err)),
        };
        Ok(Some(line))
    } else {
        let mut line = String::new();
        let bytes = io::stdin().read_line(&mut line)?;
        if bytes == 0 {
            return Ok(None);
        }
        Ok(Some(trim_line_ending(&line).to_string()))
    }
}

pub fn trim_line_ending(line: &str) -> &str {
    line.trim_end_matches(&['\n', '\r'][..])
}
