//! Plain-text rendering of dispatch results.

use std::io::{self, Write};
use std::path::Path;

use nlterm_terminal::{ExecutionResult, SideEffects, Status};

/// ANSI: clear screen, cursor home.
const CLEAR_SEQUENCE: &str = "\x1b[2J\x1b[H";

/// What the read loop should do after a result is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Write `result` to `out`.
pub fn render(result: &ExecutionResult, out: &mut impl Write) -> io::Result<Flow> {
    if let Some(cmd) = &result.interpreted_as {
        writeln!(out, "Interpreting as '{cmd}'")?;
    }
    match result.side_effects {
        Some(SideEffects::Clear) => {
            write!(out, "{CLEAR_SEQUENCE}")?;
            out.flush()?;
            return Ok(Flow::Continue);
        },
        Some(SideEffects::Exit) => {
            if !result.message.is_empty() {
                writeln!(out, "{}", result.message)?;
            }
            return Ok(Flow::Exit);
        },
        _ => {},
    }
    if !result.message.is_empty() {
        match result.status {
            Status::Ok => writeln!(out, "{}", result.message)?,
            Status::Error => writeln!(out, "error: {}", result.message)?,
            Status::Unrecognized => writeln!(out, "{}", result.message)?,
        }
    }
    Ok(Flow::Continue)
}

/// `user@host:dir$ `, with the home directory shown as `~`.
pub fn prompt(cwd: &Path, home: &Path) -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "user".to_string());
    let host = std::env::var("HOSTNAME").unwrap_or_else(|_| "nlterm".to_string());
    format!("{user}@{host}:{}$ ", short_dir(cwd, home))
}

fn short_dir(cwd: &Path, home: &Path) -> String {
    if cwd == home {
        return "~".to_string();
    }
    match cwd.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => cwd.display().to_string(),
    }
}

pub fn banner(out: &mut impl Write, remote: bool) -> io::Result<()> {
    writeln!(out, "nlterm {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(
        out,
        "Type commands or plain-English requests. 'help' lists commands, 'exit' quits."
    )?;
    if remote {
        writeln!(out, "Natural-language requests use the remote model.")?;
    } else {
        writeln!(out, "Natural-language requests use built-in patterns.")?;
    }
    writeln!(out)
}
