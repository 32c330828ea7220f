//! Hand unknown commands to the platform shell.

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use nlterm_types::error::{ErrorKind, Result, TermError};

use crate::result::{ExecutionResult, Status};

/// Exit status `sh` uses for "command not found".
const SHELL_NOT_FOUND: i32 = 127;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Captured result of a shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellOutput {
    pub stdout: String,
    pub stderr: String,
    pub code: Option<i32>,
}

impl ShellOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Stdout followed by stderr, trailing newlines trimmed.
    pub fn combined(&self) -> String {
        let mut text = self.stdout.trim_end().to_string();
        let err = self.stderr.trim_end();
        if !err.is_empty() {
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str(err);
        }
        text
    }

    pub fn into_result(self) -> ExecutionResult {
        if self.success() {
            return ExecutionResult::ok(self.combined());
        }
        let status = match self.code {
            Some(code) => format!("exit status {code}"),
            None => "terminated by signal".to_string(),
        };
        let text = self.combined();
        let message = if text.is_empty() {
            status
        } else {
            format!("{text}\n({status})")
        };
        let mut result = ExecutionResult::ok(message);
        result.status = Status::Error;
        result.kind = Some(ErrorKind::Other);
        result
    }
}

/// Runs lines through `sh -c` (or `cmd /C`) with a wall-clock limit.
#[derive(Debug, Clone)]
pub struct SystemPassthrough {
    timeout: Duration,
}

impl SystemPassthrough {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Run `line` in `cwd`, killing it once the timeout elapses.
    pub fn run(&self, line: &str, cwd: &Path) -> Result<ShellOutput> {
        let program = line.split_whitespace().next().unwrap_or(line);
        let mut child = shell(line)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| TermError::from_io(program, e))?;
        log::debug!("passthrough: {line}");

        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let code = self.wait(&mut child, line)?;
        if code == Some(SHELL_NOT_FOUND) {
            return Err(TermError::CommandNotFound(program.to_string()));
        }
        Ok(ShellOutput {
            stdout: collect(stdout),
            stderr: collect(stderr),
            code,
        })
    }

    fn wait(&self, child: &mut Child, line: &str) -> Result<Option<i32>> {
        let deadline = Instant::now() + self.timeout;
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(status.code());
            }
            if Instant::now() >= deadline {
                // Reader threads are left to finish on their own once the
                // pipes close.
                let _ = child.kill();
                let _ = child.wait();
                log::warn!("passthrough timed out after {:?}: {line}", self.timeout);
                return Err(TermError::TimedOut {
                    command: line.to_string(),
                    secs: self.timeout.as_secs(),
                });
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

#[cfg(windows)]
fn shell(line: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", line]);
    cmd
}

#[cfg(not(windows))]
fn shell(line: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.args(["-c", line]);
    cmd
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

fn collect(handle: Option<JoinHandle<Vec<u8>>>) -> String {
    let bytes = handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default();
    String::from_utf8_lossy(&bytes).into_owned()
}
