//! The uniform result of one dispatch cycle.

use std::path::PathBuf;

use nlterm_types::error::{ErrorKind, TermError};

use crate::fs_ops::{EntryCounts, EntryKind, ListEntry};
use crate::interpreter::CommandOutput;

/// Terminal outcome of a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Error,
    Unrecognized,
}

/// Structured detail attached to a result for renderers that want more than
/// the message.
#[derive(Debug, Clone, PartialEq)]
pub enum SideEffects {
    Targets(Vec<TargetOutcome>),
    Listing(Vec<ListEntry>),
    Counts(EntryCounts),
    DirectoryChanged { from: PathBuf, to: PathBuf },
    Written { path: PathBuf, bytes: usize },
    Clear,
    Exit,
}

/// Outcome for one target of a multi-target builtin.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetOutcome {
    pub target: String,
    pub status: Status,
    pub kind: Option<ErrorKind>,
    /// Line shown for this target; may be empty on success.
    pub detail: String,
}

impl TargetOutcome {
    pub fn ok(target: &str, detail: impl Into<String>) -> Self {
        Self {
            target: target.to_string(),
            status: Status::Ok,
            kind: None,
            detail: detail.into(),
        }
    }

    pub fn failed(op: &str, target: &str, err: &TermError) -> Self {
        Self {
            target: target.to_string(),
            status: Status::Error,
            kind: Some(err.kind()),
            detail: format!("{op}: {err}"),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }
}

/// What the dispatcher hands back to the caller for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionResult {
    pub status: Status,
    pub message: String,
    pub kind: Option<ErrorKind>,
    pub side_effects: Option<SideEffects>,
    /// Canonical command a natural-language line was resolved to.
    pub interpreted_as: Option<String>,
}

impl ExecutionResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: Status::Ok,
            message: message.into(),
            kind: None,
            side_effects: None,
            interpreted_as: None,
        }
    }

    /// Result of a blank line.
    pub fn noop() -> Self {
        Self::ok(String::new())
    }

    /// Convert an error raised by `op` into a one-line result.
    ///
    /// Unknown command names come back as `Unrecognized` rather than `Error`.
    pub fn failure(op: &str, err: &TermError) -> Self {
        let (status, message) = match err {
            TermError::CommandNotFound(_) | TermError::Unrecognized(_) => {
                (Status::Unrecognized, err.to_string())
            },
            _ => (Status::Error, format!("{op}: {err}")),
        };
        Self {
            status,
            message,
            kind: Some(err.kind()),
            side_effects: None,
            interpreted_as: None,
        }
    }

    /// Record the canonical command this result was produced from.
    pub fn interpreted(mut self, command: &str) -> Self {
        self.interpreted_as = Some(command.to_string());
        self
    }

    fn with_effects(mut self, effects: SideEffects) -> Self {
        self.side_effects = Some(effects);
        self
    }

    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }
}

impl From<CommandOutput> for ExecutionResult {
    fn from(output: CommandOutput) -> Self {
        match output {
            CommandOutput::Text(text) => ExecutionResult::ok(text),
            CommandOutput::None => ExecutionResult::ok(String::new()),
            CommandOutput::Listing { entries, long } => {
                ExecutionResult::ok(render_listing(&entries, long))
                    .with_effects(SideEffects::Listing(entries))
            },
            CommandOutput::Targets(outcomes) => from_targets(outcomes),
            CommandOutput::Counts(counts) => ExecutionResult::ok(format!(
                "Files: {}\nDirectories: {}\nTotal items: {}",
                counts.files,
                counts.directories,
                counts.total()
            ))
            .with_effects(SideEffects::Counts(counts)),
            CommandOutput::DirectoryChanged { from, to } => ExecutionResult::ok(String::new())
                .with_effects(SideEffects::DirectoryChanged { from, to }),
            CommandOutput::Written { path, bytes } => {
                ExecutionResult::ok(format!("Wrote {bytes} bytes to {}", path.display()))
                    .with_effects(SideEffects::Written { path, bytes })
            },
            CommandOutput::Clear => ExecutionResult::ok(String::new()).with_effects(SideEffects::Clear),
            CommandOutput::Exit => ExecutionResult::ok("Goodbye.").with_effects(SideEffects::Exit),
        }
    }
}

/// A multi-target command fails as a whole only when every target failed;
/// partial failures stay `Ok` with one line per failing target.
fn from_targets(outcomes: Vec<TargetOutcome>) -> ExecutionResult {
    let message = outcomes
        .iter()
        .map(|o| o.detail.as_str())
        .filter(|d| !d.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    let all_failed = !outcomes.is_empty() && outcomes.iter().all(|o| !o.is_ok());
    let mut result = ExecutionResult::ok(message);
    if all_failed {
        result.status = Status::Error;
        result.kind = outcomes.iter().find_map(|o| o.kind);
    }
    result.with_effects(SideEffects::Targets(outcomes))
}

fn render_listing(entries: &[ListEntry], long: bool) -> String {
    if entries.is_empty() {
        return "(empty)".to_string();
    }
    let display = |e: &ListEntry| match e.kind {
        EntryKind::Directory => format!("{}/", e.name),
        _ => e.name.clone(),
    };
    if long {
        entries
            .iter()
            .map(|e| {
                let line = e.long_line();
                match e.kind {
                    EntryKind::Directory => format!("{line}/"),
                    _ => line,
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    } else {
        entries.iter().map(display).collect::<Vec<_>>().join("  ")
    }
}
