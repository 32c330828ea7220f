//! Builtin trait, registry, and tokenizer.
//!
//! Supports single and double quoted arguments. There is no escape
//! processing, variable expansion, piping or chaining: a line is one
//! command name followed by its arguments.

use std::collections::HashMap;
use std::path::PathBuf;

use nlterm_types::error::{Result, TermError};

use crate::fs_ops::{EntryCounts, ListEntry};
use crate::result::TargetOutcome;
use crate::session::Session;

/// Output produced by a builtin.
#[derive(Debug, Clone)]
pub enum CommandOutput {
    /// Plain text lines.
    Text(String),
    /// Directory listing, rendered short or long.
    Listing { entries: Vec<ListEntry>, long: bool },
    /// One outcome per target of a multi-target command.
    Targets(Vec<TargetOutcome>),
    /// Result of `count`.
    Counts(EntryCounts),
    /// The session working directory moved.
    DirectoryChanged { from: PathBuf, to: PathBuf },
    /// A file was truncated and written.
    Written { path: PathBuf, bytes: usize },
    /// Command produced no visible output.
    None,
    /// Signal to clear the terminal output buffer.
    Clear,
    /// Signal to end the read loop.
    Exit,
}

/// Registry facts about one builtin, as seen by `help`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInfo {
    pub name: String,
    pub aliases: Vec<String>,
    pub description: String,
    pub usage: String,
    pub category: String,
}

/// Mutable environment passed to every builtin.
pub struct Environment<'a> {
    /// The session the command runs in.
    pub session: &'a mut Session,
    /// Every registered builtin, sorted by name.
    pub commands: &'a [CommandInfo],
}

/// What a builtin does when called with fewer than `min` arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Missing {
    /// Fail with `InvalidArgument` before the handler runs.
    Error,
    /// Let the handler substitute its default (`cd` goes home, `ls` lists cwd).
    Default,
}

/// Argument requirements of a builtin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arity {
    pub min: usize,
    pub missing: Missing,
}

impl Arity {
    /// No arguments required.
    pub const NONE: Arity = Arity {
        min: 0,
        missing: Missing::Default,
    };

    /// At least `min` arguments, otherwise a usage error.
    pub const fn required(min: usize) -> Self {
        Arity {
            min,
            missing: Missing::Error,
        }
    }

    /// Up to `min` arguments that the handler fills in when absent.
    pub const fn defaulted(min: usize) -> Self {
        Arity {
            min,
            missing: Missing::Default,
        }
    }

    fn check(&self, given: usize) -> bool {
        given >= self.min || self.missing == Missing::Default
    }
}

/// A single executable builtin.
pub trait Builtin: Send + Sync {
    /// The command name (what the user types).
    fn name(&self) -> &str;

    /// Alternative names resolving to the same builtin.
    fn aliases(&self) -> &[&str] {
        &[]
    }

    /// One-line description for `help`.
    fn description(&self) -> &str;

    /// Usage string (e.g. "ls \[path\] \[-l\] \[-a\]").
    fn usage(&self) -> &str;

    /// Command category for grouping in `help` output.
    fn category(&self) -> &str {
        "general"
    }

    /// Argument requirements checked before `execute` is called.
    fn arity(&self) -> Arity {
        Arity::NONE
    }

    /// Execute the command with the given arguments and environment.
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput>;
}

/// A tokenized command line. The name is lower-cased; arguments keep their
/// original case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub name: String,
    pub args: Vec<String>,
}

impl Command {
    pub fn new(name: &str, args: &[&str]) -> Self {
        Self {
            name: name.to_lowercase(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Borrowed view of the arguments.
    pub fn arg_refs(&self) -> Vec<&str> {
        self.args.iter().map(String::as_str).collect()
    }
}

/// Registry of available builtins.
pub struct CommandRegistry {
    commands: Vec<Box<dyn Builtin>>,
    /// Lower-cased name or alias -> index into `commands`.
    index: HashMap<String, usize>,
    catalog: Vec<CommandInfo>,
}

impl CommandRegistry {
    /// Create an empty command registry.
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            index: HashMap::new(),
            catalog: Vec::new(),
        }
    }

    /// Register a builtin. Replaces any existing builtin with the same name.
    pub fn register(&mut self, cmd: Box<dyn Builtin>) {
        let name = cmd.name().to_lowercase();
        self.commands
            .retain(|existing| existing.name().to_lowercase() != name);
        self.commands.push(cmd);
        self.rebuild();
    }

    fn rebuild(&mut self) {
        self.index.clear();
        for (i, cmd) in self.commands.iter().enumerate() {
            for alias in cmd.aliases() {
                self.index.insert(alias.to_lowercase(), i);
            }
        }
        // Primary names win over aliases.
        for (i, cmd) in self.commands.iter().enumerate() {
            self.index.insert(cmd.name().to_lowercase(), i);
        }
        self.catalog = self
            .commands
            .iter()
            .map(|c| CommandInfo {
                name: c.name().to_string(),
                aliases: c.aliases().iter().map(|a| a.to_string()).collect(),
                description: c.description().to_string(),
                usage: c.usage().to_string(),
                category: c.category().to_string(),
            })
            .collect();
        self.catalog.sort_by(|a, b| a.name.cmp(&b.name));
    }

    /// Look up a builtin by name or alias, case-insensitively.
    pub fn lookup(&self, name: &str) -> Option<&dyn Builtin> {
        self.index
            .get(&name.to_lowercase())
            .map(|&i| self.commands[i].as_ref())
    }

    /// Whether `name` is a registered name or alias.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(&name.to_lowercase())
    }

    /// Help facts for every builtin, sorted by name.
    pub fn catalog(&self) -> &[CommandInfo] {
        &self.catalog
    }

    /// Number of registered builtins (aliases not counted).
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Run a tokenized command against the session.
    ///
    /// Unknown names fail with `CommandNotFound`; too few operands fail with
    /// `InvalidArgument` before the handler sees them.
    pub fn execute(&self, cmd: &Command, session: &mut Session) -> Result<CommandOutput> {
        let builtin = self
            .lookup(&cmd.name)
            .ok_or_else(|| TermError::CommandNotFound(cmd.name.clone()))?;
        let args = cmd.arg_refs();
        if !builtin.arity().check(args.len()) {
            return Err(TermError::InvalidArgument(format!(
                "missing operand (usage: {})",
                builtin.usage()
            )));
        }
        log::debug!("builtin {} with {} arg(s)", builtin.name(), args.len());
        let mut env = Environment {
            session,
            commands: &self.catalog,
        };
        builtin.execute(&args, &mut env)
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tokenizer
// ---------------------------------------------------------------------------

/// Split a line into a [`Command`].
///
/// Whitespace separates tokens; single and double quotes group text into
/// one token, verbatim. Adjacent quoted and unquoted text joins into a
/// single token (`a"b c"` is `ab c`). A blank line yields `Ok(None)`.
pub fn tokenize(line: &str) -> Result<Option<Command>> {
    let tokens = split_tokens(line)?;
    let mut iter = tokens.into_iter();
    let Some(name) = iter.next() else {
        return Ok(None);
    };
    Ok(Some(Command {
        name: name.to_lowercase(),
        args: iter.collect(),
    }))
}

fn split_tokens(input: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    // A quoted empty string is still a token.
    let mut started = false;
    let mut quote: Option<char> = None;

    for ch in input.chars() {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => current.push(ch),
            None => match ch {
                '\'' | '"' => {
                    quote = Some(ch);
                    started = true;
                },
                c if c.is_whitespace() => {
                    if started {
                        tokens.push(std::mem::take(&mut current));
                        started = false;
                    }
                },
                _ => {
                    current.push(ch);
                    started = true;
                },
            },
        }
    }

    match quote {
        Some('\'') => Err(TermError::InvalidArgument(
            "unterminated single quote".to_string(),
        )),
        Some(_) => Err(TermError::InvalidArgument(
            "unterminated double quote".to_string(),
        )),
        None => {
            if started {
                tokens.push(current);
            }
            Ok(tokens)
        },
    }
}
