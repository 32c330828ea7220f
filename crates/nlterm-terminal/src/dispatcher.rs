//! Top-level entry point: one input line in, one [`ExecutionResult`] out.

use std::path::Path;
use std::time::Duration;

use nlterm_types::config::TermConfig;
use nlterm_types::error::{Result, TermError};

use crate::classifier::{Intent, IntentClassifier};
use crate::commands::register_builtins;
use crate::interpreter::{CommandRegistry, tokenize};
use crate::passthrough::SystemPassthrough;
use crate::resolver::{CompletionBackend, NaturalLanguageResolver};
use crate::result::ExecutionResult;
use crate::session::{Session, Strategy};

/// Where the dispatcher is within a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Idle,
    /// Running a command produced by the resolver. Entered at most once per
    /// line.
    Resolving,
}

/// Owns a session and routes lines to builtins, the resolver, or the
/// system shell.
pub struct Dispatcher {
    session: Session,
    registry: CommandRegistry,
    classifier: IntentClassifier,
    resolver: NaturalLanguageResolver,
    passthrough: Option<SystemPassthrough>,
    state: DispatchState,
}

impl Dispatcher {
    /// A dispatcher with every builtin registered.
    pub fn new(mut session: Session, resolver: NaturalLanguageResolver) -> Self {
        if resolver.initial_strategy() == Strategy::Remote {
            session.activate_remote();
        }
        log::info!("natural-language strategy: {:?}", session.strategy());
        let mut registry = CommandRegistry::new();
        register_builtins(&mut registry);
        Self {
            session,
            registry,
            classifier: IntentClassifier::new(),
            resolver,
            passthrough: None,
            state: DispatchState::Idle,
        }
    }

    /// Forward unknown direct commands to the system shell.
    pub fn with_passthrough(mut self, passthrough: SystemPassthrough) -> Self {
        self.passthrough = Some(passthrough);
        self
    }

    /// Build a dispatcher from configuration. `backend` is used only when
    /// present; whether one can be built is the caller's concern.
    pub fn from_config(
        config: &TermConfig,
        backend: Option<Box<dyn CompletionBackend>>,
    ) -> Result<Self> {
        let session = match &config.start_dir {
            Some(dir) => Session::new(dir)?,
            None => Session::from_process_cwd()?,
        };
        let resolver = match backend {
            Some(b) => NaturalLanguageResolver::with_remote(b),
            None => NaturalLanguageResolver::deterministic(),
        };
        let mut dispatcher = Self::new(session, resolver);
        if config.passthrough.enabled {
            dispatcher = dispatcher.with_passthrough(SystemPassthrough::new(Duration::from_secs(
                config.passthrough.timeout_secs,
            )));
        }
        Ok(dispatcher)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn cwd(&self) -> &Path {
        self.session.cwd()
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn state(&self) -> DispatchState {
        self.state
    }

    /// Run one input line.
    ///
    /// Blank lines are a no-op and are not recorded. Every other line is
    /// appended to history as typed, before it runs.
    pub fn dispatch(&mut self, line: &str) -> ExecutionResult {
        let line = line.trim();
        if line.is_empty() {
            return ExecutionResult::noop();
        }
        self.session.push_history(line);

        match self.classifier.classify(line, &self.registry) {
            Intent::Empty => ExecutionResult::noop(),
            Intent::Builtin => self.run_builtin(line),
            Intent::NaturalLanguage => self.resolve_and_run(line),
            Intent::UnknownCommand => self.run_unknown(line),
        }
    }

    /// Tokenize and execute `line` as a builtin. Unknown names are reported,
    /// never reclassified.
    fn run_builtin(&mut self, line: &str) -> ExecutionResult {
        let cmd = match tokenize(line) {
            Ok(Some(cmd)) => cmd,
            Ok(None) => return ExecutionResult::noop(),
            Err(e) => return ExecutionResult::failure(first_word(line), &e),
        };
        match self.registry.execute(&cmd, &mut self.session) {
            Ok(output) => ExecutionResult::from(output),
            Err(e) => ExecutionResult::failure(&cmd.name, &e),
        }
    }

    fn resolve_and_run(&mut self, line: &str) -> ExecutionResult {
        let not_understood = TermError::Unrecognized(line.to_string());
        if self.state == DispatchState::Resolving {
            return ExecutionResult::failure(line, &not_understood);
        }
        let Some(resolved) = self.resolver.resolve(line, &mut self.session) else {
            log::debug!("no resolution for: {line}");
            return ExecutionResult::failure(line, &not_understood);
        };
        log::debug!("'{line}' interpreted as '{resolved}'");
        self.state = DispatchState::Resolving;
        let result = self.run_builtin(&resolved).interpreted(&resolved);
        self.state = DispatchState::Idle;
        result
    }

    fn run_unknown(&mut self, line: &str) -> ExecutionResult {
        let name = first_word(line);
        let Some(passthrough) = &self.passthrough else {
            return ExecutionResult::failure(name, &TermError::CommandNotFound(name.to_string()));
        };
        match passthrough.run(line, self.session.cwd()) {
            Ok(output) => output.into_result(),
            Err(e) => ExecutionResult::failure(name, &e),
        }
    }
}

fn first_word(line: &str) -> &str {
    line.split_whitespace().next().unwrap_or(line)
}
