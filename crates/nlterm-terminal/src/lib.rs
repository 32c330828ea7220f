//! Command resolution and dispatch.
//!
//! The dispatcher turns one input line into one [`ExecutionResult`]. Lines
//! whose first word names a builtin run directly; sentences go through the
//! natural-language resolver, whose canonical command is then looked up as
//! a builtin exactly once. Builtins implement the [`Builtin`] trait and are
//! registered by name.

pub mod classifier;
mod commands;
pub mod dispatcher;
pub mod fs_ops;
mod interpreter;
pub mod passthrough;
pub mod resolver;
pub mod result;
pub mod session;

/// Keyword-driven command-versus-sentence classification.
pub use classifier::{Intent, IntentClassifier};
/// Register all built-in commands into a registry.
pub use commands::register_builtins;
/// One line in, one result out.
pub use dispatcher::{DispatchState, Dispatcher};
/// Argument requirements of a builtin.
pub use interpreter::{Arity, Missing};
/// A single executable builtin trait.
pub use interpreter::Builtin;
/// A tokenized command line.
pub use interpreter::Command;
/// Help facts about a registered builtin.
pub use interpreter::CommandInfo;
/// Output produced by a builtin (text, listing, signals).
pub use interpreter::CommandOutput;
/// Registry of available builtins with dispatch.
pub use interpreter::CommandRegistry;
/// Mutable environment passed to every builtin.
pub use interpreter::Environment;
/// Split a line into a command name and arguments.
pub use interpreter::tokenize;
/// Runs unknown commands through the platform shell.
pub use passthrough::SystemPassthrough;
/// Remote backend seam and the two-strategy resolver.
pub use resolver::{CompletionBackend, NaturalLanguageResolver};
/// The uniform per-dispatch result.
pub use result::{ExecutionResult, SideEffects, Status, TargetOutcome};
/// Per-session state.
pub use session::{Session, Strategy};
