//! Natural-language resolution.
//!
//! A session resolves sentences either through a remote text-generation
//! backend or through the deterministic rule table in [`patterns`]. The
//! remote strategy is selected at start-up when a backend is configured;
//! the first backend failure demotes the session to the rule table for
//! good.

pub mod patterns;

use nlterm_types::error::Result;

use crate::session::{Session, Strategy};

/// A remote text-generation service.
///
/// Implementations block until the reply arrives or their own timeout
/// expires. Any `Err` is treated as a strategy failure, never retried.
pub trait CompletionBackend: Send {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Send `prompt` and return the raw reply text.
    fn complete(&self, prompt: &str) -> Result<String>;
}

/// Build the instruction sent to a remote backend for `request`.
pub fn remote_prompt(request: &str) -> String {
    format!(
        r#"You are a command-line assistant. Convert this natural language request to a single terminal command.

IMPORTANT RULES:
- Return ONLY the command, no explanations
- Use these specific commands when appropriate:
  * For file/folder counting: "count"
  * For creating files: "touch filename.ext"
  * For creating folders: "mkdir foldername"
  * For listing files: "ls" or "dir"
  * For deleting files: "rm filename" or "del filename"
  * For deleting folders: "rmdir foldername"
  * For writing text to a file: "echo text > filename"
  * For current directory: "pwd"
  * For help: "help"

Examples:
- "count the files" -> "count"
- "how many files" -> "count"
- "create a file called test.py" -> "touch test.py"
- "make a folder named project" -> "mkdir project"
- "what files are here" -> "ls"

User request: "{request}"
Command:"#
    )
}

/// Maps sentences to canonical command strings.
pub struct NaturalLanguageResolver {
    remote: Option<Box<dyn CompletionBackend>>,
}

impl NaturalLanguageResolver {
    /// Rule table only.
    pub fn deterministic() -> Self {
        Self { remote: None }
    }

    /// Prefer `backend`, falling back to the rule table after its first
    /// failure.
    pub fn with_remote(backend: Box<dyn CompletionBackend>) -> Self {
        Self {
            remote: Some(backend),
        }
    }

    /// Strategy a new session should start with.
    pub fn initial_strategy(&self) -> Strategy {
        if self.remote.is_some() {
            Strategy::Remote
        } else {
            Strategy::Deterministic
        }
    }

    /// Resolve `line` to a command string using the session's strategy.
    ///
    /// A remote reply is returned trimmed and otherwise unchecked; an empty
    /// reply resolves to nothing. A remote failure demotes the session and
    /// the same line is retried against the rule table.
    pub fn resolve(&self, line: &str, session: &mut Session) -> Option<String> {
        if session.strategy() == Strategy::Remote
            && let Some(backend) = &self.remote
        {
            match backend.complete(&remote_prompt(line)) {
                Ok(reply) => {
                    let reply = reply.trim();
                    log::debug!("{} resolved '{line}' to '{reply}'", backend.name());
                    return (!reply.is_empty()).then(|| reply.to_string());
                },
                Err(e) => {
                    log::warn!(
                        "{} failed ({e}); using built-in patterns for the rest of the session",
                        backend.name()
                    );
                    session.demote_to_deterministic();
                },
            }
        }
        patterns::resolve(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nlterm_types::error::TermError;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Scripted {
        reply: std::result::Result<&'static str, &'static str>,
        calls: Arc<AtomicUsize>,
    }

    impl CompletionBackend for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }
        fn complete(&self, prompt: &str) -> Result<String> {
            assert!(prompt.contains("User request:"));
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.reply {
                Ok(text) => Ok(text.to_string()),
                Err(msg) => Err(TermError::Rejected(msg.to_string())),
            }
        }
    }

    fn remote(reply: std::result::Result<&'static str, &'static str>) -> (NaturalLanguageResolver, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let backend = Scripted {
            reply,
            calls: Arc::clone(&calls),
        };
        (NaturalLanguageResolver::with_remote(Box::new(backend)), calls)
    }

    fn session(strategy: Strategy) -> (tempfile::TempDir, Session) {
        let tmp = tempfile::tempdir().unwrap();
        let mut s = Session::new(tmp.path()).unwrap();
        if strategy == Strategy::Remote {
            s.activate_remote();
        }
        (tmp, s)
    }

    #[test]
    fn deterministic_uses_rules() {
        let (_tmp, mut s) = session(Strategy::Deterministic);
        let r = NaturalLanguageResolver::deterministic();
        assert_eq!(r.initial_strategy(), Strategy::Deterministic);
        assert_eq!(r.resolve("delete old.txt", &mut s).as_deref(), Some("rm old.txt"));
    }

    #[test]
    fn remote_reply_is_trimmed_and_unvalidated() {
        let (r, calls) = remote(Ok("  frobnicate --all \n"));
        let (_tmp, mut s) = session(Strategy::Remote);
        assert_eq!(r.initial_strategy(), Strategy::Remote);
        assert_eq!(r.resolve("do the thing", &mut s).as_deref(), Some("frobnicate --all"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(s.strategy(), Strategy::Remote);
    }

    #[test]
    fn empty_remote_reply_resolves_nothing() {
        let (r, _calls) = remote(Ok("   "));
        let (_tmp, mut s) = session(Strategy::Remote);
        assert_eq!(r.resolve("show me the files", &mut s), None);
        assert_eq!(s.strategy(), Strategy::Remote);
    }

    #[test]
    fn failure_demotes_and_falls_back_for_same_line() {
        let (r, calls) = remote(Err("401"));
        let (_tmp, mut s) = session(Strategy::Remote);
        assert_eq!(r.resolve("show me the files", &mut s).as_deref(), Some("ls"));
        assert_eq!(s.strategy(), Strategy::Deterministic);
        // Sticky: the backend is never consulted again.
        assert_eq!(r.resolve("how many files", &mut s).as_deref(), Some("count"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn deterministic_session_ignores_backend() {
        let (r, calls) = remote(Ok("ls"));
        let (_tmp, mut s) = session(Strategy::Deterministic);
        assert_eq!(r.resolve("make a folder named x", &mut s).as_deref(), Some("mkdir x"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn prompt_embeds_request() {
        let p = remote_prompt("count my stuff");
        assert!(p.contains("User request: \"count my stuff\""));
        assert!(p.trim_end().ends_with("Command:"));
    }
}
