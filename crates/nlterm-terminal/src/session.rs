//! Per-session shell state: working directory, history, resolver strategy.
//!
//! A `Session` is owned by exactly one `Dispatcher`. Nothing in here touches
//! the process-wide working directory, so independent sessions can coexist.

use std::collections::VecDeque;
use std::path::{Component, Path, PathBuf};

use nlterm_types::error::{Result, TermError};

/// Maximum number of history entries to retain.
pub const MAX_HISTORY: usize = 100;

/// Which natural-language resolution backend is active.
///
/// The only transition is `Remote -> Deterministic`; once demoted a session
/// never returns to the remote strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Remote,
    Deterministic,
}

/// Mutable state of one interpreter session.
#[derive(Debug, Clone)]
pub struct Session {
    cwd: PathBuf,
    previous: Option<PathBuf>,
    home: PathBuf,
    history: VecDeque<String>,
    strategy: Strategy,
}

impl Session {
    /// Start a session in `start`, which must be an existing absolute directory.
    pub fn new(start: &Path) -> Result<Self> {
        if !start.is_absolute() {
            return Err(TermError::InvalidArgument(format!(
                "working directory must be absolute: {}",
                start.display()
            )));
        }
        let start = normalize(start);
        if !start.is_dir() {
            return Err(TermError::NotFound(start.display().to_string()));
        }
        let home = dirs::home_dir().unwrap_or_else(|| start.clone());
        Ok(Self {
            cwd: start,
            previous: None,
            home,
            history: VecDeque::with_capacity(MAX_HISTORY),
            strategy: Strategy::Deterministic,
        })
    }

    /// Start a session in the process working directory.
    pub fn from_process_cwd() -> Result<Self> {
        let cwd = std::env::current_dir()?;
        Self::new(&cwd)
    }

    /// Override the directory that `~` and a bare `cd` resolve to.
    pub fn with_home(mut self, home: PathBuf) -> Self {
        self.home = home;
        self
    }

    /// Current working directory (absolute).
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Directory recorded by the last successful `cd`, if any.
    pub fn previous_dir(&self) -> Option<&Path> {
        self.previous.as_deref()
    }

    /// Home directory used for `~` expansion.
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Resolve user input to an absolute, lexically normalized path.
    ///
    /// `~` and `~/...` expand to the home directory; relative paths are
    /// joined onto the working directory. The path is not required to exist.
    pub fn resolve(&self, input: &str) -> PathBuf {
        let joined = if input == "~" {
            self.home.clone()
        } else if let Some(rest) = input.strip_prefix("~/") {
            self.home.join(rest)
        } else {
            let p = Path::new(input);
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                self.cwd.join(p)
            }
        };
        normalize(&joined)
    }

    /// Commit a directory change. The caller has already verified `dir`.
    pub(crate) fn commit_directory(&mut self, dir: PathBuf) -> PathBuf {
        let from = std::mem::replace(&mut self.cwd, dir);
        self.previous = Some(from.clone());
        from
    }

    /// Command history, oldest first.
    pub fn history(&self) -> &VecDeque<String> {
        &self.history
    }

    /// Append a line to history, evicting the oldest past [`MAX_HISTORY`].
    pub fn push_history(&mut self, line: &str) {
        self.history.push_back(line.to_string());
        while self.history.len() > MAX_HISTORY {
            self.history.pop_front();
        }
    }

    /// The active resolution strategy.
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Select the remote strategy at start-up.
    pub(crate) fn activate_remote(&mut self) {
        self.strategy = Strategy::Remote;
    }

    /// Permanently switch to the deterministic strategy.
    ///
    /// Returns `true` if this call changed the strategy.
    pub fn demote_to_deterministic(&mut self) -> bool {
        let changed = self.strategy == Strategy::Remote;
        self.strategy = Strategy::Deterministic;
        changed
    }
}

/// Collapse `.` and `..` components without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {},
            Component::ParentDir => {
                out.pop();
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert_eq, proptest};

    fn session_in(dir: &Path) -> Session {
        Session::new(dir).unwrap().with_home(dir.join("home"))
    }

    #[test]
    fn new_rejects_relative_path() {
        let err = Session::new(Path::new("relative")).unwrap_err();
        assert!(matches!(err, TermError::InvalidArgument(_)));
    }

    #[test]
    fn new_rejects_missing_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let err = Session::new(&tmp.path().join("missing")).unwrap_err();
        assert!(matches!(err, TermError::NotFound(_)));
    }

    #[test]
    fn starts_deterministic_without_previous_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let s = session_in(tmp.path());
        assert_eq!(s.strategy(), Strategy::Deterministic);
        assert!(s.previous_dir().is_none());
        assert_eq!(s.cwd(), tmp.path());
    }

    #[test]
    fn resolve_relative_and_dotdot() {
        let tmp = tempfile::tempdir().unwrap();
        let s = session_in(tmp.path());
        assert_eq!(s.resolve("a/b"), tmp.path().join("a/b"));
        assert_eq!(s.resolve("a/../c"), tmp.path().join("c"));
        assert_eq!(s.resolve("./d"), tmp.path().join("d"));
    }

    #[test]
    fn resolve_absolute_ignores_cwd() {
        let tmp = tempfile::tempdir().unwrap();
        let s = session_in(tmp.path());
        let abs = tmp.path().join("x");
        assert_eq!(s.resolve(abs.to_str().unwrap()), abs);
    }

    #[test]
    fn resolve_tilde() {
        let tmp = tempfile::tempdir().unwrap();
        let s = session_in(tmp.path());
        assert_eq!(s.resolve("~"), tmp.path().join("home"));
        assert_eq!(s.resolve("~/notes"), tmp.path().join("home/notes"));
    }

    #[test]
    fn commit_records_previous() {
        let tmp = tempfile::tempdir().unwrap();
        let mut s = session_in(tmp.path());
        let sub = tmp.path().join("sub");
        let from = s.commit_directory(sub.clone());
        assert_eq!(from, tmp.path());
        assert_eq!(s.cwd(), sub);
        assert_eq!(s.previous_dir(), Some(tmp.path()));
    }

    #[test]
    fn history_evicts_oldest_after_capacity() {
        let tmp = tempfile::tempdir().unwrap();
        let mut s = session_in(tmp.path());
        for i in 1..=101 {
            s.push_history(&format!("cmd {i}"));
        }
        assert_eq!(s.history().len(), MAX_HISTORY);
        assert!(!s.history().contains(&"cmd 1".to_string()));
        assert_eq!(s.history().back().map(String::as_str), Some("cmd 101"));
        assert_eq!(s.history().front().map(String::as_str), Some("cmd 2"));
    }

    #[test]
    fn history_keeps_repeated_lines() {
        let tmp = tempfile::tempdir().unwrap();
        let mut s = session_in(tmp.path());
        s.push_history("ls");
        s.push_history("ls");
        assert_eq!(s.history().len(), 2);
    }

    #[test]
    fn demotion_is_one_way() {
        let tmp = tempfile::tempdir().unwrap();
        let mut s = session_in(tmp.path());
        s.activate_remote();
        assert_eq!(s.strategy(), Strategy::Remote);
        assert!(s.demote_to_deterministic());
        assert!(!s.demote_to_deterministic());
        assert_eq!(s.strategy(), Strategy::Deterministic);
    }

    proptest! {
        #[test]
        fn history_never_exceeds_capacity(count in 0usize..400) {
            let tmp = tempfile::tempdir().unwrap();
            let mut s = session_in(tmp.path());
            for i in 0..count {
                s.push_history(&i.to_string());
            }
            prop_assert_eq!(s.history().len(), count.min(MAX_HISTORY));
            if count > 0 {
                let last = (count - 1).to_string();
                prop_assert_eq!(s.history().back(), Some(&last));
            }
        }
    }
}
