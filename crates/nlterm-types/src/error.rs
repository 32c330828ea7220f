//! Error types for nlterm.

use std::io;

/// User-facing failure classes.
///
/// Every [`TermError`] maps onto exactly one kind; renderers and callers
/// branch on the kind rather than on individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    NotEmpty,
    PermissionDenied,
    InvalidArgument,
    TimedOut,
    Unrecognized,
    Other,
}

/// Errors produced by nlterm.
///
/// Filesystem variants carry the offending target as the user typed it so
/// that `Display` reads as a complete line once prefixed with the operation
/// name (`rm: old.txt: No such file or directory`).
#[derive(Debug, thiserror::Error)]
pub enum TermError {
    #[error("{0}: No such file or directory")]
    NotFound(String),

    #[error("{0}: Is a directory")]
    IsDirectory(String),

    #[error("{0}: Not a directory")]
    NotADirectory(String),

    #[error("{0}: Directory not empty")]
    NotEmpty(String),

    #[error("{0}: Permission denied")]
    PermissionDenied(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("{command}: timed out after {secs}s")]
    TimedOut { command: String, secs: u64 },

    #[error("{0}: command not found")]
    CommandNotFound(String),

    /// A sentence no resolution strategy could map to a command. Carries
    /// the sentence.
    #[error("I don't understand that request. Try 'help' for available commands, or rephrase it.")]
    Unrecognized(String),

    #[error("{target}: {source}")]
    Io {
        target: String,
        #[source]
        source: io::Error,
    },

    #[error("config error: {0}")]
    Config(String),

    #[error("backend error: {0}")]
    Backend(String),

    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("I/O error: {0}")]
    Stdio(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TermError {
    /// Classify an I/O error raised while operating on `target`.
    pub fn from_io(target: &str, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => TermError::NotFound(target.to_string()),
            io::ErrorKind::PermissionDenied => TermError::PermissionDenied(target.to_string()),
            io::ErrorKind::DirectoryNotEmpty => TermError::NotEmpty(target.to_string()),
            io::ErrorKind::IsADirectory => TermError::IsDirectory(target.to_string()),
            io::ErrorKind::NotADirectory => TermError::NotADirectory(target.to_string()),
            _ => TermError::Io {
                target: target.to_string(),
                source: err,
            },
        }
    }

    /// The user-facing failure class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TermError::NotFound(_) | TermError::IsDirectory(_) => ErrorKind::NotFound,
            TermError::NotEmpty(_) => ErrorKind::NotEmpty,
            TermError::PermissionDenied(_) => ErrorKind::PermissionDenied,
            TermError::InvalidArgument(_) | TermError::NotADirectory(_) => {
                ErrorKind::InvalidArgument
            },
            TermError::TimedOut { .. } => ErrorKind::TimedOut,
            TermError::CommandNotFound(_) | TermError::Unrecognized(_) => ErrorKind::Unrecognized,
            TermError::Stdio(e) | TermError::Io { source: e, .. } => match e.kind() {
                io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied,
                io::ErrorKind::NotFound => ErrorKind::NotFound,
                io::ErrorKind::TimedOut => ErrorKind::TimedOut,
                _ => ErrorKind::Other,
            },
            TermError::Config(_)
            | TermError::Backend(_)
            | TermError::Rejected(_)
            | TermError::TomlParse(_)
            | TermError::Json(_) => ErrorKind::Other,
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, TermError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display_names_target() {
        let e = TermError::NotFound("old.txt".into());
        assert_eq!(format!("{e}"), "old.txt: No such file or directory");
    }

    #[test]
    fn not_empty_display() {
        let e = TermError::NotEmpty("src".into());
        assert_eq!(format!("{e}"), "src: Directory not empty");
    }

    #[test]
    fn timed_out_display_uses_seconds() {
        let e = TermError::TimedOut {
            command: "sleep 60".into(),
            secs: 30,
        };
        assert_eq!(format!("{e}"), "sleep 60: timed out after 30s");
        assert_eq!(e.kind(), ErrorKind::TimedOut);
    }

    #[test]
    fn command_not_found_is_unrecognized() {
        let e = TermError::CommandNotFound("frobnicate".into());
        assert_eq!(format!("{e}"), "frobnicate: command not found");
        assert_eq!(e.kind(), ErrorKind::Unrecognized);
    }

    #[test]
    fn unrecognized_sentence_message() {
        let e = TermError::Unrecognized("what time is it".into());
        assert_eq!(
            format!("{e}"),
            "I don't understand that request. Try 'help' for available commands, or rephrase it."
        );
        assert_eq!(e.kind(), ErrorKind::Unrecognized);
    }

    #[test]
    fn from_io_not_found() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "gone");
        let e = TermError::from_io("a.txt", io_err);
        assert!(matches!(e, TermError::NotFound(ref t) if t == "a.txt"));
        assert_eq!(e.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn from_io_permission_denied() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "nope");
        let e = TermError::from_io("secret", io_err);
        assert_eq!(e.kind(), ErrorKind::PermissionDenied);
        assert_eq!(format!("{e}"), "secret: Permission denied");
    }

    #[test]
    fn from_io_directory_not_empty() {
        let io_err = io::Error::new(io::ErrorKind::DirectoryNotEmpty, "busy");
        assert_eq!(TermError::from_io("d", io_err).kind(), ErrorKind::NotEmpty);
    }

    #[test]
    fn from_io_other_keeps_source() {
        let io_err = io::Error::other("disk on fire");
        let e = TermError::from_io("x", io_err);
        let msg = format!("{e}");
        assert!(msg.starts_with("x: "));
        assert!(msg.contains("disk on fire"));
        assert_eq!(e.kind(), ErrorKind::Other);
    }

    #[test]
    fn is_directory_counts_as_not_found() {
        assert_eq!(
            TermError::IsDirectory("dir".into()).kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn toml_error_from_conversion() {
        let toml_err = toml::from_str::<toml::Value>("this is [[[not valid toml").unwrap_err();
        let e: TermError = toml_err.into();
        assert!(format!("{e}").contains("TOML parse error"));
    }

    #[test]
    fn json_error_from_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let e: TermError = json_err.into();
        assert!(format!("{e}").contains("JSON error"));
    }

    #[test]
    fn result_alias_err() {
        let r: Result<i32> = Err(TermError::InvalidArgument("mkdir: missing operand".into()));
        assert!(r.is_err());
    }
}
