//! Error types for the protonum-core library.
//!
//! The text transforms in this crate are total: scanning problems such as an
//! unmatched brace are reported as recoverable errors and skipped by callers,
//! never as panics.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for protonum operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for all protonum operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Failed to read input file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        /// Path to the file that failed to read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to write output or backup file
    #[error("failed to write file '{path}': {source}")]
    FileWrite {
        /// Path to the file that failed to write
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A backup target already exists and holds different content
    #[error("backup '{path}' already exists with different content")]
    BackupExists {
        /// The existing backup path
        path: PathBuf,
    },

    /// Input file is not valid UTF-8
    #[error("file '{path}' is not valid UTF-8")]
    InvalidUtf8 {
        /// Path to the offending file
        path: PathBuf,
    },

    /// No closing brace matches the opening brace at `offset`
    #[error("unmatched '{{' at offset {offset}")]
    UnmatchedBrace {
        /// Byte offset of the opening brace
        offset: usize,
    },

    /// Brace matching was requested at an offset that does not hold `{`
    #[error("expected '{{' at offset {offset}")]
    NotAnOpenBrace {
        /// Byte offset that was inspected
        offset: usize,
    },
}

impl Error {
    /// Creates a new file read error
    pub fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Creates a new file write error
    pub fn file_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileWrite {
            path: path.into(),
            source,
        }
    }

    /// Creates a new backup conflict error
    pub fn backup_exists(path: impl Into<PathBuf>) -> Self {
        Self::BackupExists { path: path.into() }
    }

    /// Creates a new invalid UTF-8 error
    pub fn invalid_utf8(path: impl Into<PathBuf>) -> Self {
        Self::InvalidUtf8 { path: path.into() }
    }

    /// Creates a new unmatched brace error
    pub fn unmatched_brace(offset: usize) -> Self {
        Self::UnmatchedBrace { offset }
    }

    /// Creates a new error for a brace match started off a `{`
    pub fn not_an_open_brace(offset: usize) -> Self {
        Self::NotAnOpenBrace { offset }
    }

    /// Returns true if this is a recoverable error that should be skipped
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::UnmatchedBrace { .. } | Self::NotAnOpenBrace { .. }
        )
    }

    /// Returns true if the underlying cause is a missing file
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::FileRead { source, .. } if source.kind() == std::io::ErrorKind::NotFound
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::unmatched_brace(42);
        assert_eq!(err.to_string(), "unmatched '{' at offset 42");

        let err = Error::not_an_open_brace(7);
        assert_eq!(err.to_string(), "expected '{' at offset 7");

        let err = Error::backup_exists("/tmp/a.proto.bak");
        assert!(err.to_string().contains("/tmp/a.proto.bak"));
    }

    #[test]
    fn test_is_recoverable() {
        assert!(Error::unmatched_brace(0).is_recoverable());
        assert!(Error::not_an_open_brace(3).is_recoverable());
        assert!(!Error::invalid_utf8("a.proto").is_recoverable());
    }

    #[test]
    fn test_is_not_found() {
        let missing = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(Error::file_read("a.proto", missing).is_not_found());

        let denied = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "no");
        assert!(!Error::file_read("a.proto", denied).is_not_found());
    }
}
