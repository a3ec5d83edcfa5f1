//! Error types for DSA Master.
//!
//! Library crates use [`DsaMasterError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all DSA Master operations.
#[derive(Debug, thiserror::Error)]
pub enum DsaMasterError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error while talking to an external provider.
    #[error("network error: {0}")]
    Network(String),

    /// HTML/JSON parsing or content extraction error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// A provider answered but had nothing usable (empty search, no candidates).
    #[error("source error: {0}")]
    Source(String),

    /// Snapshot serialization or persistence error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (bad topic string, malformed snapshot, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DsaMasterError>;

impl DsaMasterError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = DsaMasterError::config("missing API key");
        assert_eq!(err.to_string(), "config error: missing API key");

        let err = DsaMasterError::parse("no <article> element");
        assert!(err.to_string().contains("no <article>"));
    }

    #[test]
    fn io_error_carries_path() {
        let err = DsaMasterError::io(
            "/tmp/data/dsa_topics.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("dsa_topics.json"));
        assert!(msg.contains("denied"));
    }
}
