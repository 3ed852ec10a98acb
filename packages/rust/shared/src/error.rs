//! Error types for ArticleForge.
//!
//! Library crates use [`ArticleForgeError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all ArticleForge operations.
#[derive(Debug, thiserror::Error)]
pub enum ArticleForgeError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Transport-level failure: connection refused, DNS failure, timeout,
    /// connection aborted. The only class the store client downgrades to
    /// its local backend.
    #[error("network error: {0}")]
    Network(String),

    /// The remote service answered, but with a failure status.
    #[error("remote error (HTTP {status}): {message}")]
    Remote { status: u16, message: String },

    /// The addressed resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Field validation failed (client-side or HTTP 422).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// A payload could not be decoded.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Local store failure that is neither I/O nor parsing.
    #[error("storage error: {0}")]
    Storage(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ArticleForgeError>;

impl ArticleForgeError {
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

    /// Whether this error is a transient transport failure.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// Whether this error signals a missing resource.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = ArticleForgeError::config("missing base URL");
        assert_eq!(err.to_string(), "config error: missing base URL");

        let err = ArticleForgeError::Remote {
            status: 500,
            message: "boom".into(),
        };
        assert_eq!(err.to_string(), "remote error (HTTP 500): boom");
    }

    #[test]
    fn only_network_errors_are_network_class() {
        assert!(ArticleForgeError::Network("connection refused".into()).is_network());
        assert!(!ArticleForgeError::validation("title: required").is_network());
        assert!(!ArticleForgeError::NotFound("article 3".into()).is_network());
        assert!(
            !ArticleForgeError::Remote {
                status: 503,
                message: "unavailable".into()
            }
            .is_network()
        );
    }
}
