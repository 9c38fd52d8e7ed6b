//! Error types for zonesync
//!
//! This module defines all error types used throughout the crate.
//!
//! The taxonomy follows how a reconciliation pass fails:
//! - [`Error::NotFound`]: the zone does not exist at the backend
//! - [`Error::Transport`]: network failure or an unexpected HTTP status
//! - [`Error::MalformedResponse`]: a backend body could not be decoded
//! - [`Error::Reconciliation`]: a difference could not be mapped to a correction

use thiserror::Error;

/// Result type alias for zonesync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for zonesync
#[derive(Error, Debug)]
pub enum Error {
    /// Zone (or other backend object) does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Network failure or non-success HTTP status
    #[error("Transport error: {message}")]
    Transport {
        /// HTTP status code, when a response was received
        status: Option<u16>,
        /// Status text and any backend-supplied detail
        message: String,
    },

    /// Backend body failed to decode as the expected JSON
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// A difference could not be turned into a valid correction
    #[error("Reconciliation error: {0}")]
    Reconciliation(String),

    /// Invalid desired-state input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a transport error without an HTTP status
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport {
            status: None,
            message: msg.into(),
        }
    }

    /// Create a transport error for an unexpected HTTP status
    pub fn status(status: u16, msg: impl Into<String>) -> Self {
        Self::Transport {
            status: Some(status),
            message: msg.into(),
        }
    }

    /// Create a malformed response error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    /// Create a reconciliation error
    pub fn reconciliation(msg: impl Into<String>) -> Self {
        Self::Reconciliation(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error signals a missing zone
    ///
    /// Callers branch on this to report "zone must exist" instead of a
    /// generic failure; zonesync never creates zones.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// HTTP status attached to a transport error, if any
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            _ => None,
        }
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_distinguishable() {
        assert!(Error::not_found("example.com.").is_not_found());
        assert!(!Error::transport("connection refused").is_not_found());
        assert!(!Error::status(404, "404 Not Found").is_not_found());
    }

    #[test]
    fn test_status_is_carried() {
        let err = Error::status(422, "422 Unprocessable Entity");
        assert_eq!(err.http_status(), Some(422));
        assert_eq!(err.to_string(), "Transport error: 422 Unprocessable Entity");
        assert_eq!(Error::transport("timeout").http_status(), None);
    }
}
