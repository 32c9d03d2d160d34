//! Error types for chanauth core.

use thiserror::Error;

/// Errors raised while decoding core values from untrusted input.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("malformed line: {0}")]
    MalformedLine(String),

    #[error("{command} is missing its {what}")]
    MissingField {
        command: String,
        what: &'static str,
    },

    #[error("invalid password hash: {0}")]
    InvalidPasswordHash(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
