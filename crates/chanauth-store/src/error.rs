//! Error types for the store module.

use rusqlite::ErrorCode;
use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[source] rusqlite::Error),

    /// The backend did not answer in time (lock contention or a caller-imposed
    /// deadline). Callers making authorization decisions must treat this as a
    /// denial.
    #[error("store timed out: {0}")]
    Timeout(String),

    /// The backend is unusable (e.g. a poisoned lock or a failed worker).
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Permission array encoding/decoding error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Invalid data in storage.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, StoreError::Timeout(_))
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        match e.sqlite_error_code() {
            Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked) => {
                StoreError::Timeout(e.to_string())
            }
            _ => StoreError::Database(e),
        }
    }
}

impl From<chanauth_core::CoreError> for StoreError {
    fn from(e: chanauth_core::CoreError) -> Self {
        StoreError::InvalidData(e.to_string())
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
