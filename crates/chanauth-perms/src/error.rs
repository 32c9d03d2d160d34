//! Error types for the permissions module.

use thiserror::Error;

/// Errors that can occur during permission checks.
#[derive(Debug, Error)]
pub enum PermsError {
    /// The identity is not bound to an account.
    #[error("not logged in")]
    NotLoggedIn,

    /// The account lacks the permission (or the check could not be completed).
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Only admins may grant or revoke the admin permission.
    #[error("permission '{0}' can only be managed by admins")]
    AdminRequired(String),
}

/// Result type for permission operations.
pub type Result<T> = std::result::Result<T, PermsError>;
