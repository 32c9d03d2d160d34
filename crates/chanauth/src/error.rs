//! Error types for the auth layer.
//!
//! A failed command is a [`CommandError`]. Most kinds are answered with a
//! reply to the caller and go no further; [`ErrorKind::Store`] is never shown
//! to the caller and surfaces from [`Bot::handle_event`](crate::Bot::handle_event)
//! as [`AuthError::Store`].

use chanauth_core::CoreError;
use chanauth_perms::PermsError;
use chanauth_store::StoreError;
use thiserror::Error;

/// Errors returned to the host.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A store call failed while handling a command.
    #[error("store error while handling '{command}': {source}")]
    Store {
        command: String,
        #[source]
        source: StoreError,
    },

    /// A command with this name is already registered.
    #[error("command already registered: {0}")]
    DuplicateCommand(String),

    /// A raw protocol line could not be parsed.
    #[error("malformed line: {0}")]
    Line(#[from] CoreError),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result type for auth operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Classification of a failed command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed arguments.
    Usage,
    /// The caller is in the wrong state (logged in, logged out, not present,
    /// bad credentials).
    State,
    /// The caller lacks a permission, or it could not be established.
    PermissionDenied,
    /// The named account does not exist or could not be looked up.
    NotFound,
    /// The change would duplicate something that already exists.
    Conflict,
    /// The store failed.
    Store,
}

/// A failed command invocation.
///
/// For every kind but [`ErrorKind::Store`] the display text is the reply
/// sent to the caller.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct CommandError {
    kind: ErrorKind,
    message: String,
    #[source]
    source: Option<StoreError>,
}

impl CommandError {
    fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Usage, message)
    }

    pub fn state(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::State, message)
    }

    pub fn denied(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PermissionDenied, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether the caller should be told about this failure.
    pub fn is_user_visible(&self) -> bool {
        self.kind != ErrorKind::Store
    }

    /// The underlying store failure, for [`ErrorKind::Store`].
    pub fn into_store_error(self) -> Option<StoreError> {
        self.source
    }
}

impl From<StoreError> for CommandError {
    fn from(err: StoreError) -> Self {
        Self {
            kind: ErrorKind::Store,
            message: format!("store failure: {}", err),
            source: Some(err),
        }
    }
}

impl From<PermsError> for CommandError {
    fn from(err: PermsError) -> Self {
        match err {
            PermsError::NotLoggedIn => Self::state("you are not logged in"),
            other => Self::denied(other.to_string()),
        }
    }
}

/// Result of one command: the reply text on success.
pub type CommandResult = std::result::Result<String, CommandError>;
