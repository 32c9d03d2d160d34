//! Configuration for the auth subsystem.

use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::error::{AuthError, Result};

/// Environment variable holding the command prefix.
pub const ENV_PREFIX: &str = "CHANAUTH_PREFIX";
/// Environment variable holding the password salt.
pub const ENV_SALT: &str = "CHANAUTH_SALT";
/// Environment variable holding the store deadline in milliseconds.
pub const ENV_STORE_TIMEOUT_MS: &str = "CHANAUTH_STORE_TIMEOUT_MS";

/// Configuration for [`GenericAuth`](crate::GenericAuth) and [`Bot`](crate::Bot).
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Command prefix, e.g. `!` for `!login`.
    pub prefix: String,
    /// Process-wide salt prepended to every password before hashing.
    pub salt: String,
    /// Deadline for each store call made while handling an event.
    #[serde(rename = "store_timeout_ms", deserialize_with = "millis")]
    pub store_timeout: Option<Duration>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            prefix: "!".to_string(),
            salt: String::new(),
            store_timeout: None,
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("prefix", &self.prefix)
            .field("salt", &"<redacted>")
            .field("store_timeout", &self.store_timeout)
            .finish()
    }
}

impl AuthConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn salt(mut self, salt: impl Into<String>) -> Self {
        self.salt = salt.into();
        self
    }

    pub fn store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = Some(timeout);
        self
    }

    /// Defaults overridden by `CHANAUTH_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(prefix) = lookup(ENV_PREFIX) {
            config.prefix = prefix;
        }
        if let Some(salt) = lookup(ENV_SALT) {
            config.salt = salt;
        }
        if let Some(ms) = lookup(ENV_STORE_TIMEOUT_MS) {
            let ms: u64 = ms.trim().parse().map_err(|_| {
                AuthError::Config(format!(
                    "{} must be a whole number, got {:?}",
                    ENV_STORE_TIMEOUT_MS, ms
                ))
            })?;
            config.store_timeout = Some(Duration::from_millis(ms));
        }
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the command parser cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.prefix.is_empty() {
            return Err(AuthError::Config("command prefix must not be empty".into()));
        }
        if self.prefix.chars().any(char::is_whitespace) {
            return Err(AuthError::Config("command prefix must not contain whitespace".into()));
        }
        if self.store_timeout == Some(Duration::ZERO) {
            return Err(AuthError::Config("store timeout must be positive".into()));
        }
        Ok(())
    }
}

fn millis<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<Duration>, D::Error> {
    Ok(Option::<u64>::deserialize(d)?.map(Duration::from_millis))
}
