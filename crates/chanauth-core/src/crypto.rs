//! Password hashing.
//!
//! Hashes are BLAKE3 over `salt || plaintext`, rendered as lowercase hex. The
//! salt is process-wide configuration, not per account, so the same password
//! under the same salt always yields the same hash and stores can match on it
//! with a plain equality predicate.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Length of a rendered hash in hex characters.
pub const HASH_HEX_LEN: usize = 64;

/// A password digest as stored: 64 lowercase hex characters.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Accept a stored hash, rejecting anything that is not 64 lowercase hex chars.
    pub fn from_hex(s: impl Into<String>) -> Result<Self> {
        let s = s.into();
        let well_formed = s.len() == HASH_HEX_LEN
            && s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if !well_formed {
            return Err(CoreError::InvalidPasswordHash(format!(
                "expected {} lowercase hex chars",
                HASH_HEX_LEN
            )));
        }
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PasswordHash({}...)", &self.0[..8])
    }
}

impl TryFrom<String> for PasswordHash {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl From<PasswordHash> for String {
    fn from(h: PasswordHash) -> Self {
        h.0
    }
}

/// Salted password hasher.
#[derive(Clone)]
pub struct PasswordHasher {
    salt: String,
}

impl PasswordHasher {
    pub fn new(salt: impl Into<String>) -> Self {
        Self { salt: salt.into() }
    }

    /// Hash a plaintext password.
    pub fn hash(&self, plaintext: &str) -> PasswordHash {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.salt.as_bytes());
        hasher.update(plaintext.as_bytes());
        PasswordHash(hex::encode(hasher.finalize().as_bytes()))
    }

    pub fn verify(&self, plaintext: &str, hash: &PasswordHash) -> bool {
        self.hash(plaintext) == *hash
    }
}

impl fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("salt", &"<redacted>")
            .finish()
    }
}
