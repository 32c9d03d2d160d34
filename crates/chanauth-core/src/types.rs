//! Accounts and the in-memory identity record.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::crypto::PasswordHash;

/// Store-assigned identifier of an account.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub i64);

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({})", self.0)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A durable, uniquely named credential and permission record.
///
/// `perms` behaves as a set: stores never append a permission that is already
/// present. Order is grant order, which is what listings show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub password_hash: PasswordHash,
    #[serde(default)]
    pub perms: Vec<String>,
}

impl Account {
    /// Whether the account holds `perm` literally (no admin expansion).
    pub fn has_perm(&self, perm: &str) -> bool {
        self.perms.iter().any(|p| p == perm)
    }

    /// Permissions joined for display.
    pub fn perms_display(&self) -> String {
        self.perms.join(", ")
    }
}

/// The bot's view of one chat identity it currently shares channels with.
///
/// Keyed by `current_nick` in the tracker. `account` is `Some` only while the
/// identity is logged in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserRecord {
    pub current_nick: String,
    pub account: Option<String>,
    pub channels: Vec<String>,
}

impl UserRecord {
    /// A fresh, unauthenticated record sharing no channels.
    pub fn new(nick: impl Into<String>) -> Self {
        Self {
            current_nick: nick.into(),
            account: None,
            channels: Vec::new(),
        }
    }

    pub fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.account.is_some()
    }

    /// Whether the record shares at least one channel with the bot.
    pub fn is_co_present(&self) -> bool {
        !self.channels.is_empty()
    }

    pub fn in_channel(&self, channel: &str) -> bool {
        self.channels.iter().any(|c| c == channel)
    }

    /// Add a channel. Returns false if it was already present.
    pub fn add_channel(&mut self, channel: &str) -> bool {
        if self.in_channel(channel) {
            return false;
        }
        self.channels.push(channel.to_string());
        true
    }

    /// Remove a channel. Returns true if it was present.
    ///
    /// Channel order carries no meaning, so this swaps with the last element.
    pub fn remove_channel(&mut self, channel: &str) -> bool {
        match self.channels.iter().position(|c| c == channel) {
            Some(i) => {
                self.channels.swap_remove(i);
                true
            }
            None => false,
        }
    }
}
