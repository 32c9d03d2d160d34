//! The identity tracker: nickname -> [`UserRecord`].
//!
//! The tracker holds a record for every nick the bot currently shares at least
//! one channel with, and nothing else. Records are born on the first join or
//! names-list sighting and die when their last shared channel goes away.
//! Login state lives on the record, so it dies with it.

use std::collections::HashMap;

use tracing::debug;

use chanauth_core::UserRecord;

/// In-memory map of co-present identities.
///
/// Invariant: every record in the map has a non-empty channel set.
#[derive(Debug, Default)]
pub struct IdentityTracker {
    users: HashMap<String, UserRecord>,
}

impl IdentityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// The tracked record for `nick`, if any.
    pub fn get(&self, nick: &str) -> Option<&UserRecord> {
        self.users.get(nick)
    }

    /// The tracked record for `nick`, or a transient one with no channels and
    /// no account. The transient record is not inserted.
    pub fn get_or_create(&self, nick: &str) -> UserRecord {
        self.users
            .get(nick)
            .cloned()
            .unwrap_or_else(|| UserRecord::new(nick))
    }

    pub fn contains(&self, nick: &str) -> bool {
        self.users.contains_key(nick)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &UserRecord> {
        self.users.values()
    }

    /// Record that `nick` is in `channel`, creating the record if needed.
    pub fn add_channel(&mut self, channel: &str, nick: &str) {
        self.users
            .entry(nick.to_string())
            .or_insert_with(|| UserRecord::new(nick))
            .add_channel(channel);
    }

    /// Record that `nick` left `channel`. Returns true if this evicted the
    /// record. Untracked nicks are ignored.
    pub fn remove_channel(&mut self, channel: &str, nick: &str) -> bool {
        let Some(user) = self.users.get_mut(nick) else {
            return false;
        };
        user.remove_channel(channel);
        if user.is_co_present() {
            return false;
        }
        self.evict(nick);
        true
    }

    /// Remove `channel` from every record, evicting those left with none.
    /// Returns the number of evicted records.
    pub fn part_everywhere(&mut self, channel: &str) -> usize {
        let before = self.users.len();
        self.users.retain(|_, user| {
            user.remove_channel(channel);
            user.is_co_present()
        });
        let evicted = before - self.users.len();
        if evicted > 0 {
            debug!(channel, evicted, "cleared channel occupants");
        }
        evicted
    }

    /// Re-key `old` as `new`, keeping account and channels. Only tracked nicks
    /// are renamed; returns false otherwise.
    pub fn rename(&mut self, old: &str, new: &str) -> bool {
        if old == new {
            return self.users.contains_key(old);
        }
        let Some(mut user) = self.users.remove(old) else {
            return false;
        };
        user.current_nick = new.to_string();
        if let Some(stale) = self.users.insert(new.to_string(), user) {
            debug!(nick = new, account = ?stale.account, "rename replaced a stale record");
        }
        true
    }

    /// Drop `nick`'s record outright (quit).
    pub fn remove(&mut self, nick: &str) -> Option<UserRecord> {
        let removed = self.users.remove(nick);
        if let Some(ref user) = removed {
            debug!(nick, account = ?user.account, "identity removed");
        }
        removed
    }

    /// Forget everything. Called on (re)connect.
    pub fn reset(&mut self) {
        if !self.users.is_empty() {
            debug!(dropped = self.users.len(), "identity tracker reset");
        }
        self.users.clear();
    }

    /// Bind `nick` to `account`. Only tracked nicks can be bound.
    pub fn set_account(&mut self, nick: &str, account: &str) -> bool {
        match self.users.get_mut(nick) {
            Some(user) => {
                user.account = Some(account.to_string());
                true
            }
            None => false,
        }
    }

    /// Unbind `nick`, returning the account it was bound to.
    pub fn clear_account(&mut self, nick: &str) -> Option<String> {
        self.users.get_mut(nick).and_then(|user| user.account.take())
    }

    fn evict(&mut self, nick: &str) {
        if let Some(user) = self.users.remove(nick) {
            debug!(nick, account = ?user.account, "identity left last shared channel");
        }
    }
}
