//! Test fixtures and helpers.
//!
//! Common setup code for integration tests: a [`Bot`] over a store the test
//! keeps a handle to, plus shorthands for feeding it events.

use std::sync::Arc;

use chanauth::{AuthConfig, Bot, Reply, Result};
use chanauth_core::{Account, ChatEvent, UserRecord};
use chanauth_store::{AccountFilter, MemoryStore, Store, StoreExt};

/// The bot's nick in fixtures.
pub const BOT_NICK: &str = "seabird";
/// The salt used by fixtures.
pub const TEST_SALT: &str = "testkit-salt";
/// The channel most helpers join.
pub const HOME_CHANNEL: &str = "#home";

/// A bot, its store, and every reply it has produced.
pub struct TestFixture<S: Store = MemoryStore> {
    pub bot: Bot<S>,
    pub store: Arc<S>,
    pub replies: Vec<Reply>,
}

impl TestFixture<MemoryStore> {
    /// A fixture over a fresh in-memory store.
    pub fn new() -> Self {
        Self::with_store(Arc::new(MemoryStore::new()))
    }
}

impl Default for TestFixture<MemoryStore> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Store> TestFixture<S> {
    /// A fixture over `store` with the default test configuration.
    pub fn with_store(store: Arc<S>) -> Self {
        Self::with_config(store, AuthConfig::new().salt(TEST_SALT))
    }

    pub fn with_config(store: Arc<S>, config: AuthConfig) -> Self {
        let bot = Bot::new(BOT_NICK, Arc::clone(&store), config)
            .unwrap_or_else(|e| panic!("fixture config rejected: {}", e));
        Self {
            bot,
            store,
            replies: Vec::new(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Store Setup
    // ─────────────────────────────────────────────────────────────────────────

    /// Create an account directly in the store, bypassing the bot.
    pub async fn seed_account(&self, name: &str, password: &str, perms: &[&str]) {
        let hash = self.bot.auth().hasher().hash(password);
        self.store
            .insert(name, &hash)
            .await
            .unwrap_or_else(|e| panic!("seeding {}: {}", name, e));
        for perm in perms {
            self.store
                .push_permission(&AccountFilter::by_name(name), perm)
                .await
                .unwrap_or_else(|e| panic!("seeding {} perm {}: {}", name, perm, e));
        }
    }

    /// The stored account, read directly from the store.
    pub async fn account(&self, name: &str) -> Option<Account> {
        self.store
            .find_by_name(name)
            .await
            .unwrap_or_else(|e| panic!("reading {}: {}", name, e))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Events
    // ─────────────────────────────────────────────────────────────────────────

    /// Feed one event, collecting replies.
    pub async fn event(&mut self, event: ChatEvent) -> Result<()> {
        self.bot.handle_event(&event, &mut self.replies).await
    }

    /// Feed one raw protocol line, collecting replies.
    pub async fn line(&mut self, raw: &str) -> Result<()> {
        self.bot.handle_line(raw, &mut self.replies).await
    }

    async fn membership(&mut self, event: ChatEvent) {
        self.event(event)
            .await
            .unwrap_or_else(|e| panic!("membership events never fail: {}", e));
    }

    pub async fn join(&mut self, nick: &str, channel: &str) {
        self.membership(ChatEvent::join(nick, channel)).await;
    }

    pub async fn part(&mut self, nick: &str, channel: &str) {
        self.membership(ChatEvent::part(nick, channel)).await;
    }

    pub async fn quit(&mut self, nick: &str) {
        self.membership(ChatEvent::quit(nick)).await;
    }

    pub async fn rename(&mut self, old: &str, new: &str) {
        self.membership(ChatEvent::nick(old, new)).await;
    }

    pub async fn names(&mut self, channel: &str, nicks: &[&str]) {
        self.membership(ChatEvent::names(channel, nicks)).await;
    }

    pub async fn welcome(&mut self) {
        let nick = self.bot.nick().to_string();
        self.membership(ChatEvent::welcome(&nick)).await;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Commands
    // ─────────────────────────────────────────────────────────────────────────

    /// Send `text` privately to the bot as `nick`; returns the replies it
    /// produced.
    pub async fn say(&mut self, nick: &str, text: &str) -> Result<Vec<Reply>> {
        let target = self.bot.nick().to_string();
        self.say_to(nick, &target, text).await
    }

    /// Send `text` to `target` (a channel or the bot) as `nick`.
    pub async fn say_to(&mut self, nick: &str, target: &str, text: &str) -> Result<Vec<Reply>> {
        let before = self.replies.len();
        self.event(ChatEvent::message(nick, target, text)).await?;
        Ok(self.replies[before..].to_vec())
    }

    /// Like [`say`](Self::say), expecting exactly one reply; returns its text.
    pub async fn ask(&mut self, nick: &str, text: &str) -> String {
        let replies = self
            .say(nick, text)
            .await
            .unwrap_or_else(|e| panic!("{:?} from {} failed: {}", text, nick, e));
        match replies.as_slice() {
            [reply] => reply.text.clone(),
            other => panic!("expected one reply to {:?}, got {:?}", text, other),
        }
    }

    /// Join [`HOME_CHANNEL`] as `nick` and log in.
    pub async fn login(&mut self, nick: &str, account: &str, password: &str) {
        self.join(nick, HOME_CHANNEL).await;
        let reply = self
            .ask(nick, &format!("!login {} {}", account, password))
            .await;
        assert_eq!(reply, format!("you are now logged in as '{}'", account));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Inspection
    // ─────────────────────────────────────────────────────────────────────────

    pub fn record(&self, nick: &str) -> Option<UserRecord> {
        self.bot.auth().tracker().get(nick).cloned()
    }

    /// The account `nick` is logged in as.
    pub fn logged_in_as(&self, nick: &str) -> Option<String> {
        self.record(nick).and_then(|u| u.account)
    }
}
