//! # chanauth
//!
//! Account login and permission-gated commands for IRC-style chat bots.
//!
//! ## Overview
//!
//! A chat identity (nickname) can register an account, log in to it, and
//! use whatever permissions the account holds. chanauth keeps track of which
//! nicks are logged in as which accounts across joins, parts, nick changes,
//! quits and reconnects, and never lets an identity that has lost its
//! standing act on it.
//!
//! ## Key Types
//!
//! - [`Bot`] - Feeds events to the tracker and routes commands
//! - [`GenericAuth`] - The account commands and their state
//! - [`CommandMux`] - Name-to-handler table, owned by the bot
//! - [`CheckPerm`] - Gates any handler on a permission
//! - [`AuthConfig`] - Prefix, salt and store deadline
//!
//! ## Commands
//!
//! All account commands are private-message only:
//!
//! | Command | Needs |
//! |---|---|
//! | `login <username> <password>` | to share a channel with the bot |
//! | `logout` | to be logged in |
//! | `register <username> <password>` | to be logged out |
//! | `addperm <user> <perm>` | `addperm` |
//! | `delperm <user> <perm>` | `delperm` |
//! | `checkperms <user>` | `checkperms` |
//! | `whois <nick>` | `whois` |
//! | `passwd <newpass>` | to be logged in |
//!
//! `admin` implies every permission, and only admins can grant or revoke it.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use chanauth::{AuthConfig, AuthError, Bot, Reply};
//! use chanauth::store::SqliteStore;
//!
//! async fn example(lines: Vec<String>) -> chanauth::Result<()> {
//!     let store = Arc::new(SqliteStore::open("accounts.db").unwrap());
//!     let config = AuthConfig::from_env()?;
//!     let mut bot = Bot::new("seabird", store, config)?;
//!
//!     let mut replies: Vec<Reply> = Vec::new();
//!     for line in &lines {
//!         match bot.handle_line(line, &mut replies).await {
//!             Ok(()) => {}
//!             // Failures are local to one command or line; keep going.
//!             Err(e @ (AuthError::Store { .. } | AuthError::Line(_))) => {
//!                 tracing::warn!(error = %e, "line dropped");
//!             }
//!             Err(e) => return Err(e),
//!         }
//!     }
//!     for reply in replies.drain(..) {
//!         println!("{}", reply.to_privmsg());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `chanauth::core` - Accounts, user records, events, password hashing
//! - `chanauth::store` - Account store trait, SQLite and in-memory stores
//! - `chanauth::tracker` - The identity tracker
//! - `chanauth::perms` - The permission gate

pub mod auth;
pub mod bot;
pub mod config;
pub mod context;
pub mod decorator;
pub mod error;
pub mod mux;
pub mod reply;

// Re-export component crates
pub use chanauth_core as core;
pub use chanauth_perms as perms;
pub use chanauth_store as store;
pub use chanauth_tracker as tracker;

pub use auth::{AuthCommand, GenericAuth};
pub use bot::Bot;
pub use config::AuthConfig;
pub use context::CommandContext;
pub use decorator::CheckPerm;
pub use error::{AuthError, CommandError, CommandResult, ErrorKind, Result};
pub use mux::{CommandHandler, CommandMux, CommandScope, FnCommand};
pub use reply::{Reply, ReplySink};
