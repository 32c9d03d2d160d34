//! # chanauth tracker
//!
//! Correlates transient chat identities (nicknames) with logged-in accounts
//! across membership churn.
//!
//! ## Overview
//!
//! The chat protocol never tells the bot that someone it cannot see has gone
//! away, so the tracker only keeps identities the bot currently shares a
//! channel with. Every join, part, nick change, quit and names-list batch is
//! fed through [`IdentityTracker::apply`]; a welcome (reconnect) clears all
//! state, which logs everyone out.
//!
//! ## Invariants
//!
//! - A record exists iff its channel set is non-empty.
//! - A rename keeps the account binding and channels; renames of untracked
//!   nicks do nothing.
//! - Leaving the last shared channel, quitting, or a reconnect drops the
//!   account binding.

pub mod events;
pub mod tracker;

#[cfg(test)]
mod properties;

pub use events::strip_privilege_marker;
pub use tracker::IdentityTracker;
