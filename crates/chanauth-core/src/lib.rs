//! # chanauth core
//!
//! Pure types for the chanauth workspace: durable accounts, the in-memory
//! identity record, chat events, and password hashing.
//!
//! This crate contains no I/O and no storage.
//!
//! ## Key Types
//!
//! - [`Account`] - A uniquely named credential + permission record
//! - [`UserRecord`] - The bot's view of one chat identity it shares channels with
//! - [`ChatEvent`] - Membership and message events consumed by the tracker
//! - [`PasswordHasher`] - Salted BLAKE3 password digests
//!
//! Raw protocol lines can be decoded into events with [`parse_event`].

pub mod crypto;
pub mod error;
pub mod event;
pub mod line;
pub mod types;

pub use crypto::{PasswordHash, PasswordHasher, HASH_HEX_LEN};
pub use error::{CoreError, Result};
pub use event::{ChatEvent, Identity};
pub use line::{parse_event, Line};
pub use types::{Account, AccountId, UserRecord};
