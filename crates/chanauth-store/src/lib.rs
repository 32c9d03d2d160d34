//! # chanauth store
//!
//! Storage abstraction for chanauth accounts. Provides a trait-based
//! interface for account persistence with SQLite and in-memory
//! implementations.
//!
//! ## Overview
//!
//! The store abstracts a document collection of accounts behind the
//! [`Store`] trait, so the auth layer is storage-agnostic. The persistent
//! implementation is [`SqliteStore`]; [`MemoryStore`] keeps everything in RAM.
//!
//! ## Key Types
//!
//! - [`Store`] - The async trait for all storage operations
//! - [`AccountFilter`] - Predicate used by find/count/update
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage
//!
//! ## Usage
//!
//! ```rust,no_run
//! use chanauth_core::PasswordHasher;
//! use chanauth_store::{AccountFilter, SqliteStore, Store, StoreExt};
//!
//! async fn example() {
//!     let store = SqliteStore::open("accounts.db").unwrap();
//!     let hasher = PasswordHasher::new("salt");
//!
//!     store.insert("alice", &hasher.hash("secret")).await.unwrap();
//!     store
//!         .push_permission(&AccountFilter::by_name("alice"), "admin")
//!         .await
//!         .unwrap();
//!
//!     assert!(store.holds_permission("alice", "admin").await.unwrap());
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Unique names**: inserting an existing name returns `AlreadyExists`
//! - **Set-like perms**: push never duplicates, pull removes every occurrence
//! - **Timeouts are distinguishable**: lock contention and expired
//!   [`with_deadline`] bounds both map to `StoreError::Timeout`

#[cfg(test)]
pub(crate) mod conformance;
pub mod deadline;
pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use deadline::with_deadline;
pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{AccountFilter, InsertResult, Store, StoreExt, UpdateResult, UpsertResult};
