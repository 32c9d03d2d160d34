//! # chanauth testkit
//!
//! Testing utilities for chanauth.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: a [`TestFixture`] wrapping a bot, its store and the
//!   replies it produced
//! - **Failure injection**: [`FailingStore`] and [`CountingStore`] wrap any
//!   store to make it fail, hang, or report how often it was queried
//! - **Generators**: proptest strategies for membership churn and commands
//!
//! ## Test Fixtures
//!
//! ```rust,no_run
//! use chanauth_testkit::TestFixture;
//!
//! async fn example() {
//!     let mut fx = TestFixture::new();
//!     fx.seed_account("root", "pw", &["admin"]).await;
//!     fx.login("root", "root", "pw").await;
//!     assert_eq!(fx.ask("root", "!whois root").await, "nick 'root' is user 'root'");
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use chanauth_testkit::generators::session;
//!
//! proptest! {
//!     #[test]
//!     fn never_panics(events in session(64)) {
//!         // feed events to a fixture ...
//!     }
//! }
//! ```

pub mod failing;
pub mod fixtures;
pub mod generators;

pub use failing::{CountingStore, FailMode, FailingStore};
pub use fixtures::{TestFixture, BOT_NICK, HOME_CHANNEL, TEST_SALT};

use tracing_subscriber::EnvFilter;

/// Install a test-friendly tracing subscriber, honouring `RUST_LOG`. Safe to
/// call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
