//! # chanauth perms
//!
//! The permission gate: decides whether a chat identity may perform an
//! action, based on the permissions stored on its bound account.
//!
//! ## Key Concepts
//!
//! - **Anonymous**: an identity without an account binding is refused
//!   without a store query
//! - **Admin**: the `admin` permission implies every other permission, and
//!   only admins may grant or revoke `admin`
//! - **Fail-closed**: a store error or missed deadline is a refusal
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use chanauth_core::UserRecord;
//! use chanauth_perms::{permission, PermissionGate};
//! use chanauth_store::MemoryStore;
//!
//! async fn example(user: &UserRecord) {
//!     let gate = PermissionGate::new(Arc::new(MemoryStore::new()));
//!     if gate.user_can(user, permission::WHOIS).await {
//!         // ...
//!     }
//! }
//! ```

pub mod error;
pub mod gate;
pub mod permission;

pub use error::{PermsError, Result};
pub use gate::PermissionGate;
pub use permission::{is_escalation, ADD_PERM, ADMIN, CHECK_PERMS, DEL_PERM, WHOIS};
