//! Store trait: the abstract interface for account persistence.
//!
//! The store behaves like a single document collection. Each account is one
//! document `{id, name, password_hash, perms}`; callers address documents with
//! an [`AccountFilter`] predicate, count or fetch them, and mutate the `perms`
//! array with push/pull operations that are atomic per document.

use async_trait::async_trait;
use chanauth_core::{Account, AccountId, PasswordHash};

use crate::error::Result;

/// Predicate over accounts. Every field that is set must match.
///
/// `permission` matches when the account's `perms` array contains it, the way
/// a document store matches a scalar against an array field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountFilter {
    pub name: Option<String>,
    pub password_hash: Option<PasswordHash>,
    pub permission: Option<String>,
}

impl AccountFilter {
    /// Match every account.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_password(mut self, hash: PasswordHash) -> Self {
        self.password_hash = Some(hash);
        self
    }

    pub fn with_permission(mut self, perm: impl Into<String>) -> Self {
        self.permission = Some(perm.into());
        self
    }

    pub fn matches(&self, account: &Account) -> bool {
        if let Some(ref name) = self.name {
            if &account.name != name {
                return false;
            }
        }
        if let Some(ref hash) = self.password_hash {
            if &account.password_hash != hash {
                return false;
            }
        }
        if let Some(ref perm) = self.permission {
            if !account.has_perm(perm) {
                return false;
            }
        }
        true
    }
}

/// Result of inserting an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertResult {
    /// Account was created with this id.
    Inserted(AccountId),
    /// An account with the same name already exists. Nothing was written.
    AlreadyExists,
}

/// Result of an update addressed by filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateResult {
    /// Documents the filter matched (0 or 1; updates touch the first match).
    pub matched: u64,
    /// Documents actually changed.
    pub modified: u64,
}

impl UpdateResult {
    pub fn matched_any(&self) -> bool {
        self.matched > 0
    }
}

/// Result of a password upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertResult {
    /// An existing account was updated.
    Updated,
    /// No account matched, so one was created.
    Inserted(AccountId),
}

/// The Store trait: async interface for account persistence.
///
/// All methods are async to support both blocking (SQLite) and async backends.
/// For SQLite, work runs on `spawn_blocking` so the runtime is not stalled.
///
/// # Design Notes
///
/// - **Unique names**: `insert` returns `AlreadyExists` rather than an error on
///   a duplicate name.
/// - **Set-like perms**: `push_permission` never appends a value that is
///   already present; `pull_permission` removes every occurrence.
/// - **First match**: filter-addressed updates touch at most one account,
///   the lowest id among matches.
/// - **Distinguishable failures**: lock contention and deadlines surface as
///   `StoreError::Timeout`.
#[async_trait]
pub trait Store: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    /// Fetch the first account matching `filter`.
    async fn find_one(&self, filter: &AccountFilter) -> Result<Option<Account>>;

    /// Count accounts matching `filter`.
    async fn count(&self, filter: &AccountFilter) -> Result<u64>;

    /// All accounts, ordered by id.
    async fn list(&self) -> Result<Vec<Account>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Create an account with no permissions.
    async fn insert(&self, name: &str, password_hash: &PasswordHash) -> Result<InsertResult>;

    /// Append `perm` to the first matching account's `perms` if absent.
    async fn push_permission(&self, filter: &AccountFilter, perm: &str) -> Result<UpdateResult>;

    /// Remove `perm` from the first matching account's `perms`.
    async fn pull_permission(&self, filter: &AccountFilter, perm: &str) -> Result<UpdateResult>;

    /// Set the password hash of the account named `name`, creating the account
    /// if it does not exist.
    async fn upsert_password(&self, name: &str, password_hash: &PasswordHash)
        -> Result<UpsertResult>;
}

/// Extension trait for common store patterns.
pub trait StoreExt: Store {
    /// Look an account up by its unique name.
    fn find_by_name(
        &self,
        name: &str,
    ) -> impl std::future::Future<Output = Result<Option<Account>>> + Send;

    /// Whether an account with this name exists.
    fn name_exists(&self, name: &str) -> impl std::future::Future<Output = Result<bool>> + Send;

    /// Whether the named account holds `perm` literally.
    fn holds_permission(
        &self,
        name: &str,
        perm: &str,
    ) -> impl std::future::Future<Output = Result<bool>> + Send;

    /// Whether `name` and `password_hash` identify an account.
    fn credentials_match(
        &self,
        name: &str,
        password_hash: &PasswordHash,
    ) -> impl std::future::Future<Output = Result<bool>> + Send;
}

impl<S: Store + ?Sized> StoreExt for S {
    async fn find_by_name(&self, name: &str) -> Result<Option<Account>> {
        self.find_one(&AccountFilter::by_name(name)).await
    }

    async fn name_exists(&self, name: &str) -> Result<bool> {
        Ok(self.count(&AccountFilter::by_name(name)).await? > 0)
    }

    async fn holds_permission(&self, name: &str, perm: &str) -> Result<bool> {
        let filter = AccountFilter::by_name(name).with_permission(perm);
        Ok(self.count(&filter).await? > 0)
    }

    async fn credentials_match(&self, name: &str, password_hash: &PasswordHash) -> Result<bool> {
        let filter = AccountFilter::by_name(name).with_password(password_hash.clone());
        Ok(self.count(&filter).await? > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chanauth_core::PasswordHasher;

    fn account(name: &str, pw: &str, perms: &[&str]) -> Account {
        Account {
            id: AccountId(1),
            name: name.to_string(),
            password_hash: PasswordHasher::new("salt").hash(pw),
            perms: perms.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn test_filter_all_matches_everything() {
        assert!(AccountFilter::all().matches(&account("a", "pw", &[])));
    }

    #[test]
    fn test_filter_fields_are_conjunctive() {
        let hasher = PasswordHasher::new("salt");
        let a = account("alice", "secret", &["whois"]);

        assert!(AccountFilter::by_name("alice").matches(&a));
        assert!(!AccountFilter::by_name("Alice").matches(&a));

        let f = AccountFilter::by_name("alice").with_password(hasher.hash("secret"));
        assert!(f.matches(&a));
        let f = AccountFilter::by_name("alice").with_password(hasher.hash("wrong"));
        assert!(!f.matches(&a));

        assert!(AccountFilter::by_name("alice").with_permission("whois").matches(&a));
        assert!(!AccountFilter::by_name("alice").with_permission("admin").matches(&a));
    }
}
