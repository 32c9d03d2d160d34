//! In-memory implementation of the Store trait.
//!
//! Same semantics as SQLite, no persistence. Used by tests and by hosts that
//! do not need accounts to survive a restart.

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use chanauth_core::{Account, AccountId, PasswordHash};

use crate::error::{Result, StoreError};
use crate::traits::{AccountFilter, InsertResult, Store, UpdateResult, UpsertResult};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

struct MemoryStoreInner {
    /// Accounts indexed by id; iteration order is insertion order.
    accounts: BTreeMap<AccountId, Account>,

    /// Unique name index: name -> id.
    by_name: HashMap<String, AccountId>,

    next_id: i64,
}

impl MemoryStoreInner {
    fn first_match(&self, filter: &AccountFilter) -> Option<AccountId> {
        // Names are unique, so a name filter resolves through the index.
        if let Some(ref name) = filter.name {
            let id = self.by_name.get(name)?;
            return self
                .accounts
                .get(id)
                .filter(|a| filter.matches(a))
                .map(|a| a.id);
        }
        self.accounts.values().find(|a| filter.matches(a)).map(|a| a.id)
    }

    fn create(&mut self, name: &str, password_hash: &PasswordHash) -> AccountId {
        self.next_id += 1;
        let id = AccountId(self.next_id);
        self.accounts.insert(
            id,
            Account {
                id,
                name: name.to_string(),
                password_hash: password_hash.clone(),
                perms: Vec::new(),
            },
        );
        self.by_name.insert(name.to_string(), id);
        id
    }
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner {
                accounts: BTreeMap::new(),
                by_name: HashMap::new(),
                next_id: 0,
            }),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryStoreInner>> {
        self.inner
            .read()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryStoreInner>> {
        self.inner
            .write()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {}", e)))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_one(&self, filter: &AccountFilter) -> Result<Option<Account>> {
        let inner = self.read()?;
        Ok(inner
            .first_match(filter)
            .and_then(|id| inner.accounts.get(&id).cloned()))
    }

    async fn count(&self, filter: &AccountFilter) -> Result<u64> {
        let inner = self.read()?;
        let n = if filter.name.is_some() {
            inner.first_match(filter).map_or(0, |_| 1)
        } else {
            inner.accounts.values().filter(|a| filter.matches(a)).count()
        };
        Ok(n as u64)
    }

    async fn list(&self) -> Result<Vec<Account>> {
        let inner = self.read()?;
        Ok(inner.accounts.values().cloned().collect())
    }

    async fn insert(&self, name: &str, password_hash: &PasswordHash) -> Result<InsertResult> {
        let mut inner = self.write()?;

        if inner.by_name.contains_key(name) {
            return Ok(InsertResult::AlreadyExists);
        }

        Ok(InsertResult::Inserted(inner.create(name, password_hash)))
    }

    async fn push_permission(&self, filter: &AccountFilter, perm: &str) -> Result<UpdateResult> {
        let mut inner = self.write()?;

        let Some(id) = inner.first_match(filter) else {
            return Ok(UpdateResult::default());
        };
        let Some(account) = inner.accounts.get_mut(&id) else {
            return Ok(UpdateResult::default());
        };

        if account.has_perm(perm) {
            return Ok(UpdateResult {
                matched: 1,
                modified: 0,
            });
        }
        account.perms.push(perm.to_string());

        Ok(UpdateResult {
            matched: 1,
            modified: 1,
        })
    }

    async fn pull_permission(&self, filter: &AccountFilter, perm: &str) -> Result<UpdateResult> {
        let mut inner = self.write()?;

        let Some(id) = inner.first_match(filter) else {
            return Ok(UpdateResult::default());
        };
        let Some(account) = inner.accounts.get_mut(&id) else {
            return Ok(UpdateResult::default());
        };

        let before = account.perms.len();
        account.perms.retain(|p| p != perm);

        Ok(UpdateResult {
            matched: 1,
            modified: u64::from(account.perms.len() != before),
        })
    }

    async fn upsert_password(
        &self,
        name: &str,
        password_hash: &PasswordHash,
    ) -> Result<UpsertResult> {
        let mut inner = self.write()?;

        let existing = inner.by_name.get(name).copied();
        if let Some(id) = existing {
            if let Some(account) = inner.accounts.get_mut(&id) {
                account.password_hash = password_hash.clone();
                return Ok(UpsertResult::Updated);
            }
        }

        Ok(UpsertResult::Inserted(inner.create(name, password_hash)))
    }
}
