//! Store wrappers for exercising failure paths.

use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use chanauth_core::{Account, PasswordHash};
use chanauth_store::{
    AccountFilter, InsertResult, Result, Store, StoreError, UpdateResult, UpsertResult,
};

/// How a [`FailingStore`] answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailMode {
    /// Delegate to the inner store.
    Pass,
    /// Fail every call with [`StoreError::Unavailable`].
    Error,
    /// Fail every call with [`StoreError::Timeout`], as a busy database would.
    Timeout,
    /// Never answer. Pair with a store deadline.
    Hang,
    /// Answer reads; fail writes with [`StoreError::Unavailable`].
    WriteError,
}

impl FailMode {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => FailMode::Error,
            2 => FailMode::Timeout,
            3 => FailMode::Hang,
            4 => FailMode::WriteError,
            _ => FailMode::Pass,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            FailMode::Pass => 0,
            FailMode::Error => 1,
            FailMode::Timeout => 2,
            FailMode::Hang => 3,
            FailMode::WriteError => 4,
        }
    }
}

/// Wraps a store and fails on demand.
pub struct FailingStore<S> {
    inner: S,
    mode: AtomicU8,
    failures: AtomicUsize,
}

impl<S: Store> FailingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            mode: AtomicU8::new(FailMode::Pass.as_u8()),
            failures: AtomicUsize::new(0),
        }
    }

    pub fn set_mode(&self, mode: FailMode) {
        self.mode.store(mode.as_u8(), Ordering::SeqCst);
    }

    pub fn mode(&self) -> FailMode {
        FailMode::from_u8(self.mode.load(Ordering::SeqCst))
    }

    /// Number of calls failed so far.
    pub fn failures(&self) -> usize {
        self.failures.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    async fn gate(&self, op: &str) -> Result<()> {
        self.gate_op(op, false).await
    }

    async fn gate_write(&self, op: &str) -> Result<()> {
        self.gate_op(op, true).await
    }

    async fn gate_op(&self, op: &str, write: bool) -> Result<()> {
        let mode = self.mode();
        if mode == FailMode::Pass || (mode == FailMode::WriteError && !write) {
            return Ok(());
        }
        self.failures.fetch_add(1, Ordering::SeqCst);
        debug!(op, ?mode, "injected store failure");
        match mode {
            FailMode::Pass => Ok(()),
            FailMode::Error | FailMode::WriteError => Err(StoreError::Unavailable(format!("injected failure in {}", op))),
            FailMode::Timeout => Err(StoreError::Timeout(format!("injected timeout in {}", op))),
            FailMode::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(StoreError::Timeout(format!("{} hung", op)))
            }
        }
    }
}

#[async_trait]
impl<S: Store> Store for FailingStore<S> {
    async fn find_one(&self, filter: &AccountFilter) -> Result<Option<Account>> {
        self.gate("find_one").await?;
        self.inner.find_one(filter).await
    }

    async fn count(&self, filter: &AccountFilter) -> Result<u64> {
        self.gate("count").await?;
        self.inner.count(filter).await
    }

    async fn list(&self) -> Result<Vec<Account>> {
        self.gate("list").await?;
        self.inner.list().await
    }

    async fn insert(&self, name: &str, password_hash: &PasswordHash) -> Result<InsertResult> {
        self.gate_write("insert").await?;
        self.inner.insert(name, password_hash).await
    }

    async fn push_permission(&self, filter: &AccountFilter, perm: &str) -> Result<UpdateResult> {
        self.gate_write("push_permission").await?;
        self.inner.push_permission(filter, perm).await
    }

    async fn pull_permission(&self, filter: &AccountFilter, perm: &str) -> Result<UpdateResult> {
        self.gate_write("pull_permission").await?;
        self.inner.pull_permission(filter, perm).await
    }

    async fn upsert_password(
        &self,
        name: &str,
        password_hash: &PasswordHash,
    ) -> Result<UpsertResult> {
        self.gate_write("upsert_password").await?;
        self.inner.upsert_password(name, password_hash).await
    }
}

/// Wraps a store and counts every call.
pub struct CountingStore<S> {
    inner: S,
    calls: AtomicUsize,
}

impl<S: Store> CountingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.calls.store(0, Ordering::SeqCst);
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn tick(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl<S: Store> Store for CountingStore<S> {
    async fn find_one(&self, filter: &AccountFilter) -> Result<Option<Account>> {
        self.tick();
        self.inner.find_one(filter).await
    }

    async fn count(&self, filter: &AccountFilter) -> Result<u64> {
        self.tick();
        self.inner.count(filter).await
    }

    async fn list(&self) -> Result<Vec<Account>> {
        self.tick();
        self.inner.list().await
    }

    async fn insert(&self, name: &str, password_hash: &PasswordHash) -> Result<InsertResult> {
        self.tick();
        self.inner.insert(name, password_hash).await
    }

    async fn push_permission(&self, filter: &AccountFilter, perm: &str) -> Result<UpdateResult> {
        self.tick();
        self.inner.push_permission(filter, perm).await
    }

    async fn pull_permission(&self, filter: &AccountFilter, perm: &str) -> Result<UpdateResult> {
        self.tick();
        self.inner.pull_permission(filter, perm).await
    }

    async fn upsert_password(
        &self,
        name: &str,
        password_hash: &PasswordHash,
    ) -> Result<UpsertResult> {
        self.tick();
        self.inner.upsert_password(name, password_hash).await
    }
}
