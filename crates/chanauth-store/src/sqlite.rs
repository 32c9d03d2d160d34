//! SQLite implementation of the Store trait.
//!
//! This is the persistent storage backend. It uses rusqlite with bundled
//! SQLite, wrapped in async via tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::{params, params_from_iter, Connection, ErrorCode, OptionalExtension, Transaction};

use chanauth_core::{Account, AccountId, PasswordHash};

use crate::error::{Result, StoreError};
use crate::migration::{self, now_millis};
use crate::traits::{AccountFilter, InsertResult, Store, UpdateResult, UpsertResult};

/// How long a statement waits on a locked database before failing with
/// `StoreError::Timeout`.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteStore {
    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_timeout(path, DEFAULT_BUSY_TIMEOUT)
    }

    /// Open with a custom busy timeout.
    pub fn open_with_timeout(path: impl AsRef<Path>, busy_timeout: Duration) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn, busy_timeout)
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?, DEFAULT_BUSY_TIMEOUT)
    }

    fn from_connection(mut conn: Connection, busy_timeout: Duration) -> Result<Self> {
        conn.busy_timeout(busy_timeout)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| StoreError::Unavailable(format!("mutex poisoned: {}", e)))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Unavailable(format!("spawn_blocking failed: {}", e)))?
    }
}

// Raw column values, decoded outside the rusqlite row callback so that
// decoding failures keep their own error kind.
type AccountRow = (i64, String, String, Vec<u8>);

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AccountRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn decode_account((id, name, password_hash, perms): AccountRow) -> Result<Account> {
    Ok(Account {
        id: AccountId(id),
        name,
        password_hash: PasswordHash::from_hex(password_hash)?,
        perms: decode_perms(&perms)?,
    })
}

// Helper to encode perms to CBOR
fn encode_perms(perms: &[String]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::into_writer(perms, &mut buf)
        .map_err(|e| StoreError::Serialization(e.to_string()))?;
    Ok(buf)
}

fn decode_perms(bytes: &[u8]) -> Result<Vec<String>> {
    if bytes.is_empty() {
        return Ok(Vec::new());
    }
    ciborium::from_reader(bytes).map_err(|e| StoreError::Serialization(e.to_string()))
}

/// Accounts matching `filter`, ordered by id.
///
/// Name and password are matched in SQL; the permission predicate needs the
/// decoded array and is applied afterwards.
fn select_matching(conn: &Connection, filter: &AccountFilter) -> Result<Vec<Account>> {
    let mut sql = String::from("SELECT id, name, password_hash, perms FROM accounts");
    let mut clauses = Vec::new();
    let mut args: Vec<&str> = Vec::new();

    if let Some(ref name) = filter.name {
        clauses.push("name = ?");
        args.push(name);
    }
    if let Some(ref hash) = filter.password_hash {
        clauses.push("password_hash = ?");
        args.push(hash.as_str());
    }
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY id");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(args), read_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut accounts = Vec::with_capacity(rows.len());
    for row in rows {
        let account = decode_account(row)?;
        if filter.matches(&account) {
            accounts.push(account);
        }
    }
    Ok(accounts)
}

fn first_matching(conn: &Connection, filter: &AccountFilter) -> Result<Option<Account>> {
    Ok(select_matching(conn, filter)?.into_iter().next())
}

/// Read-modify-write of one account's perms inside a transaction.
fn update_perms<F>(conn: &mut Connection, filter: &AccountFilter, edit: F) -> Result<UpdateResult>
where
    F: FnOnce(&mut Vec<String>) -> bool,
{
    let tx = conn.transaction()?;

    let Some(mut account) = first_matching(&tx, filter)? else {
        return Ok(UpdateResult::default());
    };

    if !edit(&mut account.perms) {
        return Ok(UpdateResult {
            matched: 1,
            modified: 0,
        });
    }

    write_perms(&tx, &account)?;
    tx.commit()?;

    Ok(UpdateResult {
        matched: 1,
        modified: 1,
    })
}

fn write_perms(tx: &Transaction<'_>, account: &Account) -> Result<()> {
    tx.execute(
        "UPDATE accounts SET perms = ?1, updated_at = ?2 WHERE id = ?3",
        params![encode_perms(&account.perms)?, now_millis(), account.id.0],
    )?;
    Ok(())
}

fn insert_row(conn: &Connection, name: &str, password_hash: &PasswordHash) -> Result<AccountId> {
    let now = now_millis();
    conn.execute(
        "INSERT INTO accounts (name, password_hash, perms, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?4)",
        params![name, password_hash.as_str(), encode_perms(&[])?, now],
    )?;
    Ok(AccountId(conn.last_insert_rowid()))
}

fn is_unique_violation(e: &StoreError) -> bool {
    match e {
        StoreError::Database(inner) => inner.sqlite_error_code() == Some(ErrorCode::ConstraintViolation),
        _ => false,
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn find_one(&self, filter: &AccountFilter) -> Result<Option<Account>> {
        let filter = filter.clone();
        self.run(move |conn| first_matching(conn, &filter)).await
    }

    async fn count(&self, filter: &AccountFilter) -> Result<u64> {
        let filter = filter.clone();
        self.run(move |conn| {
            if filter.permission.is_none() && filter.password_hash.is_none() {
                let n: i64 = match filter.name {
                    Some(ref name) => conn.query_row(
                        "SELECT COUNT(*) FROM accounts WHERE name = ?1",
                        params![name],
                        |row| row.get(0),
                    )?,
                    None => conn.query_row("SELECT COUNT(*) FROM accounts", [], |row| row.get(0))?,
                };
                return Ok(n as u64);
            }
            Ok(select_matching(conn, &filter)?.len() as u64)
        })
        .await
    }

    async fn list(&self) -> Result<Vec<Account>> {
        self.run(|conn| select_matching(conn, &AccountFilter::all())).await
    }

    async fn insert(&self, name: &str, password_hash: &PasswordHash) -> Result<InsertResult> {
        let name = name.to_string();
        let password_hash = password_hash.clone();

        self.run(move |conn| {
            let existing: Option<i64> = conn
                .query_row(
                    "SELECT id FROM accounts WHERE name = ?1",
                    params![name],
                    |row| row.get(0),
                )
                .optional()?;

            if existing.is_some() {
                return Ok(InsertResult::AlreadyExists);
            }

            match insert_row(conn, &name, &password_hash) {
                Ok(id) => Ok(InsertResult::Inserted(id)),
                // Lost a race with another writer on the same file.
                Err(e) if is_unique_violation(&e) => Ok(InsertResult::AlreadyExists),
                Err(e) => Err(e),
            }
        })
        .await
    }

    async fn push_permission(&self, filter: &AccountFilter, perm: &str) -> Result<UpdateResult> {
        let filter = filter.clone();
        let perm = perm.to_string();

        self.run(move |conn| {
            update_perms(conn, &filter, |perms| {
                if perms.iter().any(|p| *p == perm) {
                    return false;
                }
                perms.push(perm);
                true
            })
        })
        .await
    }

    async fn pull_permission(&self, filter: &AccountFilter, perm: &str) -> Result<UpdateResult> {
        let filter = filter.clone();
        let perm = perm.to_string();

        self.run(move |conn| {
            update_perms(conn, &filter, |perms| {
                let before = perms.len();
                perms.retain(|p| *p != perm);
                perms.len() != before
            })
        })
        .await
    }

    async fn upsert_password(
        &self,
        name: &str,
        password_hash: &PasswordHash,
    ) -> Result<UpsertResult> {
        let name = name.to_string();
        let password_hash = password_hash.clone();

        self.run(move |conn| {
            let tx = conn.transaction()?;

            let changed = tx.execute(
                "UPDATE accounts SET password_hash = ?1, updated_at = ?2 WHERE name = ?3",
                params![password_hash.as_str(), now_millis(), name],
            )?;

            let result = if changed > 0 {
                UpsertResult::Updated
            } else {
                UpsertResult::Inserted(insert_row(&tx, &name, &password_hash)?)
            };

            tx.commit()?;
            Ok(result)
        })
        .await
    }
}
