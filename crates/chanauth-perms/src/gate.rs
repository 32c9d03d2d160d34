//! The permission gate.
//!
//! Answers "may this identity do X?" against the account store. Anonymous
//! identities are refused without touching the store; holders of
//! [`ADMIN`](crate::permission::ADMIN) pass every check; any store failure
//! (including a missed deadline) is a refusal.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use chanauth_core::UserRecord;
use chanauth_store::{with_deadline, Store, StoreExt};

use crate::error::{PermsError, Result};
use crate::permission::{is_escalation, ADMIN};

/// Permission gate over an account store.
pub struct PermissionGate<S: Store + ?Sized> {
    store: Arc<S>,
    deadline: Option<Duration>,
}

impl<S: Store + ?Sized> Clone for PermissionGate<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            deadline: self.deadline,
        }
    }
}

impl<S: Store + ?Sized> PermissionGate<S> {
    /// Create a gate with no deadline on store queries.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            deadline: None,
        }
    }

    /// Bound every store query made by this gate.
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Checks
    // ─────────────────────────────────────────────────────────────────────────

    /// Whether `user` may exercise `perm`.
    ///
    /// False without any store query when the identity is anonymous. Store
    /// errors are logged and answered with false.
    pub async fn user_can(&self, user: &UserRecord, perm: &str) -> bool {
        let Some(account) = user.account() else {
            return false;
        };

        match self.holds(account, ADMIN).await {
            Ok(true) => return true,
            Ok(false) => {}
            Err(()) => return false,
        }

        if perm == ADMIN {
            return false;
        }

        self.holds(account, perm).await.unwrap_or(false)
    }

    /// Like [`user_can`](Self::user_can) but with a typed denial.
    pub async fn check(&self, user: &UserRecord, perm: &str) -> Result<()> {
        if !user.is_authenticated() {
            return Err(PermsError::NotLoggedIn);
        }
        if self.user_can(user, perm).await {
            Ok(())
        } else {
            debug!(nick = %user.current_nick, perm, "permission denied");
            Err(PermsError::PermissionDenied(perm.to_string()))
        }
    }

    /// Whether `user` may grant or revoke `perm` on someone else's account.
    ///
    /// Only the escalation rule is checked here: managing `admin` needs
    /// `admin`. The command-level permission is a separate [`check`](Self::check).
    pub async fn check_manage(&self, user: &UserRecord, perm: &str) -> Result<()> {
        if is_escalation(perm) && !self.user_can(user, ADMIN).await {
            return Err(PermsError::AdminRequired(perm.to_string()));
        }
        Ok(())
    }

    async fn holds(&self, account: &str, perm: &str) -> std::result::Result<bool, ()> {
        with_deadline(
            self.deadline,
            "permission query",
            self.store.holds_permission(account, perm),
        )
        .await
        .map_err(|e| {
            warn!(account, perm, error = %e, "permission query failed; denying");
        })
    }
}
