//! GenericAuth: the account commands.
//!
//! Brings together the identity tracker, the permission gate and the account
//! store. Each command looks up the caller's record (never creating one),
//! checks its preconditions in a fixed order, and produces one reply.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use chanauth_core::{Account, ChatEvent, PasswordHasher, UserRecord};
use chanauth_perms::{PermissionGate, PermsError, ADD_PERM, CHECK_PERMS, DEL_PERM, WHOIS};
use chanauth_store::{
    with_deadline, AccountFilter, InsertResult, Store, StoreExt, UpsertResult,
};
use chanauth_tracker::IdentityTracker;

use crate::config::AuthConfig;
use crate::context::CommandContext;
use crate::error::{CommandError, CommandResult};
use crate::mux::{CommandHandler, CommandMux, CommandScope};

/// The built-in account commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthCommand {
    Login,
    Logout,
    Register,
    AddPerm,
    DelPerm,
    CheckPerms,
    Whois,
    Passwd,
}

impl AuthCommand {
    pub const ALL: [AuthCommand; 8] = [
        AuthCommand::Login,
        AuthCommand::Logout,
        AuthCommand::Register,
        AuthCommand::AddPerm,
        AuthCommand::DelPerm,
        AuthCommand::CheckPerms,
        AuthCommand::Whois,
        AuthCommand::Passwd,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AuthCommand::Login => "login",
            AuthCommand::Logout => "logout",
            AuthCommand::Register => "register",
            AuthCommand::AddPerm => "addperm",
            AuthCommand::DelPerm => "delperm",
            AuthCommand::CheckPerms => "checkperms",
            AuthCommand::Whois => "whois",
            AuthCommand::Passwd => "passwd",
        }
    }

    /// Register every account command on `mux`. They carry passwords, so
    /// they are private-message only.
    pub fn register_all<S: Store + ?Sized>(mux: &mut CommandMux<S>) -> crate::Result<()> {
        for command in Self::ALL {
            mux.register(command.name(), CommandScope::Private, command)?;
        }
        Ok(())
    }
}

#[async_trait]
impl<S: Store + ?Sized> CommandHandler<S> for AuthCommand {
    async fn handle(&self, auth: &mut GenericAuth<S>, ctx: &CommandContext) -> CommandResult {
        match self {
            AuthCommand::Login => auth.login(ctx).await,
            AuthCommand::Logout => auth.logout(ctx),
            AuthCommand::Register => auth.register(ctx).await,
            AuthCommand::AddPerm => auth.add_perm(ctx).await,
            AuthCommand::DelPerm => auth.del_perm(ctx).await,
            AuthCommand::CheckPerms => auth.check_perms(ctx).await,
            AuthCommand::Whois => auth.whois(ctx).await,
            AuthCommand::Passwd => auth.passwd(ctx).await,
        }
    }
}

/// Account and permission state for one bot connection.
pub struct GenericAuth<S: Store + ?Sized> {
    config: AuthConfig,
    hasher: PasswordHasher,
    tracker: IdentityTracker,
    gate: PermissionGate<S>,
}

impl<S: Store + ?Sized> GenericAuth<S> {
    pub fn new(store: Arc<S>, config: AuthConfig) -> Self {
        let hasher = PasswordHasher::new(config.salt.clone());
        let gate = PermissionGate::new(store).with_deadline(config.store_timeout);
        Self {
            config,
            hasher,
            tracker: IdentityTracker::new(),
            gate,
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn tracker(&self) -> &IdentityTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut IdentityTracker {
        &mut self.tracker
    }

    pub fn gate(&self) -> &PermissionGate<S> {
        &self.gate
    }

    pub fn store(&self) -> &Arc<S> {
        self.gate.store()
    }

    pub fn hasher(&self) -> &PasswordHasher {
        &self.hasher
    }

    /// Feed a membership event to the tracker.
    pub fn observe(&mut self, event: &ChatEvent, bot_nick: &str) {
        self.tracker.apply(event, bot_nick);
    }

    /// Whether the identity behind `nick` may exercise `perm`.
    pub async fn user_can(&self, nick: &str, perm: &str) -> bool {
        let user = self.tracker.get_or_create(nick);
        self.gate.user_can(&user, perm).await
    }

    fn deadline(&self) -> Option<Duration> {
        self.config.store_timeout
    }

    async fn bounded<T, F>(&self, op: &str, fut: F) -> chanauth_store::Result<T>
    where
        F: Future<Output = chanauth_store::Result<T>>,
    {
        with_deadline(self.deadline(), op, fut).await
    }

    fn caller(&self, ctx: &CommandContext) -> UserRecord {
        self.tracker.get_or_create(ctx.nick())
    }

    /// The caller's account, or "you are not logged in".
    fn require_account(user: &UserRecord) -> Result<String, CommandError> {
        user.account()
            .map(str::to_string)
            .ok_or_else(|| CommandError::from(PermsError::NotLoggedIn))
    }

    async fn require_perm(
        &self,
        user: &UserRecord,
        perm: &str,
        refusal: &str,
    ) -> Result<(), CommandError> {
        if self.gate.user_can(user, perm).await {
            Ok(())
        } else {
            debug!(nick = %user.current_nick, perm, "command refused");
            Err(CommandError::denied(refusal))
        }
    }

    /// Target account lookup where absence and failure read the same.
    async fn find_target(&self, name: &str) -> Result<Account, CommandError> {
        match self
            .bounded("find account", self.store().find_by_name(name))
            .await
        {
            Ok(Some(account)) => Ok(account),
            Ok(None) => Err(not_found(name)),
            Err(e) => {
                warn!(account = name, error = %e, "account lookup failed");
                Err(not_found(name))
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Session Commands
    // ─────────────────────────────────────────────────────────────────────────

    /// `login <username> <password>`
    pub async fn login(&mut self, ctx: &CommandContext) -> CommandResult {
        let user = self.caller(ctx);
        if let Some(account) = user.account() {
            return Err(CommandError::state(format!(
                "you are already logged in as '{}'",
                account
            )));
        }
        if !user.is_co_present() {
            return Err(CommandError::state(
                "you cannot log in if you're not in a channel with me",
            ));
        }
        let (name, password) = ctx
            .split_first()
            .ok_or_else(|| CommandError::usage(ctx.usage("<username> <password>")))?;

        let hash = self.hasher.hash(password);
        let ok = self
            .bounded("check credentials", self.store().credentials_match(name, &hash))
            .await?;
        if !ok {
            info!(nick = ctx.nick(), account = name, "login failed");
            return Err(CommandError::state("login failed"));
        }

        self.tracker.set_account(ctx.nick(), name);
        info!(nick = ctx.nick(), account = name, "logged in");
        Ok(format!("you are now logged in as '{}'", name))
    }

    /// `logout`
    pub fn logout(&mut self, ctx: &CommandContext) -> CommandResult {
        match self.tracker.clear_account(ctx.nick()) {
            Some(account) => {
                info!(nick = ctx.nick(), account = %account, "logged out");
                Ok("you have been logged out".to_string())
            }
            None => Err(CommandError::from(PermsError::NotLoggedIn)),
        }
    }

    /// `register <username> <password>`
    pub async fn register(&mut self, ctx: &CommandContext) -> CommandResult {
        let user = self.caller(ctx);
        if let Some(account) = user.account() {
            return Err(CommandError::state(format!(
                "you are already logged in as '{}'",
                account
            )));
        }
        let (name, password) = ctx
            .split_first()
            .ok_or_else(|| CommandError::usage(ctx.usage("<username> <password>")))?;

        let taken = || CommandError::conflict("there is already a user with that name");
        if self
            .bounded("check name", self.store().name_exists(name))
            .await?
        {
            return Err(taken());
        }

        let hash = self.hasher.hash(password);
        let id = match self
            .bounded("insert account", self.store().insert(name, &hash))
            .await?
        {
            InsertResult::Inserted(id) => id,
            InsertResult::AlreadyExists => return Err(taken()),
        };
        info!(nick = ctx.nick(), account = name, %id, "account registered");

        if self.tracker.set_account(ctx.nick(), name) {
            Ok("you have been registered and logged in".to_string())
        } else {
            Ok("you have been registered; join a channel with me and log in".to_string())
        }
    }

    /// `passwd <newpass>`
    pub async fn passwd(&mut self, ctx: &CommandContext) -> CommandResult {
        let user = self.caller(ctx);
        let account = Self::require_account(&user)?;
        let [password] = ctx
            .exact::<1>()
            .ok_or_else(|| CommandError::usage(ctx.usage("<newpass>")))?;

        let hash = self.hasher.hash(password);
        let outcome = self
            .bounded("update password", self.store().upsert_password(&account, &hash))
            .await?;
        if let UpsertResult::Inserted(id) = outcome {
            // The account vanished from the store while bound; it is back now.
            warn!(account = %account, %id, "password change recreated account");
        }
        info!(nick = ctx.nick(), account = %account, "password changed");
        Ok("your password has been changed".to_string())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Permission Commands
    // ─────────────────────────────────────────────────────────────────────────

    /// `addperm <user> <perm>`
    pub async fn add_perm(&mut self, ctx: &CommandContext) -> CommandResult {
        let user = self.caller(ctx);
        Self::require_account(&user)?;
        self.require_perm(&user, ADD_PERM, "you don't have permission to add permissions")
            .await?;
        let [name, perm] = ctx
            .exact::<2>()
            .ok_or_else(|| CommandError::usage(ctx.usage("<user> <perm>")))?;

        let target = self.find_target(name).await?;
        if self.gate.check_manage(&user, perm).await.is_err() {
            return Err(CommandError::denied(
                "only users with the 'admin' permission can add admins",
            ));
        }
        if target.has_perm(perm) {
            return Err(CommandError::conflict(format!(
                "user '{}' already has perm '{}'",
                name, perm
            )));
        }

        let result = self
            .bounded(
                "grant permission",
                self.store()
                    .push_permission(&AccountFilter::by_name(name), perm),
            )
            .await?;
        if !result.matched_any() {
            return Err(not_found(name));
        }
        info!(by = %actor(&user), account = name, perm, "permission granted");
        Ok(format!("added perm '{}' to user '{}'", perm, name))
    }

    /// `delperm <user> <perm>`
    pub async fn del_perm(&mut self, ctx: &CommandContext) -> CommandResult {
        let user = self.caller(ctx);
        Self::require_account(&user)?;
        self.require_perm(&user, DEL_PERM, "you don't have permission to remove permissions")
            .await?;
        let [name, perm] = ctx
            .exact::<2>()
            .ok_or_else(|| CommandError::usage(ctx.usage("<user> <perm>")))?;

        if self.gate.check_manage(&user, perm).await.is_err() {
            return Err(CommandError::denied(
                "only users with the 'admin' permission can remove admins",
            ));
        }

        let result = self
            .bounded(
                "revoke permission",
                self.store()
                    .pull_permission(&AccountFilter::by_name(name), perm),
            )
            .await?;
        if !result.matched_any() {
            return Err(not_found(name));
        }
        info!(by = %actor(&user), account = name, perm, "permission revoked");
        Ok(format!("removed perm '{}' from user '{}'", perm, name))
    }

    /// `checkperms <user>`
    pub async fn check_perms(&mut self, ctx: &CommandContext) -> CommandResult {
        let user = self.caller(ctx);
        Self::require_account(&user)?;
        self.require_perm(&user, CHECK_PERMS, "you do not have permission to view permissions")
            .await?;
        let [name] = ctx
            .exact::<1>()
            .ok_or_else(|| CommandError::usage(ctx.usage("<user>")))?;

        let target = self.find_target(name).await?;
        Ok(format!(
            "permissions for '{}': {}",
            name,
            target.perms_display()
        ))
    }

    /// `whois <nick>`
    pub async fn whois(&mut self, ctx: &CommandContext) -> CommandResult {
        let user = self.caller(ctx);
        Self::require_account(&user)?;
        self.require_perm(&user, WHOIS, "you do not have permission to check a user account")
            .await?;
        let [nick] = ctx
            .exact::<1>()
            .ok_or_else(|| CommandError::usage(ctx.usage("<nick>")))?;

        match self.tracker.get(nick).and_then(UserRecord::account) {
            Some(account) => Ok(format!("nick '{}' is user '{}'", nick, account)),
            None => Ok(format!("nick '{}' is not logged in", nick)),
        }
    }
}

fn not_found(name: &str) -> CommandError {
    CommandError::not_found(format!("account '{}' does not exist", name))
}

fn actor(user: &UserRecord) -> &str {
    user.account().unwrap_or(&user.current_nick)
}
