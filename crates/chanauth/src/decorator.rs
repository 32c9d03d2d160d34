//! Permission-gated handlers.

use async_trait::async_trait;
use tracing::debug;

use chanauth_store::Store;

use crate::auth::GenericAuth;
use crate::context::CommandContext;
use crate::error::{CommandError, CommandResult};
use crate::mux::CommandHandler;

/// Wraps a handler so it only runs for callers holding `perm` (or `admin`).
///
/// ```rust,no_run
/// use chanauth::core::UserRecord;
/// use chanauth::store::MemoryStore;
/// use chanauth::{Bot, CheckPerm, CommandContext, CommandScope, FnCommand};
///
/// fn wire(bot: &mut Bot<MemoryStore>) -> chanauth::Result<()> {
///     let kick = FnCommand(|_: &UserRecord, ctx: &CommandContext| {
///         Ok(format!("kicking {}", ctx.args))
///     });
///     bot.register("kick", CommandScope::Channel, CheckPerm::new("kick", kick))
/// }
/// ```
pub struct CheckPerm<H> {
    perm: String,
    inner: H,
}

impl<H> CheckPerm<H> {
    pub fn new(perm: impl Into<String>, inner: H) -> Self {
        Self {
            perm: perm.into(),
            inner,
        }
    }

    pub fn perm(&self) -> &str {
        &self.perm
    }
}

#[async_trait]
impl<S, H> CommandHandler<S> for CheckPerm<H>
where
    S: Store + ?Sized,
    H: CommandHandler<S>,
{
    async fn handle(&self, auth: &mut GenericAuth<S>, ctx: &CommandContext) -> CommandResult {
        if !auth.user_can(ctx.nick(), &self.perm).await {
            debug!(
                nick = ctx.nick(),
                perm = %self.perm,
                command = %ctx.name,
                "gated command refused"
            );
            return Err(CommandError::denied(format!(
                "you do not have the required permission: {}",
                self.perm
            )));
        }
        self.inner.handle(auth, ctx).await
    }
}
