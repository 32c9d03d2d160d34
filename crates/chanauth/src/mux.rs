//! Command routing.
//!
//! A [`CommandMux`] maps command names to handlers. The bot owns exactly one;
//! the auth commands are registered on it at construction and plugins add
//! their own next to them.

use std::collections::HashMap;

use async_trait::async_trait;

use chanauth_core::UserRecord;
use chanauth_store::Store;

use crate::auth::GenericAuth;
use crate::context::CommandContext;
use crate::error::{AuthError, CommandResult, Result};

/// Where a command may be invoked from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandScope {
    /// Only in a private message to the bot.
    Private,
    /// Only in a channel.
    Channel,
    /// Anywhere.
    Any,
}

impl CommandScope {
    pub fn accepts(self, private: bool) -> bool {
        match self {
            CommandScope::Private => private,
            CommandScope::Channel => !private,
            CommandScope::Any => true,
        }
    }
}

/// A command implementation.
#[async_trait]
pub trait CommandHandler<S: Store + ?Sized>: Send + Sync {
    async fn handle(&self, auth: &mut GenericAuth<S>, ctx: &CommandContext) -> CommandResult;
}

/// Adapts a plain function of the caller's record into a handler.
pub struct FnCommand<F>(pub F);

#[async_trait]
impl<S, F> CommandHandler<S> for FnCommand<F>
where
    S: Store + ?Sized,
    F: Fn(&UserRecord, &CommandContext) -> CommandResult + Send + Sync,
{
    async fn handle(&self, auth: &mut GenericAuth<S>, ctx: &CommandContext) -> CommandResult {
        let user = auth.tracker().get_or_create(ctx.nick());
        (self.0)(&user, ctx)
    }
}

struct Route<S: Store + ?Sized> {
    scope: CommandScope,
    handler: Box<dyn CommandHandler<S>>,
}

/// Name-to-handler table.
pub struct CommandMux<S: Store + ?Sized> {
    routes: HashMap<String, Route<S>>,
}

impl<S: Store + ?Sized> Default for CommandMux<S> {
    fn default() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }
}

impl<S: Store + ?Sized> CommandMux<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `name`. Names are case-sensitive and must be
    /// unique.
    pub fn register<H>(&mut self, name: &str, scope: CommandScope, handler: H) -> Result<()>
    where
        H: CommandHandler<S> + 'static,
    {
        if self.routes.contains_key(name) {
            return Err(AuthError::DuplicateCommand(name.to_string()));
        }
        self.routes.insert(
            name.to_string(),
            Route {
                scope,
                handler: Box::new(handler),
            },
        );
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.routes.contains_key(name)
    }

    pub fn scope(&self, name: &str) -> Option<CommandScope> {
        self.routes.get(name).map(|r| r.scope)
    }

    /// Registered command names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.routes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// The handler for `name`, if it exists and accepts this kind of message.
    pub fn route(&self, name: &str, private: bool) -> Option<&dyn CommandHandler<S>> {
        self.routes
            .get(name)
            .filter(|r| r.scope.accepts(private))
            .map(|r| r.handler.as_ref())
    }
}
