//! The bot runtime: one event in, zero or more replies out.

use std::sync::Arc;

use tracing::{error, info, trace};

use chanauth_core::{parse_event, ChatEvent, Identity};
use chanauth_store::Store;

use crate::auth::{AuthCommand, GenericAuth};
use crate::config::AuthConfig;
use crate::context::CommandContext;
use crate::error::{AuthError, Result};
use crate::mux::{CommandHandler, CommandMux, CommandScope};
use crate::reply::ReplySink;

/// Ties the tracker, the account commands and any plugin commands to one
/// connection.
///
/// Events must be fed in arrival order, each awaited before the next.
pub struct Bot<S: Store + ?Sized> {
    nick: String,
    auth: GenericAuth<S>,
    mux: CommandMux<S>,
}

impl<S: Store + ?Sized> Bot<S> {
    /// Create a bot whose current nick is `nick`, with the account commands
    /// registered.
    pub fn new(nick: impl Into<String>, store: Arc<S>, config: AuthConfig) -> Result<Self> {
        config.validate()?;
        let mut mux = CommandMux::new();
        AuthCommand::register_all(&mut mux)?;
        Ok(Self {
            nick: nick.into(),
            auth: GenericAuth::new(store, config),
            mux,
        })
    }

    /// The bot's current nick.
    pub fn nick(&self) -> &str {
        &self.nick
    }

    /// Override the bot's current nick, for hosts that learn it some other
    /// way than a welcome or nick event.
    pub fn set_nick(&mut self, nick: impl Into<String>) {
        self.nick = nick.into();
    }

    pub fn auth(&self) -> &GenericAuth<S> {
        &self.auth
    }

    pub fn auth_mut(&mut self) -> &mut GenericAuth<S> {
        &mut self.auth
    }

    pub fn mux(&self) -> &CommandMux<S> {
        &self.mux
    }

    /// Register a plugin command next to the account commands.
    pub fn register<H>(&mut self, name: &str, scope: CommandScope, handler: H) -> Result<()>
    where
        H: CommandHandler<S> + 'static,
    {
        self.mux.register(name, scope, handler)
    }

    /// Parse and handle one raw protocol line. Lines that carry no event of
    /// interest are ignored; malformed ones are an [`AuthError::Line`].
    pub async fn handle_line(&mut self, raw: &str, sink: &mut dyn ReplySink) -> Result<()> {
        match parse_event(raw)? {
            Some(event) => self.handle_event(&event, sink).await,
            None => {
                trace!(line = raw, "ignored line");
                Ok(())
            }
        }
    }

    /// Handle one event.
    ///
    /// Store failures inside a command are logged, produce no reply, and are
    /// returned as [`AuthError::Store`].
    pub async fn handle_event(
        &mut self,
        event: &ChatEvent,
        sink: &mut dyn ReplySink,
    ) -> Result<()> {
        if let ChatEvent::Welcome { nick } = event {
            if *nick != self.nick {
                info!(old = %self.nick, new = %nick, "server assigned bot nick");
                self.nick = nick.clone();
            }
        }
        self.auth.observe(event, &self.nick);

        match event {
            ChatEvent::Nick { who, new_nick } if who.nick == self.nick => {
                info!(old = %self.nick, new = %new_nick, "bot nick changed");
                self.nick = new_nick.clone();
                Ok(())
            }
            ChatEvent::Message { who, target, text } => {
                self.dispatch(who, target, text, sink).await
            }
            _ => Ok(()),
        }
    }

    async fn dispatch(
        &mut self,
        who: &Identity,
        target: &str,
        text: &str,
        sink: &mut dyn ReplySink,
    ) -> Result<()> {
        if who.nick == self.nick {
            return Ok(());
        }
        let Some(ctx) =
            CommandContext::parse(who, target, text, &self.auth.config().prefix, &self.nick)
        else {
            return Ok(());
        };
        let Some(handler) = self.mux.route(&ctx.name, ctx.private) else {
            trace!(command = %ctx.name, private = ctx.private, "no route");
            return Ok(());
        };

        match handler.handle(&mut self.auth, &ctx).await {
            Ok(text) => {
                sink.send(ctx.reply(text));
                Ok(())
            }
            Err(e) if e.is_user_visible() => {
                sink.send(ctx.reply(e.message()));
                Ok(())
            }
            Err(e) => {
                error!(nick = ctx.nick(), command = %ctx.name, error = %e, "command aborted");
                match e.into_store_error() {
                    Some(source) => Err(AuthError::Store {
                        command: ctx.name,
                        source,
                    }),
                    None => Ok(()),
                }
            }
        }
    }
}
