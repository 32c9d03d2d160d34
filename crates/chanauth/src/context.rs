//! Command invocations parsed out of inbound messages.

use chanauth_core::Identity;

use crate::reply::Reply;

/// One command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandContext {
    /// Who sent the command.
    pub sender: Identity,
    /// Where the message was sent: the bot's nick or a channel.
    pub target: String,
    /// Whether the message was addressed to the bot directly.
    pub private: bool,
    /// Prefix the command was invoked with.
    pub prefix: String,
    /// Command name, without the prefix.
    pub name: String,
    /// Everything after the command name and the space that follows it.
    pub args: String,
}

impl CommandContext {
    /// Parse `text` as a command. Returns `None` when the text does not start
    /// with `prefix` or names no command.
    pub fn parse(
        sender: &Identity,
        target: &str,
        text: &str,
        prefix: &str,
        bot_nick: &str,
    ) -> Option<Self> {
        let rest = text.strip_prefix(prefix)?;
        let (name, args) = match rest.split_once(' ') {
            Some((name, args)) => (name, args),
            None => (rest, ""),
        };
        if name.is_empty() {
            return None;
        }

        Some(Self {
            sender: sender.clone(),
            target: target.to_string(),
            private: target.eq_ignore_ascii_case(bot_nick),
            prefix: prefix.to_string(),
            name: name.to_string(),
            args: args.to_string(),
        })
    }

    /// The caller's nick.
    pub fn nick(&self) -> &str {
        &self.sender.nick
    }

    /// A reply to the caller, privately or in the originating channel.
    pub fn reply(&self, text: impl Into<String>) -> Reply {
        if self.private {
            Reply::private(self.nick(), text)
        } else {
            Reply::in_channel(&self.target, self.nick(), text)
        }
    }

    /// `usage: <prefix><name> <synopsis>`.
    pub fn usage(&self, synopsis: &str) -> String {
        format!("usage: {}{} {}", self.prefix, self.name, synopsis)
    }

    /// Arguments split on the first space: `(first, rest)`. The first token
    /// must be non-empty; the rest may contain spaces.
    pub fn split_first(&self) -> Option<(&str, &str)> {
        self.args
            .split_once(' ')
            .filter(|(first, _)| !first.is_empty())
    }

    /// Exactly `N` non-empty space-separated arguments.
    pub fn exact<const N: usize>(&self) -> Option<[&str; N]> {
        let mut out = [""; N];
        let mut parts = self.args.split(' ');
        for slot in out.iter_mut() {
            *slot = parts.next().filter(|p| !p.is_empty())?;
        }
        if parts.next().is_some() {
            return None;
        }
        Some(out)
    }
}
