//! Outbound replies.

use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

/// A message to send back to the chat network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Channel or nick the reply is addressed to.
    pub target: String,
    /// Nick to address inside a channel; `None` for private replies.
    pub mention: Option<String>,
    pub text: String,
}

impl Reply {
    /// A private reply to `nick`.
    pub fn private(nick: &str, text: impl Into<String>) -> Self {
        Self {
            target: nick.to_string(),
            mention: None,
            text: text.into(),
        }
    }

    /// A reply in `channel` addressed to `nick`.
    pub fn in_channel(channel: &str, nick: &str, text: impl Into<String>) -> Self {
        Self {
            target: channel.to_string(),
            mention: Some(nick.to_string()),
            text: text.into(),
        }
    }

    /// Message body with the mention applied.
    pub fn body(&self) -> String {
        match &self.mention {
            Some(nick) => format!("{}: {}", nick, self.text),
            None => self.text.clone(),
        }
    }

    /// The reply as a raw `PRIVMSG` line, without the line terminator.
    pub fn to_privmsg(&self) -> String {
        format!("PRIVMSG {} :{}", self.target, self.body())
    }
}

/// Where replies go. Supplied by the host.
pub trait ReplySink: Send {
    fn send(&mut self, reply: Reply);
}

impl ReplySink for Vec<Reply> {
    fn send(&mut self, reply: Reply) {
        self.push(reply);
    }
}

impl ReplySink for UnboundedSender<Reply> {
    fn send(&mut self, reply: Reply) {
        if UnboundedSender::send(self, reply).is_err() {
            debug!("reply receiver dropped");
        }
    }
}
