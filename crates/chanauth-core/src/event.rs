//! Protocol events consumed by the tracker and the command layer.

/// The source of an event, `nick!user@host`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Identity {
    pub nick: String,
    pub user: Option<String>,
    pub host: Option<String>,
}

impl Identity {
    pub fn new(nick: impl Into<String>) -> Self {
        Self {
            nick: nick.into(),
            user: None,
            host: None,
        }
    }

    /// Split a message prefix into its parts. Server prefixes yield a bare nick.
    pub fn parse(prefix: &str) -> Self {
        let (rest, host) = match prefix.split_once('@') {
            Some((rest, host)) => (rest, Some(host.to_string())),
            None => (prefix, None),
        };
        let (nick, user) = match rest.split_once('!') {
            Some((nick, user)) => (nick, Some(user.to_string())),
            None => (rest, None),
        };
        Self {
            nick: nick.to_string(),
            user,
            host,
        }
    }
}

/// A membership or message event as delivered by the chat client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// Registration with the server completed (numeric `001`); fires on every
    /// (re)connect. `nick` is the nick the server actually assigned.
    Welcome { nick: String },
    Join { who: Identity, channel: String },
    Part { who: Identity, channel: String },
    Nick { who: Identity, new_nick: String },
    Quit { who: Identity },
    /// One batch of a channel's member list (numeric `353`). Nicks may still
    /// carry a privilege marker such as `@` or `+`.
    Names { channel: String, nicks: Vec<String> },
    Message {
        who: Identity,
        target: String,
        text: String,
    },
}

impl ChatEvent {
    /// Short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            ChatEvent::Welcome { .. } => "welcome",
            ChatEvent::Join { .. } => "join",
            ChatEvent::Part { .. } => "part",
            ChatEvent::Nick { .. } => "nick",
            ChatEvent::Quit { .. } => "quit",
            ChatEvent::Names { .. } => "names",
            ChatEvent::Message { .. } => "message",
        }
    }

    pub fn sender(&self) -> Option<&Identity> {
        match self {
            ChatEvent::Join { who, .. }
            | ChatEvent::Part { who, .. }
            | ChatEvent::Nick { who, .. }
            | ChatEvent::Quit { who }
            | ChatEvent::Message { who, .. } => Some(who),
            ChatEvent::Welcome { .. } | ChatEvent::Names { .. } => None,
        }
    }

    // Shorthand constructors, mostly for hosts that already have parsed events
    // and for tests.

    pub fn welcome(nick: &str) -> Self {
        ChatEvent::Welcome {
            nick: nick.to_string(),
        }
    }

    pub fn join(nick: &str, channel: &str) -> Self {
        ChatEvent::Join {
            who: Identity::new(nick),
            channel: channel.to_string(),
        }
    }

    pub fn part(nick: &str, channel: &str) -> Self {
        ChatEvent::Part {
            who: Identity::new(nick),
            channel: channel.to_string(),
        }
    }

    pub fn nick(old: &str, new: &str) -> Self {
        ChatEvent::Nick {
            who: Identity::new(old),
            new_nick: new.to_string(),
        }
    }

    pub fn quit(nick: &str) -> Self {
        ChatEvent::Quit {
            who: Identity::new(nick),
        }
    }

    pub fn names(channel: &str, nicks: &[&str]) -> Self {
        ChatEvent::Names {
            channel: channel.to_string(),
            nicks: nicks.iter().map(|n| n.to_string()).collect(),
        }
    }

    pub fn message(nick: &str, target: &str, text: &str) -> Self {
        ChatEvent::Message {
            who: Identity::new(nick),
            target: target.to_string(),
            text: text.to_string(),
        }
    }
}
