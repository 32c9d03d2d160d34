//! Raw IRC line decoding.
//!
//! Turns wire text such as `:alice!a@host JOIN #rust` into [`ChatEvent`]s.
//! Only the commands the auth layer consumes are mapped; everything else
//! decodes to `None`.
//!
//! Grammar handled:
//!
//! ```text
//! line    = [ "@" tags SP ] [ ":" prefix SP ] command *( SP param ) [ SP ":" trailing ]
//! ```
//!
//! Message tags are skipped. The trailing parameter, if any, is stored as the
//! last element of `params`.

use crate::error::{CoreError, Result};
use crate::event::{ChatEvent, Identity};

/// A decoded protocol line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub prefix: Option<String>,
    pub command: String,
    pub params: Vec<String>,
}

impl Line {
    /// Decode one line. Trailing CR/LF is ignored.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut rest = raw.trim_end_matches(['\r', '\n']);

        if rest.starts_with('@') {
            rest = match rest.split_once(' ') {
                Some((_, after)) => after,
                None => return Err(CoreError::MalformedLine("tags without command".into())),
            };
        }
        rest = rest.trim_start_matches(' ');

        let mut prefix = None;
        if let Some(stripped) = rest.strip_prefix(':') {
            let (p, after) = stripped
                .split_once(' ')
                .ok_or_else(|| CoreError::MalformedLine("prefix without command".into()))?;
            if p.is_empty() {
                return Err(CoreError::MalformedLine("empty prefix".into()));
            }
            prefix = Some(p.to_string());
            rest = after.trim_start_matches(' ');
        }

        let (command, mut rest) = match rest.split_once(' ') {
            Some((c, after)) => (c, after),
            None => (rest, ""),
        };
        if command.is_empty() {
            return Err(CoreError::MalformedLine("missing command".into()));
        }

        let mut params = Vec::new();
        loop {
            rest = rest.trim_start_matches(' ');
            if rest.is_empty() {
                break;
            }
            if let Some(trailing) = rest.strip_prefix(':') {
                params.push(trailing.to_string());
                break;
            }
            match rest.split_once(' ') {
                Some((p, after)) => {
                    params.push(p.to_string());
                    rest = after;
                }
                None => {
                    params.push(rest.to_string());
                    break;
                }
            }
        }

        Ok(Self {
            prefix,
            command: command.to_ascii_uppercase(),
            params,
        })
    }

    /// The last parameter.
    pub fn trailing(&self) -> Option<&str> {
        self.params.last().map(String::as_str)
    }

    fn sender(&self) -> Result<Identity> {
        self.prefix
            .as_deref()
            .map(Identity::parse)
            .ok_or_else(|| self.missing("prefix"))
    }

    fn param(&self, i: usize, what: &'static str) -> Result<&str> {
        self.params
            .get(i)
            .map(String::as_str)
            .ok_or_else(|| self.missing(what))
    }

    fn missing(&self, what: &'static str) -> CoreError {
        CoreError::MissingField {
            command: self.command.clone(),
            what,
        }
    }

    /// Map the line onto an event the auth layer cares about.
    pub fn to_event(&self) -> Result<Option<ChatEvent>> {
        let event = match self.command.as_str() {
            "001" => ChatEvent::Welcome {
                nick: self.param(0, "nickname")?.to_string(),
            },
            "JOIN" => ChatEvent::Join {
                who: self.sender()?,
                channel: self.param(0, "channel")?.to_string(),
            },
            "PART" => ChatEvent::Part {
                who: self.sender()?,
                channel: self.param(0, "channel")?.to_string(),
            },
            "NICK" => ChatEvent::Nick {
                who: self.sender()?,
                new_nick: self.trailing().ok_or_else(|| self.missing("nickname"))?.to_string(),
            },
            "QUIT" => ChatEvent::Quit {
                who: self.sender()?,
            },
            "353" => {
                // <me> [=*@] <channel> :<names>
                if self.params.len() < 2 {
                    return Err(self.missing("channel"));
                }
                let channel = self.params[self.params.len() - 2].clone();
                let nicks = self
                    .trailing()
                    .unwrap_or_default()
                    .split(' ')
                    .filter(|n| !n.is_empty())
                    .map(String::from)
                    .collect();
                ChatEvent::Names { channel, nicks }
            }
            "PRIVMSG" => ChatEvent::Message {
                who: self.sender()?,
                target: self.param(0, "target")?.to_string(),
                text: self.param(1, "text")?.to_string(),
            },
            _ => return Ok(None),
        };
        Ok(Some(event))
    }
}

/// Decode a raw line straight to an event.
pub fn parse_event(raw: &str) -> Result<Option<ChatEvent>> {
    Line::parse(raw)?.to_event()
}
