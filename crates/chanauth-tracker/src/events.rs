//! Membership event policy.
//!
//! Maps each [`ChatEvent`] onto tracker operations. `bot_nick` is the bot's
//! current nickname as reported by the chat client; events caused by the bot
//! itself are handled differently from everyone else's.

use tracing::trace;

use chanauth_core::ChatEvent;

use crate::tracker::IdentityTracker;

/// Strip one leading privilege marker (`@`, `+`, `%`, ...) from a names-list
/// entry. Anything that is not an ASCII letter counts as a marker.
pub fn strip_privilege_marker(entry: &str) -> &str {
    match entry.chars().next() {
        Some(c) if !c.is_ascii_alphabetic() => &entry[c.len_utf8()..],
        _ => entry,
    }
}

impl IdentityTracker {
    /// Apply one protocol event.
    pub fn apply(&mut self, event: &ChatEvent, bot_nick: &str) {
        trace!(kind = event.kind(), "tracker event");

        match event {
            ChatEvent::Welcome { .. } => self.reset(),

            ChatEvent::Join { who, channel } => {
                if who.nick == bot_nick {
                    // Fresh view of the channel; the names list that follows
                    // re-adds everyone who is actually there.
                    self.part_everywhere(channel);
                } else {
                    self.add_channel(channel, &who.nick);
                }
            }

            ChatEvent::Names { channel, nicks } => {
                for entry in nicks {
                    let nick = strip_privilege_marker(entry);
                    if !nick.is_empty() {
                        self.add_channel(channel, nick);
                    }
                }
            }

            ChatEvent::Nick { who, new_nick } => {
                self.rename(&who.nick, new_nick);
            }

            ChatEvent::Part { who, channel } => {
                if who.nick == bot_nick {
                    self.part_everywhere(channel);
                } else {
                    self.remove_channel(channel, &who.nick);
                }
            }

            ChatEvent::Quit { who } => {
                // The bot quitting is a disconnect; the next welcome resets.
                if who.nick != bot_nick {
                    self.remove(&who.nick);
                }
            }

            ChatEvent::Message { .. } => {}
        }
    }
}
