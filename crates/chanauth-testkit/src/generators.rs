//! Proptest generators for property-based testing.

use proptest::prelude::*;

use chanauth_core::ChatEvent;
use chanauth_perms::{ADD_PERM, ADMIN, CHECK_PERMS, DEL_PERM, WHOIS};

use crate::fixtures::BOT_NICK;

/// A nick from a small pool, so that events collide often. Includes the bot.
pub fn nick() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => prop::sample::select(vec!["alice", "bob", "carol", "dave"]).prop_map(String::from),
        1 => Just(BOT_NICK.to_string()),
    ]
}

/// A channel from a small pool.
pub fn channel() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["#a", "#b", "#c"]).prop_map(String::from)
}

/// A names-list entry: a nick with an optional privilege marker.
pub fn names_entry() -> impl Strategy<Value = String> {
    (prop::option::of(prop::sample::select(vec!['@', '+', '%'])), nick()).prop_map(
        |(marker, nick)| match marker {
            Some(m) => format!("{}{}", m, nick),
            None => nick,
        },
    )
}

/// Any membership event (everything but messages).
pub fn membership_event() -> impl Strategy<Value = ChatEvent> {
    prop_oneof![
        5 => (nick(), channel()).prop_map(|(n, c)| ChatEvent::join(&n, &c)),
        4 => (nick(), channel()).prop_map(|(n, c)| ChatEvent::part(&n, &c)),
        2 => (nick(), nick()).prop_map(|(a, b)| ChatEvent::nick(&a, &b)),
        1 => nick().prop_map(|n| ChatEvent::quit(&n)),
        2 => (channel(), prop::collection::vec(names_entry(), 0..5))
            .prop_map(|(channel, nicks)| ChatEvent::Names { channel, nicks }),
        1 => Just(ChatEvent::welcome(BOT_NICK)),
    ]
}

/// A command a user might send the bot. Every nick's password is its nick.
pub fn command_text() -> impl Strategy<Value = String> {
    prop_oneof![
        nick().prop_map(|n| format!("!login {} {}", n, n)),
        nick().prop_map(|n| format!("!register {} {}", n, n)),
        Just("!logout".to_string()),
        nick().prop_map(|n| format!("!whois {}", n)),
        (nick(), permission()).prop_map(|(n, p)| format!("!addperm {} {}", n, p)),
        (nick(), permission()).prop_map(|(n, p)| format!("!delperm {} {}", n, p)),
    ]
}

/// A private command message from a random nick.
pub fn command_event() -> impl Strategy<Value = ChatEvent> {
    (nick(), command_text()).prop_map(|(n, text)| ChatEvent::message(&n, BOT_NICK, &text))
}

/// Membership churn interleaved with commands.
pub fn session(max_len: usize) -> impl Strategy<Value = Vec<ChatEvent>> {
    prop::collection::vec(
        prop_oneof![3 => membership_event(), 2 => command_event()],
        0..=max_len,
    )
}

/// A permission name, biased towards the ones the commands use.
pub fn permission() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => prop::sample::select(vec![ADMIN, ADD_PERM, DEL_PERM, CHECK_PERMS, WHOIS])
            .prop_map(String::from),
        1 => "[a-z]{1,10}",
    ]
}

/// An account name.
pub fn account_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,15}"
}

/// A password. May contain spaces.
pub fn password() -> impl Strategy<Value = String> {
    "[ -~]{0,32}"
}
