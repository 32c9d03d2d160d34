//! Property tests over random membership event streams.

use std::collections::{BTreeSet, HashMap};

use proptest::prelude::*;

use chanauth_core::ChatEvent;

use crate::tracker::IdentityTracker;

const BOT: &str = "bot";

fn nick() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("alice".to_string()),
        Just("bob".to_string()),
        Just("carol".to_string()),
        Just(BOT.to_string()),
    ]
}

fn channel() -> impl Strategy<Value = String> {
    prop_oneof![Just("#a".to_string()), Just("#b".to_string()), Just("#c".to_string())]
}

fn event() -> impl Strategy<Value = ChatEvent> {
    prop_oneof![
        4 => (nick(), channel()).prop_map(|(n, c)| ChatEvent::join(&n, &c)),
        4 => (nick(), channel()).prop_map(|(n, c)| ChatEvent::part(&n, &c)),
        2 => (nick(), nick()).prop_map(|(a, b)| ChatEvent::nick(&a, &b)),
        1 => nick().prop_map(|n| ChatEvent::quit(&n)),
        2 => (channel(), prop::collection::vec(nick(), 0..4)).prop_map(|(c, ns)| {
            ChatEvent::Names {
                channel: c,
                nicks: ns.into_iter().map(|n| format!("@{}", n)).collect(),
            }
        }),
        1 => Just(ChatEvent::welcome(BOT)),
    ]
}

/// Reference model: nick -> set of channels.
fn model_apply(model: &mut HashMap<String, BTreeSet<String>>, event: &ChatEvent) {
    match event {
        ChatEvent::Welcome { .. } => model.clear(),
        ChatEvent::Join { who, channel } if who.nick == BOT => {
            for chans in model.values_mut() {
                chans.remove(channel);
            }
        }
        ChatEvent::Join { who, channel } => {
            model.entry(who.nick.clone()).or_default().insert(channel.clone());
        }
        ChatEvent::Part { who, channel } if who.nick == BOT => {
            for chans in model.values_mut() {
                chans.remove(channel);
            }
        }
        ChatEvent::Part { who, channel } => {
            if let Some(chans) = model.get_mut(&who.nick) {
                chans.remove(channel);
            }
        }
        ChatEvent::Nick { who, new_nick } => {
            if who.nick != *new_nick {
                if let Some(chans) = model.remove(&who.nick) {
                    if !chans.is_empty() {
                        model.insert(new_nick.clone(), chans);
                    }
                }
            }
        }
        ChatEvent::Quit { who } if who.nick == BOT => {}
        ChatEvent::Quit { who } => {
            model.remove(&who.nick);
        }
        ChatEvent::Names { channel, nicks } => {
            for n in nicks {
                model
                    .entry(n.trim_start_matches('@').to_string())
                    .or_default()
                    .insert(channel.clone());
            }
        }
        ChatEvent::Message { .. } => {}
    }
    model.retain(|_, chans| !chans.is_empty());
}

proptest! {
    #[test]
    fn record_exists_iff_channels_non_empty(events in prop::collection::vec(event(), 0..64)) {
        let mut tracker = IdentityTracker::new();
        for e in &events {
            tracker.apply(e, BOT);
            for record in tracker.records() {
                prop_assert!(!record.channels.is_empty(), "empty record {:?}", record);
            }
        }
    }

    #[test]
    fn tracker_matches_reference_model(events in prop::collection::vec(event(), 0..64)) {
        let mut tracker = IdentityTracker::new();
        let mut model = HashMap::new();
        for e in &events {
            tracker.apply(e, BOT);
            model_apply(&mut model, e);
        }

        prop_assert_eq!(tracker.len(), model.len());
        for (nick, chans) in &model {
            let record = tracker.get(nick);
            prop_assert!(record.is_some(), "missing {}", nick);
            let got: BTreeSet<String> = record.unwrap().channels.iter().cloned().collect();
            prop_assert_eq!(&got, chans);
        }
    }

    #[test]
    fn rename_preserves_binding(
        setup in prop::collection::vec((nick(), channel()), 1..6),
        account in "[a-z]{1,8}",
    ) {
        let mut tracker = IdentityTracker::new();
        for (n, c) in &setup {
            tracker.add_channel(c, n);
        }
        let (target, _) = &setup[0];
        tracker.set_account(target, &account);
        let before = tracker.get(target).cloned().unwrap();

        prop_assert!(tracker.rename(target, "renamed"));
        let after = tracker.get("renamed").unwrap();
        prop_assert_eq!(after.account.as_deref(), Some(account.as_str()));
        prop_assert_eq!(&after.channels, &before.channels);
    }
}
