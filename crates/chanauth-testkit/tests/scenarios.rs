//! End-to-end scenarios: events in, replies and store state out.

use std::sync::Arc;
use std::time::Duration;

use chanauth::{AuthConfig, AuthError, CheckPerm, CommandContext, CommandScope, FnCommand};
use chanauth_core::UserRecord;
use chanauth_store::{MemoryStore, SqliteStore};
use chanauth_testkit::{
    init_tracing, CountingStore, FailMode, FailingStore, TestFixture, HOME_CHANNEL, TEST_SALT,
};

fn ping(_: &UserRecord, _: &CommandContext) -> chanauth::CommandResult {
    Ok("pong".to_string())
}

// ─────────────────────────────────────────────────────────────────────────────
// Sessions
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn register_logs_in_tracked_caller() {
    init_tracing();
    let mut fx = TestFixture::new();
    fx.join("alice", "#a").await;

    assert_eq!(
        fx.ask("alice", "!register alice hunter2").await,
        "you have been registered and logged in"
    );
    let record = fx.record("alice").unwrap();
    assert_eq!(record.account.as_deref(), Some("alice"));
    assert_eq!(record.channels, vec!["#a".to_string()]);

    assert_eq!(
        fx.ask("alice", "!login alice hunter2").await,
        "you are already logged in as 'alice'"
    );
}

#[tokio::test]
async fn register_from_outside_then_join_and_login() {
    let mut fx = TestFixture::new();
    assert_eq!(
        fx.ask("alice", "!register alice pw").await,
        "you have been registered; join a channel with me and log in"
    );
    assert!(fx.record("alice").is_none());

    assert_eq!(
        fx.ask("alice", "!login alice pw").await,
        "you cannot log in if you're not in a channel with me"
    );

    fx.login("alice", "alice", "pw").await;
}

#[tokio::test]
async fn leaving_last_channel_logs_out() {
    let mut fx = TestFixture::new();
    fx.seed_account("root", "pw", &["admin"]).await;
    fx.seed_account("alice", "pw", &["whois"]).await;
    fx.login("root", "root", "pw").await;
    fx.join("alice", "#a").await;
    assert_eq!(fx.ask("alice", "!login alice pw").await, "you are now logged in as 'alice'");

    fx.part("alice", "#a").await;
    assert!(fx.record("alice").is_none());
    assert_eq!(
        fx.ask("root", "!whois alice").await,
        "nick 'alice' is not logged in"
    );

    // The account itself is untouched.
    let stored = fx.account("alice").await.unwrap();
    assert_eq!(stored.perms, vec!["whois"]);

    fx.join("alice", "#a").await;
    assert_eq!(fx.ask("alice", "!whois root").await, "you are not logged in");
}

#[tokio::test]
async fn leaving_one_of_several_channels_keeps_login() {
    let mut fx = TestFixture::new();
    fx.seed_account("alice", "pw", &[]).await;
    fx.login("alice", "alice", "pw").await;
    fx.join("alice", "#other").await;

    fx.part("alice", HOME_CHANNEL).await;
    assert_eq!(fx.logged_in_as("alice").as_deref(), Some("alice"));
}

#[tokio::test]
async fn quit_logs_out() {
    let mut fx = TestFixture::new();
    fx.seed_account("alice", "pw", &[]).await;
    fx.login("alice", "alice", "pw").await;
    fx.join("alice", "#other").await;

    fx.quit("alice").await;
    assert!(fx.record("alice").is_none());
}

#[tokio::test]
async fn welcome_forces_everyone_to_log_in_again() {
    let mut fx = TestFixture::new();
    fx.seed_account("alice", "pw", &[]).await;
    fx.seed_account("bob", "pw", &[]).await;
    fx.login("alice", "alice", "pw").await;
    fx.login("bob", "bob", "pw").await;

    fx.welcome().await;
    assert!(fx.bot.auth().tracker().is_empty());

    fx.join("alice", HOME_CHANNEL).await;
    assert_eq!(fx.ask("alice", "!logout").await, "you are not logged in");
    fx.login("alice", "alice", "pw").await;
}

#[tokio::test]
async fn nick_change_keeps_login() {
    let mut fx = TestFixture::new();
    fx.seed_account("root", "pw", &["admin"]).await;
    fx.seed_account("alice", "pw", &[]).await;
    fx.login("root", "root", "pw").await;
    fx.login("alice", "alice", "pw").await;

    fx.rename("alice", "alice_afk").await;
    assert_eq!(
        fx.ask("root", "!whois alice_afk").await,
        "nick 'alice_afk' is user 'alice'"
    );
    assert_eq!(fx.ask("root", "!whois alice").await, "nick 'alice' is not logged in");

    // A stranger renaming to a tracked-looking nick gains nothing.
    fx.rename("ghost", "alice").await;
    assert!(fx.record("alice").is_none());
}

#[tokio::test]
async fn bot_rejoin_refreshes_membership_from_names() {
    let mut fx = TestFixture::new();
    fx.seed_account("alice", "pw", &[]).await;
    fx.login("alice", "alice", "pw").await;

    fx.join("seabird", HOME_CHANNEL).await;
    assert!(fx.record("alice").is_none());

    fx.names(HOME_CHANNEL, &["@seabird", "+alice", "bob"]).await;
    let alice = fx.record("alice").unwrap();
    assert!(alice.account.is_none());
    assert!(alice.in_channel(HOME_CHANNEL));
    assert!(fx.record("bob").is_some());
}

#[tokio::test]
async fn bot_part_sweeps_channel() {
    let mut fx = TestFixture::new();
    fx.seed_account("alice", "pw", &[]).await;
    fx.login("alice", "alice", "pw").await;
    fx.join("alice", "#other").await;
    fx.join("bob", HOME_CHANNEL).await;

    fx.part("seabird", HOME_CHANNEL).await;
    assert!(fx.record("bob").is_none());
    let alice = fx.record("alice").unwrap();
    assert_eq!(alice.channels, vec!["#other".to_string()]);
    assert_eq!(alice.account.as_deref(), Some("alice"));
}

#[tokio::test]
async fn passwd_changes_login_password() {
    let mut fx = TestFixture::new();
    fx.seed_account("alice", "old", &[]).await;
    fx.login("alice", "alice", "old").await;
    assert_eq!(fx.ask("alice", "!passwd new").await, "your password has been changed");
    fx.ask("alice", "!logout").await;

    assert_eq!(fx.ask("alice", "!login alice old").await, "login failed");
    assert_eq!(fx.ask("alice", "!login alice new").await, "you are now logged in as 'alice'");
}

#[tokio::test]
async fn raw_lines_drive_the_bot() {
    let mut fx = TestFixture::new();
    fx.line(":seabird!bot@host JOIN :#a").await.unwrap();
    fx.line(":irc.example.net 353 seabird = #a :@seabird alice").await.unwrap();
    fx.line(":alice!a@example PRIVMSG seabird :!register alice pw")
        .await
        .unwrap();

    assert_eq!(fx.replies.len(), 1);
    assert_eq!(
        fx.replies[0].to_privmsg(),
        "PRIVMSG alice :you have been registered and logged in"
    );

    fx.line(":irc.example.net 001 seabird :Welcome").await.unwrap();
    assert!(fx.record("alice").is_none());
}

#[tokio::test]
async fn welcome_with_collided_nick_renames_the_bot() {
    let mut fx = TestFixture::new();
    fx.seed_account("alice", "pw", &[]).await;
    fx.line(":irc.example.net 001 seabird_ :Welcome").await.unwrap();
    fx.line(":seabird_!bot@host JOIN :#a").await.unwrap();
    assert_eq!(fx.bot.nick(), "seabird_");
    assert!(fx.record("seabird_").is_none());

    fx.line(":irc.example.net 353 seabird_ = #a :@seabird_ alice")
        .await
        .unwrap();

    let replies = fx
        .say_to("alice", "seabird_", "!login alice pw")
        .await
        .unwrap();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].text, "you are now logged in as 'alice'");
    assert_eq!(fx.logged_in_as("alice").as_deref(), Some("alice"));

    fx.line(":seabird_!bot@host PART #a").await.unwrap();
    assert!(fx.record("alice").is_none());
}

#[tokio::test]
async fn auth_commands_are_private_only() {
    let mut fx = TestFixture::new();
    fx.join("alice", "#a").await;
    let replies = fx.say_to("alice", "#a", "!register alice pw").await.unwrap();
    assert!(replies.is_empty());
    assert!(fx.account("alice").await.is_none());
}

// ─────────────────────────────────────────────────────────────────────────────
// Permissions
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn non_admin_cannot_grant_admin() {
    let mut fx = TestFixture::new();
    fx.seed_account("ops", "pw", &["addperm"]).await;
    fx.seed_account("bob", "pw", &["whois"]).await;
    fx.login("ops", "ops", "pw").await;

    assert_eq!(
        fx.ask("ops", "!addperm bob admin").await,
        "only users with the 'admin' permission can add admins"
    );
    assert_eq!(fx.account("bob").await.unwrap().perms, vec!["whois"]);

    fx.seed_account("pleb", "pw", &[]).await;
    fx.login("pleb", "pleb", "pw").await;
    assert_eq!(
        fx.ask("pleb", "!addperm bob admin").await,
        "you don't have permission to add permissions"
    );
    assert_eq!(fx.account("bob").await.unwrap().perms, vec!["whois"]);
}

#[tokio::test]
async fn admin_is_a_superset() {
    let mut fx = TestFixture::new();
    fx.seed_account("root", "pw", &["admin"]).await;
    fx.seed_account("bob", "pw", &[]).await;
    fx.bot
        .register("ping", CommandScope::Any, CheckPerm::new("ping", FnCommand(ping)))
        .unwrap();
    fx.login("root", "root", "pw").await;

    assert_eq!(fx.ask("root", "!addperm bob whois").await, "added perm 'whois' to user 'bob'");
    assert_eq!(fx.ask("root", "!addperm bob admin").await, "added perm 'admin' to user 'bob'");
    assert_eq!(
        fx.ask("root", "!checkperms bob").await,
        "permissions for 'bob': whois, admin"
    );
    assert_eq!(
        fx.ask("root", "!delperm bob admin").await,
        "removed perm 'admin' from user 'bob'"
    );
    assert_eq!(fx.ask("root", "!whois root").await, "nick 'root' is user 'root'");
    assert_eq!(fx.ask("root", "!ping").await, "pong");
}

#[tokio::test]
async fn granting_twice_reports_existing_perm() {
    let mut fx = TestFixture::new();
    fx.seed_account("root", "pw", &["admin"]).await;
    fx.seed_account("bob", "pw", &[]).await;
    fx.login("root", "root", "pw").await;

    fx.ask("root", "!addperm bob whois").await;
    assert_eq!(
        fx.ask("root", "!addperm bob whois").await,
        "user 'bob' already has perm 'whois'"
    );
    assert_eq!(fx.account("bob").await.unwrap().perms, vec!["whois"]);
}

#[tokio::test]
async fn granted_perm_takes_effect_immediately() {
    let mut fx = TestFixture::new();
    fx.seed_account("root", "pw", &["admin"]).await;
    fx.seed_account("bob", "pw", &[]).await;
    fx.login("root", "root", "pw").await;
    fx.login("bob", "bob", "pw").await;

    assert_eq!(
        fx.ask("bob", "!whois root").await,
        "you do not have permission to check a user account"
    );
    fx.ask("root", "!addperm bob whois").await;
    assert_eq!(fx.ask("bob", "!whois root").await, "nick 'root' is user 'root'");
    fx.ask("root", "!delperm bob whois").await;
    assert_eq!(
        fx.ask("bob", "!whois root").await,
        "you do not have permission to check a user account"
    );
}

#[tokio::test]
async fn gated_plugin_command() {
    let mut fx = TestFixture::new();
    fx.seed_account("dj", "pw", &["music"]).await;
    fx.seed_account("pleb", "pw", &[]).await;
    fx.bot
        .register(
            "play",
            CommandScope::Channel,
            CheckPerm::new("music", FnCommand(ping)),
        )
        .unwrap();
    fx.login("dj", "dj", "pw").await;
    fx.login("pleb", "pleb", "pw").await;

    let replies = fx.say_to("dj", HOME_CHANNEL, "!play song").await.unwrap();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].body(), "dj: pong");

    let replies = fx.say_to("pleb", HOME_CHANNEL, "!play song").await.unwrap();
    assert_eq!(
        replies[0].body(),
        "pleb: you do not have the required permission: music"
    );

    assert!(matches!(
        fx.bot.register("play", CommandScope::Any, FnCommand(ping)),
        Err(AuthError::DuplicateCommand(_))
    ));
}

// ─────────────────────────────────────────────────────────────────────────────
// Store Failures
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn anonymous_callers_never_reach_the_store() {
    let store = Arc::new(CountingStore::new(MemoryStore::new()));
    let mut fx = TestFixture::with_store(Arc::clone(&store));
    fx.bot
        .register("ping", CommandScope::Any, CheckPerm::new("ping", FnCommand(ping)))
        .unwrap();
    fx.join("anon", "#a").await;

    for text in [
        "!addperm bob whois",
        "!delperm bob whois",
        "!checkperms bob",
        "!whois bob",
        "!passwd x",
        "!logout",
        "!ping",
    ] {
        fx.ask("anon", text).await;
    }
    assert_eq!(store.calls(), 0);
}

async fn failing_fixture(
    config: AuthConfig,
) -> (Arc<FailingStore<MemoryStore>>, TestFixture<FailingStore<MemoryStore>>) {
    let store = Arc::new(FailingStore::new(MemoryStore::new()));
    let mut fx = TestFixture::with_config(Arc::clone(&store), config);
    fx.seed_account("root", "pw", &["admin"]).await;
    fx.seed_account("bob", "pw", &[]).await;
    fx.bot
        .register("ping", CommandScope::Any, CheckPerm::new("ping", FnCommand(ping)))
        .unwrap();
    fx.login("root", "root", "pw").await;
    (store, fx)
}

async fn assert_gated_commands_denied<S: chanauth_store::Store>(fx: &mut TestFixture<S>) {
    assert_eq!(
        fx.ask("root", "!addperm bob whois").await,
        "you don't have permission to add permissions"
    );
    assert_eq!(
        fx.ask("root", "!delperm bob whois").await,
        "you don't have permission to remove permissions"
    );
    assert_eq!(
        fx.ask("root", "!checkperms bob").await,
        "you do not have permission to view permissions"
    );
    assert_eq!(
        fx.ask("root", "!whois bob").await,
        "you do not have permission to check a user account"
    );
    assert_eq!(
        fx.ask("root", "!ping").await,
        "you do not have the required permission: ping"
    );
}

#[tokio::test]
async fn store_errors_deny_gated_commands() {
    init_tracing();
    let (store, mut fx) = failing_fixture(AuthConfig::new().salt(TEST_SALT)).await;
    store.set_mode(FailMode::Error);
    assert_gated_commands_denied(&mut fx).await;
    assert!(store.failures() >= 5);

    store.set_mode(FailMode::Pass);
    assert_eq!(fx.ask("root", "!whois bob").await, "nick 'bob' is not logged in");
}

#[tokio::test]
async fn store_timeouts_deny_gated_commands() {
    let (store, mut fx) = failing_fixture(AuthConfig::new().salt(TEST_SALT)).await;
    store.set_mode(FailMode::Timeout);
    assert_gated_commands_denied(&mut fx).await;
}

#[tokio::test]
async fn hung_store_is_cut_off_by_deadline() {
    let config = AuthConfig::new()
        .salt(TEST_SALT)
        .store_timeout(Duration::from_millis(30));
    let (store, mut fx) = failing_fixture(config).await;
    store.set_mode(FailMode::Hang);
    assert_gated_commands_denied(&mut fx).await;
}

#[tokio::test]
async fn store_failure_in_ungated_command_is_returned_not_replied() {
    let (store, mut fx) = failing_fixture(AuthConfig::new().salt(TEST_SALT)).await;
    fx.join("carol", "#a").await;
    fx.join("bob", "#a").await;
    store.set_mode(FailMode::Error);

    let err = fx.say("carol", "!register carol pw").await.unwrap_err();
    assert!(matches!(err, AuthError::Store { ref command, .. } if command == "register"));

    let err = fx.say("root", "!passwd new").await.unwrap_err();
    assert!(matches!(err, AuthError::Store { .. }));

    let before = fx.replies.len();
    assert!(fx.say("bob", "!login bob pw").await.is_err());
    assert_eq!(fx.replies.len(), before);
    assert!(fx.logged_in_as("bob").is_none());
}

#[tokio::test]
async fn failed_permission_write_sends_no_confirmation() {
    let (store, mut fx) = failing_fixture(AuthConfig::new().salt(TEST_SALT)).await;
    fx.seed_account("dave", "pw", &[]).await;
    fx.ask("root", "!addperm dave checkperms").await;
    store.set_mode(FailMode::WriteError);

    let before = fx.replies.len();
    let err = fx.say("root", "!addperm dave whois").await.unwrap_err();
    assert!(matches!(err, AuthError::Store { ref command, .. } if command == "addperm"));
    let err = fx.say("root", "!delperm dave checkperms").await.unwrap_err();
    assert!(matches!(err, AuthError::Store { ref command, .. } if command == "delperm"));
    assert_eq!(fx.replies.len(), before);

    store.set_mode(FailMode::Pass);
    assert_eq!(fx.account("dave").await.unwrap().perms, vec!["checkperms"]);
    assert_eq!(
        fx.ask("root", "!addperm dave whois").await,
        "added perm 'whois' to user 'dave'"
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Persistence
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn accounts_survive_restart_on_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("accounts.db");

    {
        let store = Arc::new(SqliteStore::open(&path).unwrap());
        let mut fx = TestFixture::with_store(store);
        fx.seed_account("root", "pw", &["admin"]).await;
        fx.join("alice", "#a").await;
        fx.ask("alice", "!register alice pw").await;
        fx.login("root", "root", "pw").await;
        fx.ask("root", "!addperm alice whois").await;
    }

    let store = Arc::new(SqliteStore::open(&path).unwrap());
    let mut fx = TestFixture::with_store(store);
    assert!(fx.record("alice").is_none());
    fx.login("alice", "alice", "pw").await;
    assert_eq!(fx.ask("alice", "!whois alice").await, "nick 'alice' is user 'alice'");
    assert_eq!(fx.account("alice").await.unwrap().perms, vec!["whois"]);
}
