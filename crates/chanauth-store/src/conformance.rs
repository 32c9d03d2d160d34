//! Behaviour every Store implementation must share. Each backend's test module
//! runs these against its own store.

use chanauth_core::PasswordHasher;

use crate::traits::{AccountFilter, InsertResult, Store, StoreExt, UpdateResult, UpsertResult};

fn hasher() -> PasswordHasher {
    PasswordHasher::new("conformance-salt")
}

pub(crate) async fn insert_and_find(store: &dyn Store) {
    let h = hasher().hash("secret");

    let result = store.insert("alice", &h).await.unwrap();
    let InsertResult::Inserted(id) = result else {
        panic!("expected Inserted, got {:?}", result);
    };

    let account = store.find_by_name("alice").await.unwrap().unwrap();
    assert_eq!(account.id, id);
    assert_eq!(account.name, "alice");
    assert_eq!(account.password_hash, h);
    assert!(account.perms.is_empty());

    assert!(store.find_by_name("Alice").await.unwrap().is_none());
    assert!(store.credentials_match("alice", &h).await.unwrap());
    assert!(!store
        .credentials_match("alice", &hasher().hash("wrong"))
        .await
        .unwrap());
}

pub(crate) async fn duplicate_name_rejected(store: &dyn Store) {
    let h1 = hasher().hash("one");
    let h2 = hasher().hash("two");

    assert!(matches!(store.insert("bob", &h1).await.unwrap(), InsertResult::Inserted(_)));
    assert_eq!(store.insert("bob", &h2).await.unwrap(), InsertResult::AlreadyExists);

    // The first account is untouched.
    let account = store.find_by_name("bob").await.unwrap().unwrap();
    assert_eq!(account.password_hash, h1);
    assert_eq!(store.count(&AccountFilter::by_name("bob")).await.unwrap(), 1);
}

pub(crate) async fn push_is_set_like(store: &dyn Store) {
    store.insert("carol", &hasher().hash("pw")).await.unwrap();
    let f = AccountFilter::by_name("carol");

    let r = store.push_permission(&f, "whois").await.unwrap();
    assert_eq!(r, UpdateResult { matched: 1, modified: 1 });
    let r = store.push_permission(&f, "whois").await.unwrap();
    assert_eq!(r, UpdateResult { matched: 1, modified: 0 });
    store.push_permission(&f, "addperm").await.unwrap();

    let account = store.find_by_name("carol").await.unwrap().unwrap();
    assert_eq!(account.perms, vec!["whois".to_string(), "addperm".to_string()]);

    let r = store
        .push_permission(&AccountFilter::by_name("nobody"), "whois")
        .await
        .unwrap();
    assert!(!r.matched_any());
}

pub(crate) async fn pull(store: &dyn Store) {
    store.insert("dave", &hasher().hash("pw")).await.unwrap();
    let f = AccountFilter::by_name("dave");
    store.push_permission(&f, "a").await.unwrap();
    store.push_permission(&f, "b").await.unwrap();

    let r = store.pull_permission(&f, "a").await.unwrap();
    assert_eq!(r, UpdateResult { matched: 1, modified: 1 });
    let r = store.pull_permission(&f, "a").await.unwrap();
    assert_eq!(r, UpdateResult { matched: 1, modified: 0 });

    let account = store.find_by_name("dave").await.unwrap().unwrap();
    assert_eq!(account.perms, vec!["b".to_string()]);

    let r = store
        .pull_permission(&AccountFilter::by_name("nobody"), "a")
        .await
        .unwrap();
    assert!(!r.matched_any());
}

pub(crate) async fn count_by_permission(store: &dyn Store) {
    let h = hasher().hash("pw");
    store.insert("erin", &h).await.unwrap();
    store.insert("frank", &h).await.unwrap();
    store.insert("grace", &h).await.unwrap();
    store
        .push_permission(&AccountFilter::by_name("erin"), "admin")
        .await
        .unwrap();
    store
        .push_permission(&AccountFilter::by_name("grace"), "admin")
        .await
        .unwrap();

    let admins = AccountFilter::all().with_permission("admin");
    assert_eq!(store.count(&admins).await.unwrap(), 2);
    assert_eq!(store.count(&AccountFilter::all()).await.unwrap(), 3);
    assert!(store.holds_permission("erin", "admin").await.unwrap());
    assert!(!store.holds_permission("frank", "admin").await.unwrap());
    assert!(!store.holds_permission("nobody", "admin").await.unwrap());

    // First match is the lowest id.
    let first = store.find_one(&admins).await.unwrap().unwrap();
    assert_eq!(first.name, "erin");

    let names: Vec<String> = store.list().await.unwrap().into_iter().map(|a| a.name).collect();
    assert_eq!(names, vec!["erin", "frank", "grace"]);
}

pub(crate) async fn upsert_password(store: &dyn Store) {
    let old = hasher().hash("old");
    let new = hasher().hash("new");
    store.insert("heidi", &old).await.unwrap();
    store
        .push_permission(&AccountFilter::by_name("heidi"), "whois")
        .await
        .unwrap();

    assert_eq!(store.upsert_password("heidi", &new).await.unwrap(), UpsertResult::Updated);
    let account = store.find_by_name("heidi").await.unwrap().unwrap();
    assert_eq!(account.password_hash, new);
    assert_eq!(account.perms, vec!["whois".to_string()]);

    let r = store.upsert_password("ivan", &new).await.unwrap();
    assert!(matches!(r, UpsertResult::Inserted(_)));
    assert!(store.credentials_match("ivan", &new).await.unwrap());
}
