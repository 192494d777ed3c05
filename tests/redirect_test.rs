use std::sync::Arc;

use serde_json::json;
use vinylcli::management::{
    KEY_REDIRECT, KeyValueStore, MemoryStore, RedirectGuard, is_valid_redirect_url,
};

#[test]
fn test_redirect_url_validation() {
    let cases = [
        ("/collection", true),
        ("/collection?style=Rock&year=1970-1979", true),
        ("/login-history", true),
        ("", false),
        ("collection", false),
        // absolute and protocol-relative URLs leave the application
        ("https://evil.com", false),
        ("//evil.com", false),
        // percent-encoding must not smuggle a second slash past the check
        ("/%2fevil.com", false),
        ("/%2f%2fevil.com", false),
        // backslashes get normalized to slashes by some user agents
        ("/a\\b", false),
        ("/%5C%5Cevil.com", false),
        // bouncing back into the login page would loop forever
        ("/login", false),
        ("/login?next=1", false),
        ("/login#totp", false),
        ("/login/", false),
        ("/login/two-factor", false),
    ];

    for (url, expected) in cases {
        assert_eq!(is_valid_redirect_url(url), expected, "url: {url}");
    }
}

#[tokio::test]
async fn test_redirect_round_trips_once() {
    let store = Arc::new(MemoryStore::new());
    let guard = RedirectGuard::new(store);

    guard.store_redirect_url("/collection?genre=Jazz").await;

    // the slot hands its value out exactly once
    assert_eq!(
        guard.get_and_clear().await,
        Some("/collection?genre=Jazz".to_string())
    );
    assert_eq!(guard.get_and_clear().await, None);
}

#[tokio::test]
async fn test_invalid_target_is_never_stored() {
    let store = Arc::new(MemoryStore::new());
    let guard = RedirectGuard::new(Arc::clone(&store) as Arc<dyn KeyValueStore>);

    guard.store_redirect_url("https://evil.com").await;

    assert!(store.get(KEY_REDIRECT).await.unwrap().is_none());
    assert_eq!(guard.get_and_clear().await, None);
}

#[tokio::test]
async fn test_tampered_slot_is_cleared_and_rejected() {
    let store = Arc::new(MemoryStore::new());
    let guard = RedirectGuard::new(Arc::clone(&store) as Arc<dyn KeyValueStore>);

    // something other than this code wrote a non-string into the slot
    store.set(KEY_REDIRECT, json!(42)).await.unwrap();
    assert_eq!(guard.get_and_clear().await, None);
    assert!(store.get(KEY_REDIRECT).await.unwrap().is_none());

    // a planted external URL is re-checked on the way out
    store.set(KEY_REDIRECT, json!("https://evil.com")).await.unwrap();
    assert_eq!(guard.get_and_clear().await, None);
    assert!(store.get(KEY_REDIRECT).await.unwrap().is_none());
}
