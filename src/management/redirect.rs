use std::sync::Arc;

use serde_json::json;

use crate::management::store::{KEY_REDIRECT, KeyValueStore};

pub fn is_valid_redirect_url(raw: &str) -> bool {
    // undecodable input is rejected outright
    let Ok(decoded) = urlencoding::decode(raw) else {
        return false;
    };

    // internal paths only, never absolute or protocol-relative URLs
    if !raw.starts_with('/') {
        return false;
    }

    for form in [raw, decoded.as_ref()] {
        if form.starts_with("//") || form.contains('\\') {
            return false;
        }
        // never bounce back into the login page
        if is_login_path(form) {
            return false;
        }
    }

    true
}

// the login page and everything nested under it, but not e.g. /login-history
fn is_login_path(path: &str) -> bool {
    match path.strip_prefix("/login") {
        Some(rest) => {
            rest.is_empty()
                || rest.starts_with('/')
                || rest.starts_with('?')
                || rest.starts_with('#')
        }
        None => false,
    }
}

pub struct RedirectGuard {
    store: Arc<dyn KeyValueStore>,
}

impl RedirectGuard {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn store_redirect_url(&self, raw: &str) {
        if is_valid_redirect_url(raw) {
            let _ = self.store.set(KEY_REDIRECT, json!(raw)).await;
        }
    }

    pub async fn get_and_clear(&self) -> Option<String> {
        let value = self.store.get(KEY_REDIRECT).await.ok().flatten();
        // the slot is read-once, cleared no matter what it held
        let _ = self.store.remove(KEY_REDIRECT).await;

        let raw = value?.as_str()?.to_string();
        if is_valid_redirect_url(&raw) {
            Some(raw)
        } else {
            None
        }
    }
}
