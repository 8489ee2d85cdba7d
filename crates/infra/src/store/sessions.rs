use std::collections::HashMap;
use std::sync::RwLock;

use serde_json::Value as JsonValue;

use entsync_auth::{SessionStore, LAST_TOKEN_RESPONSE_KEY};
use entsync_core::UserId;

/// Per-user session metadata held in process memory.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    inner: RwLock<HashMap<(UserId, String), JsonValue>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, user_id: UserId, key: impl Into<String>, value: JsonValue) {
        if let Ok(mut map) = self.inner.write() {
            map.insert((user_id, key.into()), value);
        }
    }

    /// Record the token response received at login, replacing the previous one.
    pub fn store_token_response(&self, user_id: UserId, response: JsonValue) {
        self.put(user_id, LAST_TOKEN_RESPONSE_KEY, response);
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, user_id: UserId, key: &str) -> Option<JsonValue> {
        let map = self.inner.read().ok()?;
        map.get(&(user_id, key.to_string())).cloned()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn stored_token_response_is_readable_under_the_fixed_key() {
        let store = InMemorySessionStore::new();
        store.store_token_response(UserId::new(1), json!({ "access_token": "abc", "expires_in": 300 }));

        let stored = store.get(UserId::new(1), LAST_TOKEN_RESPONSE_KEY).unwrap();
        assert_eq!(stored["access_token"], "abc");
        assert!(store.get(UserId::new(2), LAST_TOKEN_RESPONSE_KEY).is_none());
    }

    #[test]
    fn a_new_login_replaces_the_previous_token_response() {
        let store = InMemorySessionStore::new();
        store.store_token_response(UserId::new(1), json!({ "access_token": "old" }));
        store.store_token_response(UserId::new(1), json!({ "access_token": "new" }));

        let stored = store.get(UserId::new(1), LAST_TOKEN_RESPONSE_KEY).unwrap();
        assert_eq!(stored["access_token"], "new");
    }
}
