use std::sync::Arc;

use serde_json::Value as JsonValue;

use entsync_core::UserId;

/// Session key under which the host stores the last OpenID Connect token response.
pub const LAST_TOKEN_RESPONSE_KEY: &str = "openid-connect-generic-last-token-response";

/// Per-user session metadata, owned and written by the host.
pub trait SessionStore: Send + Sync {
    fn get(&self, user_id: UserId, key: &str) -> Option<JsonValue>;
}

impl<S> SessionStore for Arc<S>
where
    S: SessionStore + ?Sized,
{
    fn get(&self, user_id: UserId, key: &str) -> Option<JsonValue> {
        (**self).get(user_id, key)
    }
}
