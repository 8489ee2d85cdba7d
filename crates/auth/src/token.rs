use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Bearer token presented to the entitlements API.
///
/// `Debug` never prints the token itself.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Returns `None` for blank tokens.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return None;
        }
        Some(Self(token))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Token endpoint response as stored by the host after login.
///
/// Kept as an untyped object: providers disagree on field types (`expires_in`
/// may be a number or a string) and only `access_token` is read.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenResponse(Map<String, JsonValue>);

impl TokenResponse {
    /// `None` unless `record` is a JSON object.
    pub fn from_record(record: JsonValue) -> Option<Self> {
        match record {
            JsonValue::Object(fields) => Some(Self(fields)),
            _ => None,
        }
    }

    /// The usable bearer token, if any. A non-string `access_token` is unusable.
    pub fn access_token(&self) -> Option<AccessToken> {
        self.0
            .get("access_token")
            .and_then(JsonValue::as_str)
            .and_then(|token| AccessToken::new(token))
    }

    /// Names of the fields present in the response, for diagnostics.
    pub fn field_names(&self) -> Vec<&str> {
        self.0.keys().map(String::as_str).collect()
    }
}

impl core::fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenResponse")
            .field("fields", &self.field_names())
            .finish()
    }
}
