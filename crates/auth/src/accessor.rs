//! Bearer-token lookup over the host's session store.

use serde_json::Value as JsonValue;
use thiserror::Error;

use entsync_core::UserId;

use crate::session::{SessionStore, LAST_TOKEN_RESPONSE_KEY};
use crate::token::{AccessToken, TokenResponse};

/// Why no access token could be produced for a user.
///
/// Both cases are normal outcomes (the user logged in without SSO, or the
/// provider returned no access token) and are never fatal to the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("no stored token response for user {user_id}")]
    MissingSession { user_id: UserId },

    #[error("stored token response for user {user_id} has no access token")]
    MissingToken { user_id: UserId },
}

impl TokenError {
    pub fn user_id(&self) -> UserId {
        match self {
            TokenError::MissingSession { user_id } | TokenError::MissingToken { user_id } => *user_id,
        }
    }
}

/// Reads the last stored token response for a user and extracts its access token.
#[derive(Debug, Clone)]
pub struct TokenAccessor<S> {
    sessions: S,
}

impl<S> TokenAccessor<S> {
    pub fn new(sessions: S) -> Self {
        Self { sessions }
    }

    pub fn sessions(&self) -> &S {
        &self.sessions
    }
}

impl<S> TokenAccessor<S>
where
    S: SessionStore,
{
    /// Returns the user's bearer token, or the reason it is unavailable.
    ///
    /// Every absence is logged once with the user id.
    pub fn access_token(&self, user_id: UserId) -> Result<AccessToken, TokenError> {
        let record = match self.sessions.get(user_id, LAST_TOKEN_RESPONSE_KEY) {
            Some(record) if !is_empty_record(&record) => record,
            _ => {
                tracing::warn!(%user_id, "unable to get entitlements: no stored token response");
                return Err(TokenError::MissingSession { user_id });
            }
        };

        let Some(response) = TokenResponse::from_record(record) else {
            tracing::warn!(%user_id, "unable to get entitlements: token response is not an object");
            return Err(TokenError::MissingToken { user_id });
        };

        match response.access_token() {
            Some(token) => Ok(token),
            None => {
                tracing::warn!(
                    %user_id,
                    fields = ?response.field_names(),
                    "unable to get entitlements: token response has no access token"
                );
                Err(TokenError::MissingToken { user_id })
            }
        }
    }
}

fn is_empty_record(record: &JsonValue) -> bool {
    match record {
        JsonValue::Null => true,
        JsonValue::String(s) => s.is_empty(),
        JsonValue::Object(map) => map.is_empty(),
        JsonValue::Array(items) => items.is_empty(),
        _ => false,
    }
}
