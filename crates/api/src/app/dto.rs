use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use entsync_core::{LevelId, UserId};

// -------------------------
// Request DTOs
// -------------------------

/// Sent by the host after a user has logged in.
#[derive(Debug, Deserialize)]
pub struct LoginEventRequest {
    pub user_id: UserId,
    /// Token response from the identity provider, if the login went through SSO.
    /// Stored as received; its shape is checked when the token is read.
    #[serde(default)]
    pub token_response: Option<JsonValue>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct UserLevelsResponse {
    pub user_id: UserId,
    pub levels: Vec<LevelId>,
}
