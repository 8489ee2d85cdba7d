//! Host lifecycle events.

use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, Json};

use entsync_infra::UserEventHandler;

use crate::app::dto::LoginEventRequest;
use crate::app::services::AppServices;

/// POST /events/login - record the login's token response and refresh levels.
///
/// Always 204: refresh problems are logged, never surfaced to the user.
pub async fn user_login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(event): Json<LoginEventRequest>,
) -> StatusCode {
    if let Some(token_response) = event.token_response {
        services.sessions.store_token_response(event.user_id, token_response);
    }

    services.events.on_user_login(event.user_id).await;
    StatusCode::NO_CONTENT
}
