use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use entsync_levels::LevelStore;

use crate::app::dto::UserLevelsResponse;
use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

/// GET /me/levels - levels currently assigned to the caller.
pub async fn my_levels(
    Extension(services): Extension<Arc<AppServices>>,
    principal: Option<Extension<PrincipalContext>>,
) -> axum::response::Response {
    let Some(Extension(principal)) = principal else {
        return errors::json_error(StatusCode::UNAUTHORIZED, "unauthenticated", "authentication required");
    };

    let user_id = principal.user_id();
    match services.levels.user_levels(user_id) {
        Ok(levels) => (
            StatusCode::OK,
            Json(UserLevelsResponse {
                user_id,
                levels: levels.into_iter().collect(),
            }),
        )
            .into_response(),
        Err(e) => errors::level_store_error_to_response(e),
    }
}
