use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use entsync_levels::LevelStoreError;

pub fn level_store_error_to_response(err: LevelStoreError) -> axum::response::Response {
    match err {
        LevelStoreError::UnknownLevel(id) => {
            json_error(StatusCode::NOT_FOUND, "unknown_level", format!("unknown level {id}"))
        }
        LevelStoreError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        LevelStoreError::Unavailable(msg) => {
            json_error(StatusCode::SERVICE_UNAVAILABLE, "store_unavailable", msg)
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
