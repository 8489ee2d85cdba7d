//! HTTP application wiring (Axum router + service wiring).
//!
//! - `services.rs`: stores, entitlements client, sync service
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request/response bodies
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{http::StatusCode, Extension, Router};
use tower::ServiceBuilder;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// Request order: identity → refresh flag → handler.
pub fn build_app(services: Arc<AppServices>) -> Router {
    let events = services.events.clone();

    routes::router()
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::identity_middleware))
                .layer(axum::middleware::from_fn_with_state(
                    events,
                    middleware::refresh_entitlements_middleware,
                ))
                .layer(Extension(services)),
        )
}

async fn not_found() -> axum::response::Response {
    errors::json_error(StatusCode::NOT_FOUND, "not_found", "not found")
}

pub use services::AppServices;
