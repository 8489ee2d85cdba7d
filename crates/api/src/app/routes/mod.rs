use axum::{
    routing::{get, post},
    Router,
};

pub mod events;
pub mod system;
pub mod users;

/// Router for all application endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .route("/events/login", post(events::user_login))
        .route("/me/levels", get(users::my_levels))
}
