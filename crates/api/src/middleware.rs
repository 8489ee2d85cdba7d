use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use entsync_core::UserId;
use entsync_infra::UserEventHandler;

use crate::context::PrincipalContext;

/// Header carrying the user id the fronting host has already authenticated.
pub const AUTHENTICATED_USER_HEADER: &str = "x-authenticated-user";

/// Query flag that asks for an entitlement refresh on any request.
pub const REFRESH_QUERY_PARAM: &str = "refresh-entitlements";

/// Attach a [`PrincipalContext`] when the request carries an authenticated user.
///
/// Requests without the header pass through anonymously; a header that is not a
/// valid user id is rejected.
pub async fn identity_middleware(
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    if let Some(user_id) = extract_user(req.headers())? {
        req.extensions_mut().insert(PrincipalContext::new(user_id));
    }

    Ok(next.run(req).await)
}

fn extract_user(headers: &HeaderMap) -> Result<Option<UserId>, StatusCode> {
    let Some(header) = headers.get(AUTHENTICATED_USER_HEADER) else {
        return Ok(None);
    };

    let header = header.to_str().map_err(|_| StatusCode::UNAUTHORIZED)?;
    let user_id = header.parse::<UserId>().map_err(|_| StatusCode::UNAUTHORIZED)?;
    Ok(Some(user_id))
}

/// Run an entitlement refresh before the request proceeds when
/// `?refresh-entitlements=1` is present and the caller is authenticated.
///
/// Must be layered inside [`identity_middleware`].
pub async fn refresh_entitlements_middleware(
    State(events): State<Arc<dyn UserEventHandler>>,
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    if refresh_requested(&req) {
        let caller = req.extensions().get::<PrincipalContext>().map(|p| p.user_id());
        match caller {
            Some(user_id) => events.on_entitlements_refresh_requested(user_id).await,
            None => tracing::debug!("ignoring entitlement refresh request from anonymous caller"),
        }
    }

    next.run(req).await
}

fn refresh_requested<B>(req: &axum::http::Request<B>) -> bool {
    Query::<HashMap<String, String>>::try_from_uri(req.uri())
        .map(|Query(params)| params.get(REFRESH_QUERY_PARAM).map(String::as_str) == Some("1"))
        .unwrap_or(false)
}
