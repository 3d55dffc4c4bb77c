//! Route configuration and the gatekeeper pipeline.
//!
//! Layers added later run earlier. Reading the `.layer` calls bottom-up gives the order a
//! request sees: security headers, request id, tracing, body limit, then the guards
//! (origin/CSRF, session, authorization) and finally the handler.

use crate::auth::{authorization_middleware, session_middleware};
use crate::handlers::{csrf, health, join, upload_url};
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use gatehouse_infra::{origin_csrf_middleware, request_id_middleware, security_headers_middleware};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// JSON bodies accepted by the API are small; uploads go straight to storage.
const MAX_BODY_BYTES: usize = 64 * 1024;

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not Found")
}

fn api_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/csrf-token", get(csrf::get_csrf_token))
        .route("/api/join", post(join::join))
        .route(
            "/api/private/upload/get-signed-upload-url",
            post(upload_url::get_signed_upload_url),
        )
        .with_state(state)
}

/// Build the application router.
///
/// `pages` carries the page routes rendered by the host application; they sit behind the
/// same guards as the API. It must not set its own fallback.
pub fn build_router(state: Arc<AppState>, pages: Router) -> Router {
    api_routes(state.clone())
        .merge(pages)
        .fallback(not_found)
        // Guards: origin/CSRF -> session -> authorization
        .layer(axum::middleware::from_fn(authorization_middleware))
        .layer(axum::middleware::from_fn_with_state(
            state.identity.clone(),
            session_middleware,
        ))
        .layer(axum::middleware::from_fn_with_state(
            state.trust.clone(),
            origin_csrf_middleware,
        ))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(axum::middleware::from_fn_with_state(
            state.security_headers.clone(),
            security_headers_middleware,
        ))
}
