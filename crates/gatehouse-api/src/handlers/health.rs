use axum::{response::IntoResponse, Json};
use serde_json::json;

/// Liveness check
pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
