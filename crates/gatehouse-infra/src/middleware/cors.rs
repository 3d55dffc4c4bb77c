//! CORS responder
//!
//! Credentialed CORS: `Access-Control-Allow-Origin` echoes the request origin only when
//! the trust policy allows it. It is never wildcarded.

use axum::http::{header, HeaderMap, HeaderValue};

use super::trust::TrustPolicy;

const ALLOWED_METHODS: &str = "GET,POST,PUT,PATCH,DELETE,OPTIONS";
const ALLOWED_HEADERS: &str = "Content-Type, Authorization, X-CSRF-Token";

/// Compute the CORS headers for a response to `origin`.
pub fn build_cors_headers(policy: &TrustPolicy, origin: Option<&str>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::VARY, HeaderValue::from_static("Origin"));
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );

    if policy.is_allowed_origin(origin) {
        if let Some(value) = origin.and_then(|o| HeaderValue::from_str(o).ok()) {
            headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
        }
    }

    headers
}

/// Overwrite the response's CORS headers with those computed for `origin`.
pub fn apply_cors_headers(target: &mut HeaderMap, policy: &TrustPolicy, origin: Option<&str>) {
    for (name, value) in build_cors_headers(policy, origin) {
        if let Some(name) = name {
            target.insert(name, value);
        }
    }
}
