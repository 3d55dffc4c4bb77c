//! Origin/CSRF guard
//!
//! First stage of the request pipeline. Every request leaves with a CSRF cookie
//! available; preflights are answered here; state-changing requests must come from a
//! trusted host, a trusted origin (or referer) and carry a matching CSRF header.
//! Responses under `/api` get CORS headers on the way out.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use gatehouse_core::constants::{CORS_PATH_PREFIX, CSRF_COOKIE, CSRF_HEADER};

use super::cors::{apply_cors_headers, build_cors_headers};
use super::csrf::{ensure_token, verify_token, CsrfToken};
use super::trust::TrustPolicy;

/// Terminal policy rejection produced by a guard.
///
/// Bodies are short plain-text reasons; nothing about the request or server state leaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardRejection {
    BadHost,
    BadOrigin,
    Csrf,
    Unauthorized,
}

impl GuardRejection {
    pub fn status(&self) -> StatusCode {
        match self {
            GuardRejection::Unauthorized => StatusCode::UNAUTHORIZED,
            _ => StatusCode::FORBIDDEN,
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            GuardRejection::BadHost => "Forbidden: bad host",
            GuardRejection::BadOrigin => "Forbidden: bad origin",
            GuardRejection::Csrf => "Forbidden: CSRF",
            GuardRejection::Unauthorized => "Unauthorized",
        }
    }
}

impl IntoResponse for GuardRejection {
    fn into_response(self) -> Response {
        (self.status(), self.reason()).into_response()
    }
}

fn is_state_changing(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Host the request was addressed to: the Host header, else the URI authority.
fn request_host(request: &Request) -> Option<&str> {
    header_str(request.headers(), header::HOST.as_str())
        .or_else(|| request.uri().authority().map(|a| a.as_str()))
}

/// Origin of a Referer URL. Unparseable referers have no origin.
fn referer_origin(referer: &str) -> Option<String> {
    url::Url::parse(referer)
        .ok()
        .map(|u| u.origin().ascii_serialization())
}

fn has_trusted_origin(policy: &TrustPolicy, headers: &HeaderMap) -> bool {
    if policy.is_allowed_origin(header_str(headers, header::ORIGIN.as_str())) {
        return true;
    }

    header_str(headers, header::REFERER.as_str())
        .and_then(referer_origin)
        .is_some_and(|origin| policy.is_allowed_origin(Some(&origin)))
}

/// Checks applied to POST/PUT/PATCH/DELETE, in order. `carried_token` is the CSRF cookie
/// the request arrived with, never one minted for this response.
pub fn check_state_changing(
    policy: &TrustPolicy,
    request: &Request,
    carried_token: Option<&str>,
) -> Result<(), GuardRejection> {
    if !policy.is_trusted_host(request_host(request)) {
        return Err(GuardRejection::BadHost);
    }

    if !has_trusted_origin(policy, request.headers()) {
        return Err(GuardRejection::BadOrigin);
    }

    let path = request.uri().path();
    if !policy.is_csrf_exempt(path) {
        let header_token = header_str(request.headers(), CSRF_HEADER);
        if !verify_token(header_token, carried_token) {
            return Err(GuardRejection::Csrf);
        }
    }

    Ok(())
}

/// Origin/CSRF guard middleware
///
/// Use with `axum::middleware::from_fn_with_state(Arc<TrustPolicy>, origin_csrf_middleware)`
/// as the outermost guard.
pub async fn origin_csrf_middleware(
    State(policy): State<Arc<TrustPolicy>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let carried_token = jar.get(CSRF_COOKIE).map(|c| c.value().to_string());
    let ensured = ensure_token(&jar, policy.is_production());
    request
        .extensions_mut()
        .insert(CsrfToken(ensured.token.clone()));

    let origin = header_str(request.headers(), header::ORIGIN.as_str()).map(str::to_string);
    let path = request.uri().path().to_string();
    let method = request.method().clone();

    let mut response = if method == Method::OPTIONS {
        (
            StatusCode::NO_CONTENT,
            build_cors_headers(&policy, origin.as_deref()),
        )
            .into_response()
    } else if is_state_changing(&method) {
        match check_state_changing(&policy, &request, carried_token.as_deref()) {
            Ok(()) => next.run(request).await,
            Err(rejection) => {
                tracing::warn!(
                    method = %method,
                    path = %path,
                    origin = origin.as_deref().unwrap_or("-"),
                    reason = rejection.reason(),
                    "Request rejected by origin guard"
                );
                rejection.into_response()
            }
        }
    } else {
        next.run(request).await
    };

    if method != Method::OPTIONS && path.starts_with(CORS_PATH_PREFIX) {
        apply_cors_headers(response.headers_mut(), &policy, origin.as_deref());
    }

    if let Some(cookie) = ensured.issued {
        if let Ok(value) = HeaderValue::from_str(&cookie.to_string()) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }

    response
}
