//! Authorization guard
//!
//! Route classes are a pure function of the path. Anonymous callers are kept out of
//! private API routes (401) and private pages (303 to sign-in); signed-in callers are
//! sent away from the sign-in pages and the bare root.

use axum::{
    extract::Request,
    http::{header, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use gatehouse_core::constants::{API_PREFIX, LANDING_PATH, LOGIN_PATH};
use gatehouse_infra::GuardRejection;

use super::models::SessionContext;

/// API routes reachable without a session
const PUBLIC_API_ROUTES: &[&str] = &["/api/join", "/api/csrf-token"];

const PRIVATE_PAGE_PREFIX: &str = "/private";
const PRIVATE_PAGES: &[&str] = &[
    "/explore",
    "/account",
    "/connections",
    "/collaborations",
    "/chat",
    "/opportunities",
];

/// Sign-in pages meant for anonymous visitors only
const AUTH_PAGES: &[&str] = &["/auth/join", "/auth/login"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    PublicApi,
    PrivateApi,
    PublicPage,
    PrivatePage,
    AuthPage,
}

pub fn classify_path(path: &str) -> RouteClass {
    if path.starts_with(API_PREFIX) {
        if PUBLIC_API_ROUTES.contains(&path) {
            RouteClass::PublicApi
        } else {
            RouteClass::PrivateApi
        }
    } else if path.starts_with(PRIVATE_PAGE_PREFIX) || PRIVATE_PAGES.contains(&path) {
        RouteClass::PrivatePage
    } else if AUTH_PAGES.contains(&path) {
        RouteClass::AuthPage
    } else {
        RouteClass::PublicPage
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Continue,
    Reject(GuardRejection),
    Redirect(StatusCode, &'static str),
}

/// Decide what happens to a request for `path` given whether the caller is signed in.
pub fn authorize(method: &Method, path: &str, authenticated: bool) -> Decision {
    match (classify_path(path), authenticated) {
        (RouteClass::PrivateApi, false) => Decision::Reject(GuardRejection::Unauthorized),
        (RouteClass::PrivatePage, false) => Decision::Redirect(StatusCode::SEE_OTHER, LOGIN_PATH),
        (RouteClass::AuthPage, true) => Decision::Redirect(StatusCode::SEE_OTHER, LANDING_PATH),
        (RouteClass::PublicPage, true) if path == "/" && *method == Method::GET => {
            Decision::Redirect(StatusCode::FOUND, LANDING_PATH)
        }
        _ => Decision::Continue,
    }
}

fn redirect(status: StatusCode, location: &'static str) -> Response {
    (
        status,
        [(header::LOCATION, HeaderValue::from_static(location))],
    )
        .into_response()
}

/// Authorization middleware. Must run after the session resolver.
pub async fn authorization_middleware(request: Request, next: Next) -> Response {
    let authenticated = request
        .extensions()
        .get::<SessionContext>()
        .is_some_and(SessionContext::is_authenticated);

    let path = request.uri().path().to_string();
    match authorize(request.method(), &path, authenticated) {
        Decision::Continue => next.run(request).await,
        Decision::Reject(rejection) => {
            tracing::warn!(
                path = %path,
                reason = rejection.reason(),
                "Request rejected by authorization guard"
            );
            rejection.into_response()
        }
        Decision::Redirect(status, location) => {
            tracing::debug!(path = %path, location, "Redirecting");
            redirect(status, location)
        }
    }
}
