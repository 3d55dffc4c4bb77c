//! Session resolver

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use super::identity::IdentityProvider;
use super::models::SessionContext;

/// Resolve the request's session.
///
/// Anonymous traffic costs no provider round-trip. A claimed session is confirmed with
/// the provider; any failure degrades to anonymous.
pub async fn resolve_session(
    identity: &dyn IdentityProvider,
    cookies: &CookieJar,
) -> SessionContext {
    let Some(session) = identity.read_session(cookies).await else {
        return SessionContext::anonymous();
    };

    match identity.validate_session(&session).await {
        Ok(user) => SessionContext::authenticated(session, user),
        Err(e) => {
            tracing::debug!(
                user_id = %session.user_id,
                error = %e,
                "Session validation failed, treating request as anonymous"
            );
            SessionContext::anonymous()
        }
    }
}

/// Session resolver middleware. Inserts a [`SessionContext`] into request extensions.
pub async fn session_middleware(
    State(identity): State<Arc<dyn IdentityProvider>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let context = resolve_session(identity.as_ref(), &jar).await;
    request.extensions_mut().insert(context);
    next.run(request).await
}
