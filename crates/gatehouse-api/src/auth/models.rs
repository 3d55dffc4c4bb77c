use crate::error::HttpAppError;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use gatehouse_core::models::{Session, User};
use gatehouse_core::AppError;

/// Outcome of session resolution, stored in request extensions for every request.
///
/// Either both fields are set or neither is; a session is only present after the
/// identity provider confirmed it for this request.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub session: Option<Session>,
    pub user: Option<User>,
}

impl SessionContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(session: Session, user: User) -> Self {
        Self {
            session: Some(session),
            user: Some(user),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some() && self.user.is_some()
    }
}

/// Authenticated caller, extracted from the resolved [`SessionContext`].
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    pub session: Session,
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let context = parts.extensions.get::<SessionContext>().cloned();

        match context {
            Some(SessionContext {
                session: Some(session),
                user: Some(user),
            }) => Ok(AuthUser { user, session }),
            _ => Err(AppError::Unauthorized("Sign in required".to_string()).into()),
        }
    }
}
