//! Identity provider capability
//!
//! The gatekeeper never verifies credentials itself. It asks the provider twice:
//! [`IdentityProvider::read_session`] is a cheap, non-validating read of the session
//! cookie; [`IdentityProvider::validate_session`] round-trips to the provider and is the
//! only source of a trusted [`User`].

use async_trait::async_trait;
use axum_extra::extract::cookie::CookieJar;
use gatehouse_core::models::{Session, User};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::time::Duration;
use uuid::Uuid;

const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// The provider could not be reached or answered garbage.
    #[error("Identity provider unavailable: {0}")]
    Transport(String),

    /// The provider answered and refused the operation.
    #[error("{0}")]
    Rejected(String),
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Session claimed by the request cookies. Not authenticated; never authorize on it.
    async fn read_session(&self, cookies: &CookieJar) -> Option<Session>;

    /// Confirm the session with the provider and return the user it belongs to.
    async fn validate_session(&self, session: &Session) -> Result<User, IdentityError>;
}

/// Administrative account creation.
#[async_trait]
pub trait AccountRegistry: Send + Sync {
    /// Create a pre-confirmed account.
    async fn create_user(&self, email: &str, password: &str) -> Result<(), IdentityError>;
}

#[derive(Debug, Deserialize)]
struct SessionClaims {
    sub: Uuid,
    exp: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    msg: Option<String>,
    message: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

impl ProviderErrorBody {
    fn into_message(self) -> Option<String> {
        self.msg
            .or(self.message)
            .or(self.error_description)
            .or(self.error)
    }
}

/// GoTrue-compatible identity provider over HTTP (Supabase Auth and compatible servers).
#[derive(Clone)]
pub struct GoTrueIdentity {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
    service_role_key: String,
    cookie_name: String,
}

impl GoTrueIdentity {
    pub fn new(
        base_url: impl Into<String>,
        anon_key: impl Into<String>,
        service_role_key: impl Into<String>,
        cookie_name: impl Into<String>,
    ) -> Result<Self, IdentityError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| IdentityError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            service_role_key: service_role_key.into(),
            cookie_name: cookie_name.into(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Decode the access token's claims without checking its signature.
    fn peek_claims(token: &str) -> Option<SessionClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_aud = false;

        decode::<SessionClaims>(token, &DecodingKey::from_secret(&[]), &validation)
            .map(|data| data.claims)
            .ok()
    }

    async fn rejection_message(response: reqwest::Response) -> String {
        let status = response.status();
        response
            .json::<ProviderErrorBody>()
            .await
            .ok()
            .and_then(ProviderErrorBody::into_message)
            .unwrap_or_else(|| format!("Identity provider returned {}", status))
    }
}

#[async_trait]
impl IdentityProvider for GoTrueIdentity {
    async fn read_session(&self, cookies: &CookieJar) -> Option<Session> {
        let token = cookies.get(&self.cookie_name)?.value().to_string();
        if token.is_empty() {
            return None;
        }

        let claims = Self::peek_claims(&token)?;
        Some(Session {
            access_token: token,
            user_id: claims.sub,
            expires_at: claims.exp,
        })
    }

    #[tracing::instrument(skip(self, session), fields(user_id = %session.user_id))]
    async fn validate_session(&self, session: &Session) -> Result<User, IdentityError> {
        let response = self
            .client
            .get(self.endpoint("/auth/v1/user"))
            .bearer_auth(&session.access_token)
            .header("apikey", &self.anon_key)
            .send()
            .await
            .map_err(|e| IdentityError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(IdentityError::Rejected(
                Self::rejection_message(response).await,
            ));
        }

        let user: User = response
            .json()
            .await
            .map_err(|e| IdentityError::Transport(format!("Invalid user payload: {}", e)))?;

        if user.id != session.user_id {
            return Err(IdentityError::Rejected(
                "Session subject does not match provider user".to_string(),
            ));
        }

        Ok(user)
    }
}

#[async_trait]
impl AccountRegistry for GoTrueIdentity {
    #[tracing::instrument(skip(self, email, password))]
    async fn create_user(&self, email: &str, password: &str) -> Result<(), IdentityError> {
        let response = self
            .client
            .post(self.endpoint("/auth/v1/admin/users"))
            .bearer_auth(&self.service_role_key)
            .header("apikey", &self.service_role_key)
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "email_confirm": true,
            }))
            .send()
            .await
            .map_err(|e| IdentityError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(IdentityError::Rejected(
                Self::rejection_message(response).await,
            ));
        }

        Ok(())
    }
}
