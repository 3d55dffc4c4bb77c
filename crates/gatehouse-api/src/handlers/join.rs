//! Account sign-up
//!
//! Error bodies carry a stable `code` the sign-up form switches on.

use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gatehouse_core::models::{JoinRequest, JoinResponse};
use regex::Regex;
use serde_json::{json, Value};
use std::sync::{Arc, LazyLock};

use crate::auth::IdentityError;

const MIN_PASSWORD_LEN: usize = 8;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl JoinError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }
}

impl IntoResponse for JoinError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({
                "success": false,
                "code": self.code,
                "message": self.message,
            })),
        )
            .into_response()
    }
}

/// Strings pass through, null and absent become empty, anything else is rendered as JSON.
fn field_text(value: Option<Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
    }
}

/// Validate sign-up input, returning the normalized email and the password.
pub fn validate_join(request: JoinRequest) -> Result<(String, String), JoinError> {
    let email = field_text(request.email).trim().to_lowercase();
    let password = field_text(request.password);

    if email.is_empty() {
        return Err(JoinError::new(
            StatusCode::BAD_REQUEST,
            "EMAIL_REQUIRED",
            "Please enter your email.",
        ));
    }
    if !EMAIL_PATTERN.is_match(&email) {
        return Err(JoinError::new(
            StatusCode::BAD_REQUEST,
            "EMAIL_INVALID",
            "Please enter a valid email address.",
        ));
    }
    if password.is_empty() {
        return Err(JoinError::new(
            StatusCode::BAD_REQUEST,
            "PASSWORD_REQUIRED",
            "Please enter a password.",
        ));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(JoinError::new(
            StatusCode::BAD_REQUEST,
            "PASSWORD_WEAK",
            "Password must be at least 8 characters.",
        ));
    }

    Ok((email, password))
}

/// Map a provider failure onto the sign-up error codes.
pub fn map_signup_error(err: &IdentityError) -> JoinError {
    match err {
        IdentityError::Transport(_) => JoinError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "SERVER_ERROR",
            "Something went wrong on our side. Please try again.",
        ),
        IdentityError::Rejected(message) => {
            let lowered = message.to_lowercase();
            if ["already", "exists", "duplicate"]
                .iter()
                .any(|p| lowered.contains(p))
            {
                JoinError::new(
                    StatusCode::CONFLICT,
                    "USER_EXISTS",
                    "An account with this email already exists.",
                )
            } else if ["forbidden", "not allowed", "not authorized"]
                .iter()
                .any(|p| lowered.contains(p))
            {
                JoinError::new(
                    StatusCode::FORBIDDEN,
                    "SIGNUP_FORBIDDEN",
                    "Sign-up is currently blocked by server configuration.",
                )
            } else if message.is_empty() {
                JoinError::new(
                    StatusCode::BAD_REQUEST,
                    "SIGNUP_FAILED",
                    "Unable to create account.",
                )
            } else {
                JoinError::new(StatusCode::BAD_REQUEST, "SIGNUP_FAILED", message.clone())
            }
        }
    }
}

/// Create an account. A missing or unparseable body is treated as empty.
#[tracing::instrument(skip(state, body), fields(operation = "join"))]
pub async fn join(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<JoinResponse>, JoinError> {
    let request: JoinRequest = serde_json::from_slice(&body).unwrap_or_default();
    let (email, password) = validate_join(request)?;

    if let Err(e) = state.accounts.create_user(&email, &password).await {
        let mapped = map_signup_error(&e);
        if mapped.status.is_server_error() {
            tracing::error!(error = %e, "Sign-up failed");
        } else {
            tracing::info!(code = mapped.code, error = %e, "Sign-up rejected");
        }
        return Err(mapped);
    }

    tracing::info!("Account created");
    Ok(Json(JoinResponse {
        success: true,
        message: "Account created. You can now sign in.".to_string(),
    }))
}
