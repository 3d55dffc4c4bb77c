//! Error bodies for API handlers
//!
//! Handlers return `Result<_, HttpAppError>`; any [`AppError`] converts with `?` and is
//! rendered as `{ "success": false, "error": ..., "code": ... }`.

use axum::{
    extract::rejection::JsonRejection,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gatehouse_core::{AppError, ErrorMetadata, LogLevel};
use gatehouse_storage::StorageError;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::LazyLock;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            code: code.into(),
            details: None,
            error_type: None,
            recoverable: false,
            suggested_action: None,
        }
    }

    fn for_error(err: &AppError, expose_details: bool) -> Self {
        let mut body = Self::new(err.client_message(), err.error_code());
        body.recoverable = err.is_recoverable();
        body.suggested_action = err.suggested_action().map(String::from);
        if expose_details && !err.is_sensitive() {
            body.details = Some(err.detailed_message());
            body.error_type = Some(err.error_type().to_string());
        }
        body
    }
}

/// `AppError` lives in the core crate, so `IntoResponse` is implemented on this newtype.
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(err.into())
    }
}

impl From<validator::ValidationErrors> for HttpAppError {
    fn from(err: validator::ValidationErrors) -> Self {
        HttpAppError(err.into())
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        HttpAppError(match err {
            StorageError::SigningFailed(msg) => AppError::Storage(msg),
            StorageError::InvalidKey(msg) => AppError::Internal(format!("Invalid key: {}", msg)),
            StorageError::ConfigError(msg) => AppError::Internal(msg),
        })
    }
}

impl From<JsonRejection> for HttpAppError {
    fn from(rejection: JsonRejection) -> Self {
        HttpAppError(AppError::InvalidInput(format!(
            "Invalid request body: {}",
            rejection.body_text()
        )))
    }
}

/// `Json<T>` whose rejection is a 400 [`ErrorResponse`] instead of axum's plain text.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(inner) = Json::<T>::from_request(req, state).await?;
        Ok(ValidatedJson(inner))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => tracing::debug!(error = %error, error_type, "Request failed"),
        LogLevel::Warn => tracing::warn!(error = %error, error_type, "Request failed"),
        LogLevel::Error => tracing::error!(
            error = %error,
            error_type,
            details = %error.detailed_message(),
            "Request failed"
        ),
    }
}

/// Read once; error bodies carry details only outside production.
static IS_PRODUCTION: LazyLock<bool> =
    LazyLock::new(|| is_production_from(|key| std::env::var(key).ok()));

/// `ENVIRONMENT`, then `APP_ENV`, skipping blank values the same way `Config` does.
fn is_production_from(lookup: impl Fn(&str) -> Option<String>) -> bool {
    ["ENVIRONMENT", "APP_ENV"]
        .iter()
        .find_map(|key| lookup(key).filter(|v| !v.trim().is_empty()))
        .is_some_and(|env| matches!(env.to_lowercase().as_str(), "production" | "prod"))
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        log_error(&self.0);

        let body = ErrorResponse::for_error(&self.0, !*IS_PRODUCTION);
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_upstream_error_is_generic_500() {
        let err = HttpAppError(AppError::Storage("SignatureDoesNotMatch on bucket x".into()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "STORAGE_ERROR");
        assert!(body.get("details").is_none());
        assert!(!body.to_string().contains("SignatureDoesNotMatch"));
    }

    #[tokio::test]
    async fn test_payload_too_large_maps_to_413() {
        let response =
            HttpAppError(AppError::PayloadTooLarge("Max size is 10 bytes".into())).into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Max size is 10 bytes");
    }

    #[test]
    fn test_production_detection_skips_blank_values() {
        type Vars = &'static [(&'static str, &'static str)];

        fn lookup(vars: Vars) -> impl Fn(&str) -> Option<String> {
            move |key| vars.iter().find(|(k, _)| *k == key).map(|(_, v)| v.to_string())
        }

        assert!(is_production_from(lookup(&[("ENVIRONMENT", "Production")])));
        assert!(is_production_from(lookup(&[("ENVIRONMENT", ""), ("APP_ENV", "prod")])));
        assert!(is_production_from(lookup(&[("ENVIRONMENT", "  "), ("APP_ENV", "prod")])));
        assert!(!is_production_from(lookup(&[("ENVIRONMENT", "staging"), ("APP_ENV", "prod")])));
        assert!(!is_production_from(lookup(&[])));
    }

    #[test]
    fn test_storage_error_conversion() {
        let HttpAppError(app) = StorageError::SigningFailed("boom".into()).into();
        assert_eq!(app.http_status_code(), 500);
        assert_eq!(app.error_code(), "STORAGE_ERROR");
    }
}
