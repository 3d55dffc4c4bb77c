//! Error types module
//!
//! Fallible operations behind the gatekeeper report an [`AppError`]. Each variant knows
//! how it is presented over HTTP through [`ErrorMetadata`]: upstream failures (database,
//! object storage) surface as a generic 500, caller mistakes keep their message.
//!
//! The `Database` variant and `From<sqlx::Error>` are gated behind the `sqlx` feature.

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Expected errors like validation failures
    Debug,
    Warn,
    /// Unexpected upstream failures
    Error,
}

/// How an error is presented to the caller and to the logs
pub trait ErrorMetadata {
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g. `PAYLOAD_TOO_LARGE`)
    fn error_code(&self) -> &'static str;

    /// Whether retrying the same request may succeed
    fn is_recoverable(&self) -> bool;

    fn suggested_action(&self) -> Option<&'static str>;

    /// Message safe to show the caller
    fn client_message(&self) -> String;

    /// Whether internal text must never reach the caller
    fn is_sensitive(&self) -> bool;

    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error: {message}")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::InvalidInput(format!("Validation error: {}", err))
    }
}

/// Presentation shared by a group of variants.
struct Presentation {
    status: u16,
    code: &'static str,
    recoverable: bool,
    action: Option<&'static str>,
    sensitive: bool,
    level: LogLevel,
}

const RETRY_LATER: Option<&str> = Some("Retry after a short delay");

impl Presentation {
    const fn upstream(code: &'static str) -> Self {
        Self {
            status: 500,
            code,
            recoverable: true,
            action: RETRY_LATER,
            sensitive: true,
            level: LogLevel::Error,
        }
    }

    const fn caller(status: u16, code: &'static str, action: &'static str) -> Self {
        Self {
            status,
            code,
            recoverable: false,
            action: Some(action),
            sensitive: false,
            level: LogLevel::Debug,
        }
    }
}

impl AppError {
    fn presentation(&self) -> Presentation {
        match self {
            AppError::Database(_) => Presentation::upstream("DATABASE_ERROR"),
            AppError::Storage(_) => Presentation::upstream("STORAGE_ERROR"),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                Presentation::upstream("INTERNAL_ERROR")
            }
            AppError::InvalidInput(_) => Presentation::caller(
                400,
                "INVALID_INPUT",
                "Check request parameters and try again",
            ),
            AppError::PayloadTooLarge(_) => {
                Presentation::caller(413, "PAYLOAD_TOO_LARGE", "Reduce file size")
            }
            AppError::Unauthorized(_) => {
                Presentation::caller(401, "UNAUTHORIZED", "Sign in and try again")
            }
        }
    }

    /// Variant name, shown in non-production error bodies
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::Database(_) => "Database",
            AppError::Storage(_) => "Storage",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::Internal(_) | AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Display text followed by up to five levels of `source()` causes.
    pub fn detailed_message(&self) -> String {
        const MAX_DEPTH: usize = 5;

        let mut details = self.to_string();
        let causes: Vec<_> = std::iter::successors(std::error::Error::source(self), |e| e.source())
            .take(MAX_DEPTH + 1)
            .collect();

        for (depth, cause) in causes.iter().enumerate() {
            if depth == MAX_DEPTH {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", cause));
        }
        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        self.presentation().status
    }

    fn error_code(&self) -> &'static str {
        self.presentation().code
    }

    fn is_recoverable(&self) -> bool {
        self.presentation().recoverable
    }

    fn suggested_action(&self) -> Option<&'static str> {
        self.presentation().action
    }

    fn is_sensitive(&self) -> bool {
        self.presentation().sensitive
    }

    fn log_level(&self) -> LogLevel {
        self.presentation().level
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Database(_) => "Failed to access database".to_string(),
            AppError::Storage(_) => "Failed to access storage".to_string(),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Internal server error".to_string()
            }
            AppError::InvalidInput(msg)
            | AppError::PayloadTooLarge(msg)
            | AppError::Unauthorized(msg) => msg.clone(),
        }
    }
}
