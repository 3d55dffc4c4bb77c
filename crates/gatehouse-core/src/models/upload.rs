use crate::error::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Number;
use uuid::Uuid;
use validator::Validate;

/// Request for a presigned upload URL
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrlRequest {
    /// Original filename as chosen by the user
    #[validate(length(min = 1, message = "Filename must not be empty"))]
    pub filename: String,
    /// MIME type the client will send with the PUT
    #[validate(length(min = 1, message = "Content type must not be empty"))]
    pub content_type: String,
    /// Declared object size. Any JSON number is accepted here (`3e9`, or integers past
    /// `u64::MAX`); [`UploadUrlRequest::checked_size`] decides whether it is usable.
    pub bytes: Number,
}

impl UploadUrlRequest {
    /// Declared size in bytes, once it is known to be a positive whole number within
    /// `max_bytes`.
    ///
    /// Anything that is not a positive whole number is `InvalidInput`; a whole number over
    /// the ceiling is `PayloadTooLarge`, however it was written.
    pub fn checked_size(&self, max_bytes: u64) -> Result<u64, AppError> {
        let too_large = || AppError::PayloadTooLarge(format!("Max size is {} bytes", max_bytes));
        let invalid =
            || AppError::InvalidInput("Size must be a positive whole number of bytes".to_string());

        if let Some(bytes) = self.bytes.as_u64() {
            return match bytes {
                0 => Err(invalid()),
                b if b > max_bytes => Err(too_large()),
                b => Ok(b),
            };
        }

        match self.bytes.as_f64() {
            Some(v) if v.is_finite() && v > 0.0 && v.fract() == 0.0 => {
                if v > max_bytes as f64 {
                    Err(too_large())
                } else {
                    Ok(v as u64)
                }
            }
            _ => Err(invalid()),
        }
    }
}

/// Presigned upload grant
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrlResponse {
    pub success: bool,
    pub job_id: Uuid,
    pub key: String,
    pub upload_url: String,
    pub expires_at: DateTime<Utc>,
}
