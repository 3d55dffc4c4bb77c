//! Storage abstraction trait

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to sign URL: {0}")]
    SigningFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Object store capable of issuing presigned uploads.
///
/// Implementations sign locally; issuing a URL never touches the object itself.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Bucket the presigned URLs point into.
    fn bucket(&self) -> &str;

    /// Presign a PUT of `key` valid for `expires_in`.
    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> StorageResult<String>;
}
