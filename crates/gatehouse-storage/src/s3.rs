//! S3-compatible object store (AWS S3, Cloudflare R2, MinIO)

use crate::traits::{ObjectStore, StorageError, StorageResult};
use async_trait::async_trait;
use http::Method;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::signer::Signer;
use std::time::Duration;

#[derive(Clone)]
pub struct S3ObjectStore {
    store: AmazonS3,
    bucket: String,
}

impl S3ObjectStore {
    /// Build a signer for `bucket`. Credentials come from the standard `AWS_*` variables.
    pub fn new(bucket: String, region: String, endpoint: Option<String>) -> StorageResult<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region)
            .with_bucket_name(bucket.clone());

        if let Some(endpoint) = endpoint {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint)
                .with_virtual_hosted_style_request(false)
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(format!("Failed to build S3 client: {}", e)))?;

        tracing::info!(bucket = %bucket, "S3 object store initialized");

        Ok(Self { store, bucket })
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    #[tracing::instrument(skip(self), fields(s3.bucket = %self.bucket, s3.key = %key))]
    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        if key.is_empty() || key.starts_with('/') || key.split('/').any(|part| part == "..") {
            return Err(StorageError::InvalidKey(key.to_string()));
        }

        let location = Path::from(key);
        // The signature covers method, key and expiry; the client still sends its
        // Content-Type with the PUT.
        let url = self
            .store
            .signed_url(Method::PUT, &location, expires_in)
            .await
            .map_err(|e| StorageError::SigningFailed(e.to_string()))?;

        tracing::debug!(
            expires_in_seconds = expires_in.as_secs(),
            content_type = %content_type,
            "Generated presigned PUT URL"
        );

        Ok(url.to_string())
    }
}
