//! Gatehouse Storage Library
//!
//! Object-storage abstraction used by the upload admission flow. The gatekeeper never
//! receives file bytes: it only issues time-limited presigned PUT URLs that let the
//! client upload directly to the bucket.
//!
//! # Storage key format
//!
//! Every uploaded original lives at `jobs/{user_id}/{job_id}/original.{ext}`. The user id
//! namespaces tenants and the store-assigned job id makes each key unique. Key derivation
//! is centralized in the `keys` module.

pub mod keys;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use keys::{extension, job_storage_key, sanitize_filename};
#[cfg(feature = "storage-s3")]
pub use s3::S3ObjectStore;
pub use traits::{ObjectStore, StorageError, StorageResult};
