//! Database repositories for data access layer
//
// Upload jobs (provisional rows created before a presigned URL is issued)
pub mod jobs;
