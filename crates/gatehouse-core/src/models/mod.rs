//! Data models for the application
//!
//! Identity records, upload jobs and the request/response bodies of the API routes.

mod identity;
mod join;
mod upload;
mod upload_job;

pub use identity::*;
pub use join::*;
pub use upload::*;
pub use upload_job::*;
