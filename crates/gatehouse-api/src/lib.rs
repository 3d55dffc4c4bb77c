//! Gatehouse API Library
//!
//! HTTP surface of the request gatekeeper: identity provider integration, session
//! resolution, route authorization, the sign-up and upload admission handlers, and
//! application setup.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod setup;
pub mod state;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use setup::routes::build_router;
pub use state::{AppState, UploadConfig};
