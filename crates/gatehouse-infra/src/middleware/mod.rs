//! Shared HTTP middleware for the gatekeeper pipeline

pub mod cors;
pub mod csrf;
pub mod origin_guard;
pub mod request_id;
pub mod security_headers;
pub mod trust;

pub use cors::{apply_cors_headers, build_cors_headers};
pub use csrf::{ensure_token, generate_token, verify_token, CsrfToken, EnsuredToken};
pub use origin_guard::{origin_csrf_middleware, GuardRejection};
pub use request_id::{request_id_middleware, RequestId};
pub use security_headers::{security_headers_middleware, SecurityHeadersConfig};
pub use trust::TrustPolicy;
