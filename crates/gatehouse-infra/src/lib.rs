//! Gatehouse Infrastructure Library
//!
//! Request-gatekeeping middleware shared by the HTTP surface:
//! - Trust policy (allowed origins and hosts)
//! - CSRF token manager (double-submit cookie)
//! - CORS responder
//! - Origin/CSRF guard
//! - Request ID and security headers
//! - Telemetry initialization

pub mod middleware;
pub mod telemetry;

// Re-export commonly used types
pub use middleware::{
    origin_csrf_middleware, request_id_middleware, security_headers_middleware, CsrfToken,
    GuardRejection, RequestId, SecurityHeadersConfig, TrustPolicy,
};
pub use telemetry::init_telemetry;
