//! Application-wide constants.

/// Name of the anti-forgery cookie mirrored into [`CSRF_HEADER`].
pub const CSRF_COOKIE: &str = "csrf";

/// Header that must echo the CSRF cookie on state-changing requests.
pub const CSRF_HEADER: &str = "x-csrf-token";

/// CSRF cookie lifetime (7 days).
pub const CSRF_COOKIE_MAX_AGE_SECS: i64 = 60 * 60 * 24 * 7;

/// Prefix that receives CORS response headers.
pub const CORS_PATH_PREFIX: &str = "/api";

/// Prefix of API routes subject to session enforcement.
pub const API_PREFIX: &str = "/api/";

/// Sign-in page anonymous visitors of private pages are sent to.
pub const LOGIN_PATH: &str = "/auth/login";

/// Default page for signed-in users.
pub const LANDING_PATH: &str = "/explore";

/// Default upload ceiling (2 GiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 2 * 1024 * 1024 * 1024;

/// Default lifetime of presigned upload URLs (10 minutes).
pub const DEFAULT_UPLOAD_URL_TTL_SECS: u64 = 60 * 10;

/// Storage key written at job creation, before the real key is known.
pub const PLACEHOLDER_STORAGE_KEY: &str = "pending";
