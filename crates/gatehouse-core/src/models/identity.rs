use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Authenticated user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

/// Session read from the request cookies.
///
/// A `Session` obtained from a cookie read is only a claim. It must go through
/// the identity provider's validating call before it is used for authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub user_id: Uuid,
    pub expires_at: Option<i64>,
}
