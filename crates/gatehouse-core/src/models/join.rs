use serde::{Deserialize, Serialize};

/// Sign-up request body. Both fields are optional so that missing values are
/// reported with the join-specific error codes rather than a parse failure.
#[derive(Debug, Default, Deserialize)]
pub struct JoinRequest {
    #[serde(default)]
    pub email: Option<serde_json::Value>,
    #[serde(default)]
    pub password: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct JoinResponse {
    pub success: bool,
    pub message: String,
}
