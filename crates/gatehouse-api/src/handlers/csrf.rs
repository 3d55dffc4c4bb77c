use axum::{Extension, Json};
use gatehouse_infra::CsrfToken;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct CsrfTokenResponse {
    pub token: String,
}

/// Return the CSRF token in effect for this request.
///
/// Same value as the `csrf` cookie (existing or just issued), for clients that cannot
/// read cookies from script.
pub async fn get_csrf_token(
    Extension(CsrfToken(token)): Extension<CsrfToken>,
) -> Json<CsrfTokenResponse> {
    Json(CsrfTokenResponse { token })
}
