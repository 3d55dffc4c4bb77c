//! Request correlation ids

use axum::http::{HeaderName, HeaderValue};
use axum::{extract::Request, middleware::Next, response::Response};
use tracing::Instrument;
use uuid::Uuid;

static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");
const MAX_INBOUND_LEN: usize = 128;

/// Correlation id of the current request, stored in request extensions.
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

/// Caller-supplied id, if it is visible ASCII and reasonably short.
fn inbound_request_id(request: &Request) -> Option<String> {
    let value = request.headers().get(&REQUEST_ID_HEADER)?.to_str().ok()?;
    (!value.is_empty() && value.len() <= MAX_INBOUND_LEN).then(|| value.to_string())
}

/// Reuse or mint an `X-Request-ID`, run the rest of the pipeline inside a span carrying
/// it, and echo it on the response.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = inbound_request_id(&request).unwrap_or_else(|| Uuid::new_v4().to_string());
    request
        .extensions_mut()
        .insert(RequestId(request_id.clone()));

    let span = tracing::info_span!("request", request_id = %request_id);
    let mut response = next.run(request).instrument(span).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response
            .headers_mut()
            .insert(REQUEST_ID_HEADER.clone(), value);
    }
    response
}
