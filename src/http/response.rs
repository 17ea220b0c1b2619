//! Response handling and transformation.
//!
//! # Responsibilities
//! - Transform the upstream response for the caller
//! - Remove `Set-Cookie` and hop-by-hop headers, apply CORS headers
//! - Build preflight and relay-generated error responses
//!
//! # Design Decisions
//! - Streaming responses avoid buffering entire body
//! - Upstream status and body pass through untouched, errors included
//! - Relay-generated failures carry CORS headers and an empty body

use axum::body::{Body, Bytes, HttpBody};
use axum::http::{HeaderMap, HeaderName, StatusCode};
use axum::response::Response;
use axum::BoxError;

use crate::security::cors::CorsPolicy;
use crate::security::headers::{strip_hop_by_hop, strip_set_cookie};

/// Turn an upstream response into the response sent to the caller.
pub fn relay_response<B>(upstream: axum::http::Response<B>, policy: &CorsPolicy) -> Response
where
    B: HttpBody<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
{
    let (mut parts, body) = upstream.into_parts();

    strip_set_cookie(&mut parts.headers);
    strip_hop_by_hop(&mut parts.headers);
    policy.apply(&mut parts.headers);

    let mut response = Response::new(Body::new(body));
    *response.status_mut() = parts.status;
    *response.headers_mut() = parts.headers;
    response
}

/// 204 answer to a CORS preflight.
pub fn preflight_response(
    policy: &CorsPolicy,
    credential_header: &HeaderName,
    max_age_secs: u64,
) -> Response {
    with_headers(
        StatusCode::NO_CONTENT,
        policy.preflight_headers(credential_header, max_age_secs),
    )
}

/// Empty-bodied failure response with CORS headers applied.
pub fn error_response(status: StatusCode, policy: &CorsPolicy) -> Response {
    let mut headers = HeaderMap::new();
    policy.apply(&mut headers);
    with_headers(status, headers)
}

fn with_headers(status: StatusCode, headers: HeaderMap) -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}
