//! Header filtering at the relay boundary.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers in both directions
//! - Drop browser-context headers (`Origin`, `Referer`) before forwarding
//! - Drop inbound `Cookie`; the credential header is the only cookie channel
//! - Drop `Set-Cookie` from upstream responses
//!
//! # Design Decisions
//! - Headers named in `Connection` are treated as hop-by-hop too
//! - Filtering never inspects credential values

use axum::http::header::{
    CONNECTION, CONTENT_LENGTH, COOKIE, ORIGIN, PROXY_AUTHORIZATION, REFERER, SET_COOKIE, TE,
    TRAILER, TRANSFER_ENCODING, UPGRADE,
};
use axum::http::{HeaderMap, HeaderName};

/// Hop-by-hop headers (RFC 9110 §7.6.1 plus legacy names).
const HOP_BY_HOP: &[&str] = &["keep-alive", "proxy-connection"];

/// Remove hop-by-hop headers, including any listed in `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|token| HeaderName::from_bytes(token.trim().as_bytes()).ok())
        .collect();
    for name in listed {
        headers.remove(name);
    }

    for name in [CONNECTION, TE, TRAILER, TRANSFER_ENCODING, UPGRADE, PROXY_AUTHORIZATION] {
        headers.remove(name);
    }
    for name in HOP_BY_HOP {
        headers.remove(*name);
    }
}

/// Remove headers that describe the caller's browser context or would be
/// recomputed for the upstream hop.
pub fn strip_caller_context(headers: &mut HeaderMap) {
    headers.remove(ORIGIN);
    headers.remove(REFERER);
    headers.remove(COOKIE);
    headers.remove(CONTENT_LENGTH);
}

/// Remove every `Set-Cookie` line from an upstream response.
pub fn strip_set_cookie(headers: &mut HeaderMap) {
    headers.remove(SET_COOKIE);
}
