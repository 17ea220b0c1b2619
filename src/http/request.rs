//! Request handling and transformation.
//!
//! # Responsibilities
//! - Translate the caller's credential header into a real `Cookie`
//! - Remove headers that must not cross to the upstream
//! - Point `Host` at the upstream and default the JSON content type
//!
//! # Design Decisions
//! - The credential value is copied as opaque bytes and marked sensitive;
//!   it is never parsed or converted to a string
//! - Path and query are copied verbatim; no route interpretation

use axum::body::Bytes;
use axum::http::header::{CONTENT_TYPE, COOKIE, HOST};
use axum::http::header::Entry;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, Uri};

use crate::security::headers::{strip_caller_context, strip_hop_by_hop};

/// A request ready to send upstream.
pub struct ForwardedRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

impl ForwardedRequest {
    pub fn has_cookie(&self) -> bool {
        self.headers.contains_key(COOKIE)
    }
}

// Header values are left out so a stray `{:?}` can never print a credential.
impl std::fmt::Debug for ForwardedRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForwardedRequest")
            .field("method", &self.method)
            .field("uri", &self.uri)
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .field("body_len", &self.body.as_ref().map(Bytes::len))
            .finish()
    }
}

/// Build the upstream header set from the caller's headers.
///
/// Returns the new headers; `inbound` is consumed so the credential value
/// moves into the `Cookie` header without being copied elsewhere.
pub fn forward_headers(
    method: &Method,
    mut inbound: HeaderMap,
    credential_header: &HeaderName,
    upstream_host: &HeaderValue,
) -> HeaderMap {
    let credential = take_credential(&mut inbound, credential_header);

    strip_hop_by_hop(&mut inbound);
    strip_caller_context(&mut inbound);

    if let Some(mut cookie) = credential.filter(|v| !v.is_empty()) {
        cookie.set_sensitive(true);
        inbound.insert(COOKIE, cookie);
    }

    inbound.insert(HOST, upstream_host.clone());

    if (*method == Method::POST || *method == Method::PATCH) && !inbound.contains_key(CONTENT_TYPE)
    {
        inbound.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }

    inbound
}

/// Remove every line of the credential header. Repeated lines are joined
/// with `", "` into one value, the way a fetch `Headers` lookup combines them.
fn take_credential(headers: &mut HeaderMap, name: &HeaderName) -> Option<HeaderValue> {
    let Entry::Occupied(entry) = headers.entry(name) else {
        return None;
    };
    let mut values = entry.remove_entry_mult().1;
    let first = values.next()?;

    let mut joined = first.as_bytes().to_vec();
    let mut repeated = false;
    for value in values {
        joined.extend_from_slice(b", ");
        joined.extend_from_slice(value.as_bytes());
        repeated = true;
    }
    if !repeated {
        return Some(first);
    }
    HeaderValue::from_bytes(&joined).ok()
}
