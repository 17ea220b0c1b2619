//! Per-request CORS policy.
//!
//! The policy is a pure function of the caller's `Origin` header and the
//! configured allow-list. Allow-listed origins are echoed back with
//! credentials allowed; everything else gets a wildcard origin with
//! credentials refused. The two variants are the only states, so a
//! wildcard origin can never be paired with `allow-credentials: true`.

use std::collections::HashSet;

use axum::http::header::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_EXPOSE_HEADERS, ACCESS_CONTROL_MAX_AGE, VARY,
};
use axum::http::{HeaderMap, HeaderName, HeaderValue};

/// Methods advertised to preflight requests.
pub const PREFLIGHT_ALLOW_METHODS: &str = "GET,POST,PATCH,OPTIONS";

static EXPOSE_HEADERS: HeaderValue = HeaderValue::from_static("content-type");
static WILDCARD: HeaderValue = HeaderValue::from_static("*");

/// Exact-match set of origins that may receive credentialed responses.
#[derive(Debug, Clone, Default)]
pub struct AllowedOrigins {
    origins: HashSet<String>,
}

impl AllowedOrigins {
    pub fn new<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            origins: origins.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, origin: &str) -> bool {
        self.origins.contains(origin)
    }

    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }

    pub fn len(&self) -> usize {
        self.origins.len()
    }
}

/// CORS decision for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsPolicy {
    /// Origin is allow-listed: echo it, allow credentials, vary on origin.
    Credentialed { origin: HeaderValue },
    /// Origin absent or unknown: wildcard origin, no credentials.
    Open,
}

impl CorsPolicy {
    /// Decide the policy for a caller's `Origin` header.
    ///
    /// Empty, non-UTF-8 and unlisted origins all fall back to [`CorsPolicy::Open`].
    pub fn for_origin(origin: Option<&HeaderValue>, allowed: &AllowedOrigins) -> Self {
        let Some(value) = origin else {
            return CorsPolicy::Open;
        };
        match value.to_str() {
            Ok(s) if !s.is_empty() && allowed.contains(s) => CorsPolicy::Credentialed {
                origin: value.clone(),
            },
            _ => CorsPolicy::Open,
        }
    }

    pub fn allows_credentials(&self) -> bool {
        matches!(self, CorsPolicy::Credentialed { .. })
    }

    pub fn allow_origin(&self) -> &HeaderValue {
        match self {
            CorsPolicy::Credentialed { origin } => origin,
            CorsPolicy::Open => &WILDCARD,
        }
    }

    /// Write this policy's headers, overwriting any existing CORS values.
    ///
    /// `Vary: origin` is merged into an existing `Vary` rather than replacing it.
    pub fn apply(&self, headers: &mut HeaderMap) {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, self.allow_origin().clone());
        headers.insert(ACCESS_CONTROL_EXPOSE_HEADERS, EXPOSE_HEADERS.clone());
        headers.insert(
            ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static(if self.allows_credentials() { "true" } else { "false" }),
        );
        if self.allows_credentials() {
            add_vary_origin(headers);
        }
    }

    /// Full header set for a preflight (OPTIONS) response.
    pub fn preflight_headers(&self, credential_header: &HeaderName, max_age_secs: u64) -> HeaderMap {
        let mut headers = HeaderMap::new();
        self.apply(&mut headers);
        headers.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(PREFLIGHT_ALLOW_METHODS),
        );
        // Header names are token characters, so this is always a valid value.
        if let Ok(allow) = HeaderValue::from_str(&format!("content-type,{}", credential_header)) {
            headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, allow);
        }
        headers.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from(max_age_secs));
        headers
    }
}

fn add_vary_origin(headers: &mut HeaderMap) {
    let already_listed = headers
        .get_all(VARY)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .any(|token| token == "*" || token.eq_ignore_ascii_case("origin"));
    if !already_listed {
        headers.append(VARY, HeaderValue::from_static("origin"));
    }
}
