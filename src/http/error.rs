//! Relay error taxonomy.

use std::time::Duration;

use axum::http::uri::InvalidUri;
use axum::http::StatusCode;
use thiserror::Error;

/// Failures the relay answers for itself. Upstream error statuses are not
/// errors here; they are relayed verbatim.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Connection refused, DNS failure, reset, TLS failure.
    #[error("upstream request failed: {0}")]
    Upstream(#[source] hyper_util::client::legacy::Error),

    /// No response headers within the configured window.
    #[error("upstream did not respond within {0:?}")]
    Timeout(Duration),

    #[error("request body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },

    #[error("failed to read request body: {0}")]
    Body(#[source] axum::Error),

    #[error("cannot build upstream URI: {0}")]
    Target(#[from] axum::http::Error),
}

impl RelayError {
    /// Status code returned to the caller. The body is always empty.
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::Upstream(e) if timed_out(e) => StatusCode::GATEWAY_TIMEOUT,
            RelayError::Upstream(_) => StatusCode::BAD_GATEWAY,
            RelayError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            RelayError::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            RelayError::Body(_) | RelayError::Target(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::Upstream(e) if timed_out(e) => "timeout",
            RelayError::Upstream(e) if e.is_connect() => "connect",
            RelayError::Upstream(_) => "network",
            RelayError::Timeout(_) => "timeout",
            RelayError::BodyTooLarge { .. } => "body_too_large",
            RelayError::Body(_) => "body",
            RelayError::Target(_) => "target",
        }
    }
}

/// Connect timeouts surface as an `io::Error` somewhere in the source chain.
fn timed_out(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut source = Some(err);
    while let Some(e) = source {
        if let Some(io) = e.downcast_ref::<std::io::Error>() {
            if io.kind() == std::io::ErrorKind::TimedOut {
                return true;
            }
        }
        source = e.source();
    }
    false
}

/// Failures while assembling the relay at startup.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("invalid upstream base URL: {0}")]
    UpstreamUrl(#[from] url::ParseError),

    #[error("upstream base URL has no host")]
    MissingHost,

    #[error("invalid header in config: {0}")]
    Header(String),

    #[error("invalid upstream authority: {0}")]
    Uri(#[from] InvalidUri),
}
