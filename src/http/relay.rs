//! The relay handler.
//!
//! One call per inbound request:
//!
//! ```text
//! OPTIONS  → CORS policy → 204 preflight (upstream never contacted)
//! other    → CORS policy → forward headers → buffer body → upstream
//!          → strip Set-Cookie → apply CORS → stream body back
//! ```

use std::time::Instant;

use axum::body::Body;
use axum::http::header::ORIGIN;
use axum::http::{HeaderName, Method, Request};
use axum::response::Response;

use crate::config::RelayConfig;
use crate::http::client::UpstreamClient;
use crate::http::error::{RelayError, SetupError};
use crate::http::request::{forward_headers, ForwardedRequest};
use crate::http::response::{error_response, preflight_response, relay_response};
use crate::observability::metrics;
use crate::security::cors::{AllowedOrigins, CorsPolicy};
use crate::security::limits::{carries_body, read_body};

/// Immutable relay built once from the validated config.
#[derive(Debug, Clone)]
pub struct Relay {
    upstream: UpstreamClient,
    allowed_origins: AllowedOrigins,
    credential_header: HeaderName,
    preflight_max_age_secs: u64,
    max_body_size: usize,
}

impl Relay {
    pub fn new(config: &RelayConfig) -> Result<Self, SetupError> {
        let credential_header = HeaderName::from_bytes(config.cors.credential_header.as_bytes())
            .map_err(|e| SetupError::Header(e.to_string()))?;
        let allowed_origins = AllowedOrigins::new(config.cors.allowed_origins.iter().cloned());

        if allowed_origins.is_empty() {
            tracing::warn!("No allowed origins configured; every response uses the open CORS policy");
        } else {
            tracing::info!(allowed_origins = allowed_origins.len(), "Credentialed CORS enabled");
        }

        Ok(Self {
            upstream: UpstreamClient::new(&config.upstream)?,
            allowed_origins,
            credential_header,
            preflight_max_age_secs: config.cors.preflight_max_age_secs,
            max_body_size: config.security.max_body_size,
        })
    }

    /// Handle one inbound request.
    pub async fn handle(&self, request: Request<Body>) -> Response {
        let start = Instant::now();
        let method = request.method().clone();
        let policy = CorsPolicy::for_origin(request.headers().get(ORIGIN), &self.allowed_origins);

        if method == Method::OPTIONS {
            tracing::debug!(
                credentialed = policy.allows_credentials(),
                "Answering preflight"
            );
            let response =
                preflight_response(&policy, &self.credential_header, self.preflight_max_age_secs);
            metrics::record_request(method.as_str(), response.status().as_u16(), start);
            return response;
        }

        let response = match self.forward(request, &policy).await {
            Ok(response) => response,
            Err(err) => {
                let status = err.status();
                if status.is_server_error() {
                    tracing::warn!(error = %err, status = status.as_u16(), "Upstream call failed");
                } else {
                    tracing::debug!(error = %err, status = status.as_u16(), "Rejected request");
                }
                metrics::record_relay_error(err.kind());
                error_response(status, &policy)
            }
        };

        metrics::record_request(method.as_str(), response.status().as_u16(), start);
        response
    }

    async fn forward(
        &self,
        request: Request<Body>,
        policy: &CorsPolicy,
    ) -> Result<Response, RelayError> {
        let (parts, body) = request.into_parts();

        let uri = self.upstream.target_uri(&parts.uri)?;
        let headers = forward_headers(
            &parts.method,
            parts.headers,
            &self.credential_header,
            self.upstream.host(),
        );
        let body = if carries_body(&parts.method) {
            Some(read_body(body, self.max_body_size).await?)
        } else {
            None
        };

        let forwarded = ForwardedRequest {
            method: parts.method,
            uri,
            headers,
            body,
        };

        tracing::debug!(
            method = %forwarded.method,
            path = forwarded.uri.path(),
            credential = forwarded.has_cookie(),
            body_len = forwarded.body.as_ref().map_or(0, |b| b.len()),
            "Forwarding to upstream"
        );

        let upstream = self.upstream.send(forwarded).await?;

        tracing::debug!(status = upstream.status().as_u16(), "Upstream responded");

        Ok(relay_response(upstream, policy))
    }
}
