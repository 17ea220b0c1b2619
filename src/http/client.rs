//! Upstream HTTP client.
//!
//! # Responsibilities
//! - Hold the single upstream origin and the `Host` value derived from it
//! - Send forwarded requests without following redirects
//! - Enforce connect and response-header timeouts
//!
//! # Design Decisions
//! - The target is assembled from `http::Uri` parts, so the inbound path and
//!   query reach the upstream byte-for-byte (no dot-segment resolution, no
//!   re-encoding)
//! - No cookie store: the caller owns the credential, the relay never keeps one
//! - The timeout covers the wait for response headers only, so a streamed
//!   body is never cut off part-way

use std::time::Duration;

use axum::body::Bytes;
use axum::http::uri::{Authority, PathAndQuery, Scheme};
use axum::http::{HeaderValue, Request, Response, Uri};
use http_body_util::Full;
use hyper::body::Incoming;
use hyper_rustls::builderstates::WantsSchemes;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use url::Url;

use crate::config::UpstreamConfig;
use crate::http::error::{RelayError, SetupError};
use crate::http::request::ForwardedRequest;

/// Response as it arrives from the upstream, body still unread.
pub type UpstreamResponse = Response<Incoming>;

/// Client bound to the one upstream origin.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    inner: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
    scheme: Scheme,
    authority: Authority,
    host: HeaderValue,
    timeout: Option<Duration>,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, SetupError> {
        let base = Url::parse(&config.base_url)?;
        let host = base.host_str().ok_or(SetupError::MissingHost)?;
        let authority: Authority = match base.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        }
        .parse()?;
        let scheme: Scheme = base.scheme().parse()?;
        let host = HeaderValue::from_str(authority.as_str())
            .map_err(|e| SetupError::Header(e.to_string()))?;

        let mut http = HttpConnector::new();
        http.enforce_http(false);
        http.set_nodelay(true);
        http.set_connect_timeout(Some(Duration::from_secs(config.connect_timeout_secs)));

        let connector = tls_roots().https_or_http().enable_http1().wrap_connector(http);

        // hyper never follows redirects; 3xx responses come back as-is.
        let inner = Client::builder(TokioExecutor::new()).build(connector);

        Ok(Self {
            inner,
            scheme,
            authority,
            host,
            timeout: config.request_timeout_secs.map(Duration::from_secs),
        })
    }

    /// Value for the forwarded `Host` header.
    pub fn host(&self) -> &HeaderValue {
        &self.host
    }

    /// Upstream origin followed by the inbound path and query, unmodified.
    pub fn target_uri(&self, inbound: &Uri) -> Result<Uri, RelayError> {
        let path_and_query = inbound
            .path_and_query()
            .cloned()
            .unwrap_or_else(|| PathAndQuery::from_static("/"));

        Ok(Uri::builder()
            .scheme(self.scheme.clone())
            .authority(self.authority.clone())
            .path_and_query(path_and_query)
            .build()?)
    }

    /// Issue one request. No retries.
    pub async fn send(&self, forwarded: ForwardedRequest) -> Result<UpstreamResponse, RelayError> {
        let mut request = Request::new(Full::new(forwarded.body.unwrap_or_default()));
        *request.method_mut() = forwarded.method;
        *request.uri_mut() = forwarded.uri;
        *request.headers_mut() = forwarded.headers;

        let pending = self.inner.request(request);
        let result = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, pending)
                .await
                .map_err(|_| RelayError::Timeout(limit))?,
            None => pending.await,
        };
        result.map_err(RelayError::Upstream)
    }
}

/// Platform CA roots. Without any, HTTPS upstream calls fail verification
/// and surface as 502s, while a plain-HTTP upstream keeps working.
fn tls_roots() -> HttpsConnectorBuilder<WantsSchemes> {
    match HttpsConnectorBuilder::new().with_native_roots() {
        Ok(builder) => builder,
        Err(e) => {
            tracing::warn!(error = %e, "No platform CA certificates loaded");
            HttpsConnectorBuilder::new().with_tls_config(
                rustls::ClientConfig::builder()
                    .with_root_certificates(rustls::RootCertStore::empty())
                    .with_no_client_auth(),
            )
        }
    }
}
