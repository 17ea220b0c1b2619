//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{
        header::{ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE, LOCATION, SET_COOKIE, VARY},
        HeaderMap, Method, Request, StatusCode,
    },
    response::{IntoResponse, Response},
    Router,
};
use cookie_relay::config::RelayConfig;
use cookie_relay::http::HttpServer;
use cookie_relay::lifecycle::Shutdown;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// One request as the upstream saw it.
#[derive(Debug, Clone)]
pub struct Captured {
    pub method: Method,
    pub uri: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

type Log = Arc<Mutex<Vec<Captured>>>;

/// A mock upstream that records every request it receives.
///
/// - `/redirect` answers 302 with a `Location`
/// - `/unauthorized` answers 401 with a JSON error and a `Set-Cookie`
/// - `/slow` answers after three seconds
/// - anything else answers 200 with JSON, a `Set-Cookie` and its own CORS header
pub struct MockUpstream {
    pub addr: SocketAddr,
    log: Log,
}

impl MockUpstream {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<Captured> {
        self.log.lock().unwrap().clone()
    }

    pub fn only_request(&self) -> Captured {
        let requests = self.requests();
        assert_eq!(requests.len(), 1, "expected exactly one upstream request");
        requests.into_iter().next().unwrap()
    }
}

pub const UPSTREAM_JSON: &str = r#"{"buckets":[{"node_id":1,"price":"9.99"}],"pagination":{"total":1}}"#;
pub const UNAUTHORIZED_JSON: &str = r#"{"error":"not_authenticated"}"#;

pub async fn start_recording_upstream() -> MockUpstream {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let log: Log = Arc::new(Mutex::new(Vec::new()));

    let app = Router::new().fallback(record).with_state(log.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockUpstream { addr, log }
}

async fn record(State(log): State<Log>, request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    let path = parts.uri.path().to_string();

    log.lock().unwrap().push(Captured {
        method: parts.method,
        uri: parts.uri.to_string(),
        headers: parts.headers,
        body,
    });

    match path.as_str() {
        "/redirect" => (
            StatusCode::FOUND,
            [(LOCATION, "https://upstream.example/login")],
        )
            .into_response(),
        "/unauthorized" => (
            StatusCode::UNAUTHORIZED,
            [
                (CONTENT_TYPE, "application/json"),
                (SET_COOKIE, "session=; Max-Age=0"),
            ],
            UNAUTHORIZED_JSON,
        )
            .into_response(),
        "/slow" => {
            tokio::time::sleep(Duration::from_secs(3)).await;
            "late".into_response()
        }
        _ => (
            StatusCode::OK,
            [
                (CONTENT_TYPE, "application/json"),
                (SET_COOKIE, "tracking=1; Path=/"),
                (ACCESS_CONTROL_ALLOW_ORIGIN, "https://upstream.example"),
                (VARY, "accept-encoding"),
            ],
            UPSTREAM_JSON,
        )
            .into_response(),
    }
}

/// A running relay. Dropping it shuts the server down.
pub struct TestRelay {
    pub addr: SocketAddr,
    _shutdown: Shutdown,
}

impl TestRelay {
    pub fn url(&self, path_and_query: &str) -> String {
        format!("http://{}{}", self.addr, path_and_query)
    }
}

pub const ALLOWED_ORIGIN: &str = "https://app.example.com";

/// Start a relay pointed at `upstream_base` with `ALLOWED_ORIGIN` allow-listed.
pub async fn start_relay<F>(upstream_base: &str, customize: F) -> TestRelay
where
    F: FnOnce(&mut RelayConfig),
{
    let mut config = RelayConfig::default();
    config.upstream.base_url = upstream_base.to_string();
    config.cors.allowed_origins = vec![ALLOWED_ORIGIN.to_string()];
    customize(&mut config);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    config.listener.bind_address = addr.to_string();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config).unwrap();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestRelay {
        addr,
        _shutdown: shutdown,
    }
}

/// Client that neither follows redirects nor uses environment proxies.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

/// An address nothing is listening on.
pub async fn closed_address() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Send a GET with `target` written to the wire exactly as given and return
/// the raw response text. HTTP clients rewrite targets; this does not.
pub async fn raw_get(addr: SocketAddr, target: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!("GET {target} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    String::from_utf8_lossy(&response).into_owned()
}
