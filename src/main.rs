//! Cookie relay
//!
//! ```text
//!     Browser UI                        cookie-relay                      Upstream API
//!  ────────────────               ─────────────────────              ──────────────────
//!  OPTIONS /v3/...     ───────▶   204 + CORS preflight
//!  GET /v3/...         ───────▶   x-proxy-cookie → Cookie   ───────▶  GET /v3/...
//!  x-proxy-cookie: …              drop Origin/Referer                 Cookie: …
//!                      ◀───────   drop Set-Cookie, add CORS ◀───────  200 + body
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use cookie_relay::config::load_config;
use cookie_relay::http::HttpServer;
use cookie_relay::lifecycle::{signals, Shutdown};
use cookie_relay::net::tls::load_tls_config;
use cookie_relay::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "cookie-relay")]
#[command(about = "CORS relay that turns a header-borne session cookie into a real Cookie", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long, env = "RELAY_CONFIG")]
    config: Option<PathBuf>,

    /// Validate the configuration and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    if cli.check {
        println!("configuration OK");
        return Ok(());
    }

    logging::init(&config.observability);

    tracing::info!("cookie-relay v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        allowed_origins = config.cors.allowed_origins.len(),
        tls = config.listener.tls.is_some(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    signals::spawn_signal_listener(shutdown);

    let tls = config.listener.tls.clone();
    let bind_address = config.listener.bind_address.clone();
    let server = HttpServer::new(config)?;

    match tls {
        Some(tls) => {
            let addr: SocketAddr = bind_address.parse()?;
            let tls_config = load_tls_config(&tls).await?;
            server.run_tls(addr, tls_config, server_shutdown).await?;
        }
        None => {
            let listener = TcpListener::bind(&bind_address).await?;
            let local_addr = listener.local_addr()?;
            tracing::info!(address = %local_addr, "Listening for connections");
            server.run(listener, server_shutdown).await?;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
