//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, request ID, tracing)
//!     → relay.rs (CORS policy, preflight or forward)
//!     → request.rs (credential → Cookie, header filtering)
//!     → client.rs (single upstream call, manual redirects)
//!     → response.rs (strip Set-Cookie, apply CORS, stream body)
//!     → Send to client
//! ```

pub mod client;
pub mod error;
pub mod relay;
pub mod request;
pub mod response;
pub mod server;

pub use error::{RelayError, SetupError};
pub use relay::Relay;
pub use server::{HttpServer, X_REQUEST_ID};
