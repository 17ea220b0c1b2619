//! Cookie-injecting CORS relay library.
//!
//! Lets a browser UI call a cookie-authenticated third-party API by passing
//! the session cookie in a custom header, which the relay turns into a real
//! `Cookie` header on the upstream hop.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod security;

pub use config::schema::RelayConfig;
pub use http::{HttpServer, Relay};
pub use lifecycle::Shutdown;
