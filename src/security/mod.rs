//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → cors.rs (policy from Origin + allow-list)
//!     → headers.rs (strip caller context and hop-by-hop headers)
//!     → limits.rs (bounded body buffering)
//!
//! Upstream response
//!     → headers.rs (strip Set-Cookie and hop-by-hop headers)
//!     → cors.rs (apply policy headers)
//! ```

pub mod cors;
pub mod headers;
pub mod limits;

pub use cors::{AllowedOrigins, CorsPolicy};
