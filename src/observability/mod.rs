//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Relay and server produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!     → TraceLayer spans carrying the x-request-id (http/server.rs)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through spans and upstream calls
//! - Metrics are cheap (atomic increments) and label-free of credentials

pub mod logging;
pub mod metrics;
