//! Network layer.
//!
//! Plain TCP listeners are bound in `main.rs` and handed to `axum::serve`;
//! this module only covers optional TLS termination.

pub mod tls;
