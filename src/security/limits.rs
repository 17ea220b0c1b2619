//! Inbound body limits.
//!
//! # Responsibilities
//! - Buffer the inbound body up to the configured maximum
//! - Distinguish "too large" (413) from other read failures (400)
//!
//! # Design Decisions
//! - The whole body is buffered; payloads are small JSON documents
//! - GET and HEAD bodies are never read

use std::error::Error as _;

use axum::body::{Body, Bytes};
use axum::http::Method;
use http_body_util::LengthLimitError;

use crate::http::error::RelayError;

/// Whether the body of a request with this method is forwarded.
pub fn carries_body(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::HEAD)
}

/// Read the full body into memory, rejecting anything over `limit` bytes.
pub async fn read_body(body: Body, limit: usize) -> Result<Bytes, RelayError> {
    axum::body::to_bytes(body, limit).await.map_err(|err| {
        if exceeded_limit(&err) {
            RelayError::BodyTooLarge { limit }
        } else {
            RelayError::Body(err)
        }
    })
}

fn exceeded_limit(err: &axum::Error) -> bool {
    let mut source = err.source();
    while let Some(current) = source {
        if current.is::<LengthLimitError>() {
            return true;
        }
        source = current.source();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_carries_body() {
        assert!(!carries_body(&Method::GET));
        assert!(!carries_body(&Method::HEAD));
        assert!(carries_body(&Method::POST));
        assert!(carries_body(&Method::PATCH));
        assert!(carries_body(&Method::DELETE));
    }

    #[tokio::test]
    async fn test_read_within_limit() {
        let bytes = read_body(Body::from(r#"{"node":{"price":"9.99"}}"#), 1024)
            .await
            .unwrap();
        assert_eq!(&bytes[..], br#"{"node":{"price":"9.99"}}"#);
    }

    #[tokio::test]
    async fn test_read_over_limit() {
        let err = read_body(Body::from(vec![b'x'; 64]), 16).await.unwrap_err();
        assert!(matches!(err, RelayError::BodyTooLarge { limit: 16 }));
    }
}
