//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, the upstream URL and timeout ranges
//! - Reject allow-list entries that could never match a browser `Origin`
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RelayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::HeaderName;
use thiserror::Error;
use url::Url;

use crate::config::schema::RelayConfig;

/// A single semantic problem found in a config.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: '{value}' is not a socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("upstream.base_url: {0}")]
    InvalidUpstream(String),

    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),

    #[error("cors.credential_header: {0}")]
    InvalidCredentialHeader(String),

    #[error("cors.allowed_origins: '{origin}' {reason}")]
    InvalidOrigin { origin: String, reason: &'static str },
}

/// Validate a configuration, collecting every error found.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(
        "listener.bind_address",
        &config.listener.bind_address,
        &mut errors,
    );
    if config.observability.metrics_enabled {
        check_address(
            "observability.metrics_address",
            &config.observability.metrics_address,
            &mut errors,
        );
    }

    if let Err(reason) = check_upstream_url(&config.upstream.base_url) {
        errors.push(ValidationError::InvalidUpstream(reason));
    }
    if config.upstream.connect_timeout_secs == 0 {
        errors.push(ValidationError::ZeroValue("upstream.connect_timeout_secs"));
    }
    if config.upstream.request_timeout_secs == Some(0) {
        errors.push(ValidationError::ZeroValue("upstream.request_timeout_secs"));
    }

    match HeaderName::from_bytes(config.cors.credential_header.as_bytes()) {
        Ok(name) if name == axum::http::header::COOKIE => {
            errors.push(ValidationError::InvalidCredentialHeader(
                "must not be the cookie header itself".to_string(),
            ));
        }
        Ok(_) => {}
        Err(_) => errors.push(ValidationError::InvalidCredentialHeader(format!(
            "'{}' is not a valid header name",
            config.cors.credential_header
        ))),
    }

    for origin in &config.cors.allowed_origins {
        if let Err(reason) = check_origin(origin) {
            errors.push(ValidationError::InvalidOrigin {
                origin: origin.clone(),
                reason,
            });
        }
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::ZeroValue("security.max_body_size"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

fn check_upstream_url(raw: &str) -> Result<(), String> {
    let url = Url::parse(raw).map_err(|e| format!("'{}' does not parse: {}", raw, e))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(format!("scheme '{}' is not http or https", url.scheme()));
    }
    if url.host_str().is_none() {
        return Err("missing host".to_string());
    }
    if !url.username().is_empty() || url.password().is_some() {
        return Err("must not carry userinfo".to_string());
    }
    if url.path() != "/" {
        return Err(format!("path '{}' is not allowed; paths come from the caller", url.path()));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err("must not carry a query or fragment".to_string());
    }
    Ok(())
}

/// Browsers send `Origin` as `scheme://host[:port]` with nothing after it.
fn check_origin(origin: &str) -> Result<(), &'static str> {
    if origin.is_empty() {
        return Err("is empty");
    }
    if origin == "*" {
        return Err("is a wildcard; list exact origins");
    }
    let url = Url::parse(origin).map_err(|_| "is not a URL")?;
    if url.host_str().is_none() {
        return Err("has no host");
    }
    if origin.ends_with('/') || url.path() != "/" || url.query().is_some() {
        return Err("must not have a path, query or trailing slash");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&RelayConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = RelayConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.upstream.base_url = "ftp://files.example.com".into();
        config.upstream.connect_timeout_secs = 0;
        config.security.max_body_size = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::ZeroValue("security.max_body_size")));
    }

    #[test]
    fn test_upstream_url_rules() {
        assert!(check_upstream_url("https://api.sortly.com").is_ok());
        assert!(check_upstream_url("http://127.0.0.1:4000/").is_ok());
        assert!(check_upstream_url("https://api.sortly.com/v3").is_err());
        assert!(check_upstream_url("https://api.sortly.com/?a=1").is_err());
        assert!(check_upstream_url("https://user:pw@api.sortly.com").is_err());
        assert!(check_upstream_url("api.sortly.com").is_err());
    }

    #[test]
    fn test_origin_rules() {
        assert!(check_origin("https://app.example.com").is_ok());
        assert!(check_origin("http://localhost:5173").is_ok());
        assert!(check_origin("*").is_err());
        assert!(check_origin("").is_err());
        assert!(check_origin("https://app.example.com/").is_err());
        assert!(check_origin("https://app.example.com/admin").is_err());
        assert!(check_origin("app.example.com").is_err());
    }

    #[test]
    fn test_credential_header_rules() {
        let mut config = RelayConfig::default();
        config.cors.credential_header = "Cookie".into();
        assert!(matches!(
            validate_config(&config).unwrap_err()[0],
            ValidationError::InvalidCredentialHeader(_)
        ));

        config.cors.credential_header = "bad header".into();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = RelayConfig::default();
        config.observability.metrics_address = "nope".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert!(validate_config(&config).is_err());
    }
}
