//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, limits > 0)
//! - Check addresses and URLs parse
//! - Check filter names against the filter registry
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AlphaConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::AlphaConfig;
use crate::security::filter::KNOWN_FILTERS;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &AlphaConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match url::Url::parse(&config.app.url) {
        Ok(u) if matches!(u.scheme(), "http" | "https") => {}
        Ok(u) => errors.push(ValidationError::new(
            "app.url",
            format!("unsupported scheme '{}'", u.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new("app.url", e.to_string())),
    }

    if config.app.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "app.bind_address",
            format!("'{}' is not a socket address", config.app.bind_address),
        ));
    }

    if config.security.encryption_key.is_empty() {
        errors.push(ValidationError::new("security.encryption_key", "must not be empty"));
    } else if config.security.encryption_key.len() != 32 {
        tracing::warn!(
            key_len = config.security.encryption_key.len(),
            "Encryption key is not 32 bytes; it will be zero-padded or truncated"
        );
    }

    for name in &config.filters.order {
        if !KNOWN_FILTERS.contains(&name.as_str()) {
            errors.push(ValidationError::new(
                "filters.order",
                format!("unknown filter '{name}'"),
            ));
        }
    }

    let temp = &config.filters.client_temp_blacklist;
    if temp.limit == 0 {
        errors.push(ValidationError::new("filters.client_temp_blacklist.limit", "must be > 0"));
    }
    if temp.window_secs == 0 {
        errors.push(ValidationError::new(
            "filters.client_temp_blacklist.window_secs",
            "must be > 0",
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be > 0"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
