//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (limits > 0, timeouts > 0)
//! - Validate addresses and the upstream URL
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: FirewallConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::FirewallConfig;

/// Upper bound for every duration setting: one year.
pub const MAX_DURATION_SECS: u64 = 365 * 24 * 60 * 60;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be greater than zero")]
    NotPositive { field: &'static str },

    #[error("{field} must be at most {max} seconds")]
    TooLong { field: &'static str, max: u64 },

    #[error("{field} is not a valid socket address: {value}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("upstream.url is invalid: {0}")]
    InvalidUpstreamUrl(String),

    #[error("logging.rotation must be one of minutely, hourly, daily, never (got {0})")]
    UnknownRotation(String),
}

/// Validate a fully-merged configuration.
pub fn validate_config(config: &FirewallConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.rate_limit.max_requests == 0 {
        errors.push(ValidationError::NotPositive { field: "rate_limit.max_requests" });
    }
    if config.rate_limit.window_secs == 0 {
        errors.push(ValidationError::NotPositive { field: "rate_limit.window_secs" });
    }
    if config.rate_limit.sweep_interval_secs == 0 {
        errors.push(ValidationError::NotPositive { field: "rate_limit.sweep_interval_secs" });
    }
    if config.upstream.timeout_secs == 0 {
        errors.push(ValidationError::NotPositive { field: "upstream.timeout_secs" });
    }
    for (field, secs) in [
        ("rate_limit.window_secs", config.rate_limit.window_secs),
        ("rate_limit.idle_grace_secs", config.rate_limit.idle_grace_secs),
        ("rate_limit.sweep_interval_secs", config.rate_limit.sweep_interval_secs),
        ("upstream.timeout_secs", config.upstream.timeout_secs),
        ("upstream.connect_timeout_secs", config.upstream.connect_timeout_secs),
    ] {
        if secs > MAX_DURATION_SECS {
            errors.push(ValidationError::TooLong {
                field,
                max: MAX_DURATION_SECS,
            });
        }
    }
    if config.security.max_body_size == 0 {
        errors.push(ValidationError::NotPositive { field: "security.max_body_size" });
    }

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if config.admin.enabled {
        check_address(&mut errors, "admin.bind_address", &config.admin.bind_address);
    }
    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    match Url::parse(&config.upstream.url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ValidationError::InvalidUpstreamUrl(format!(
            "unsupported scheme {}",
            url.scheme()
        ))),
        Err(e) => errors.push(ValidationError::InvalidUpstreamUrl(e.to_string())),
    }

    if !matches!(
        config.logging.rotation.as_str(),
        "minutely" | "hourly" | "daily" | "never"
    ) {
        errors.push(ValidationError::UnknownRotation(config.logging.rotation.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}
