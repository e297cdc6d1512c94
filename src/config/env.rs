//! Environment overrides.
//!
//! Values from the process environment (and a `.env` file loaded by `main`)
//! take precedence over the TOML file. Unset variables leave the file value.

use std::str::FromStr;

use crate::config::loader::ConfigError;
use crate::config::schema::FirewallConfig;

pub const BIND_ADDRESS: &str = "MIF_BIND_ADDRESS";
pub const RATE_LIMIT: &str = "RATE_LIMIT";
pub const RATE_WINDOW: &str = "RATE_WINDOW";
pub const TARGET_MODEL_URL: &str = "TARGET_MODEL_URL";
pub const UPSTREAM_TIMEOUT: &str = "UPSTREAM_TIMEOUT";
pub const API_KEY: &str = "HF_API_KEY";
pub const DEFAULT_MODEL: &str = "MIF_DEFAULT_MODEL";
pub const LOG_DIR: &str = "MIF_LOG_DIR";
pub const LOG_LEVEL: &str = "MIF_LOG_LEVEL";
pub const ADMIN_ENABLED: &str = "MIF_ADMIN_ENABLED";
pub const METRICS_ENABLED: &str = "MIF_METRICS_ENABLED";

/// Apply overrides from the real process environment.
pub fn apply_process_env(config: &mut FirewallConfig) -> Result<(), ConfigError> {
    apply_overrides(config, |key| std::env::var(key).ok())
}

/// Apply overrides using `lookup` to resolve variable names.
pub fn apply_overrides<F>(config: &mut FirewallConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup(BIND_ADDRESS) {
        config.listener.bind_address = v;
    }
    if let Some(v) = lookup(RATE_LIMIT) {
        config.rate_limit.max_requests = parse(RATE_LIMIT, &v)?;
    }
    if let Some(v) = lookup(RATE_WINDOW) {
        config.rate_limit.window_secs = parse(RATE_WINDOW, &v)?;
    }
    if let Some(v) = lookup(TARGET_MODEL_URL) {
        config.upstream.url = v;
    }
    if let Some(v) = lookup(UPSTREAM_TIMEOUT) {
        config.upstream.timeout_secs = parse(UPSTREAM_TIMEOUT, &v)?;
    }
    if let Some(v) = lookup(API_KEY) {
        config.upstream.api_key = if v.is_empty() { None } else { Some(v) };
    }
    if let Some(v) = lookup(DEFAULT_MODEL) {
        config.upstream.default_model = v;
    }
    if let Some(v) = lookup(LOG_DIR) {
        config.logging.directory = v;
    }
    if let Some(v) = lookup(LOG_LEVEL) {
        config.logging.level = v;
    }
    if let Some(v) = lookup(ADMIN_ENABLED) {
        config.admin.enabled = parse_flag(ADMIN_ENABLED, &v)?;
    }
    if let Some(v) = lookup(METRICS_ENABLED) {
        config.observability.metrics_enabled = parse_flag(METRICS_ENABLED, &v)?;
    }
    Ok(())
}

fn parse<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Env {
        key,
        value: value.to_string(),
    })
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Env {
            key,
            value: value.to_string(),
        }),
    }
}
