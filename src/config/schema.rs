//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the firewall.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::filter::rules::RuleSpec;

/// Root configuration for the inference firewall.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct FirewallConfig {
    /// Listener configuration (bind address, client identity).
    pub listener: ListenerConfig,

    /// Sliding-window rate limiting.
    pub rate_limit: RateLimitConfig,

    /// Upstream model endpoint.
    pub upstream: UpstreamConfig,

    /// Content filter policy.
    pub filter: FilterConfig,

    /// Log sinks and rotation.
    pub logging: LoggingConfig,

    /// Metrics exporter settings.
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub admin: AdminConfig,

    #[serde(default)]
    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    pub bind_address: String,

    /// Use the first `X-Forwarded-For` entry as the client identity.
    /// Only enable behind a reverse proxy that overwrites the header.
    pub trust_forwarded_for: bool,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
            trust_forwarded_for: false,
        }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Maximum requests per client within one window.
    pub max_requests: usize,

    /// Window length in seconds.
    pub window_secs: u64,

    /// Extra idle time after a window fully expires before a client is evicted.
    pub idle_grace_secs: u64,

    /// Interval between eviction sweeps in seconds.
    pub sweep_interval_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 10,
            window_secs: 60,
            idle_grace_secs: 300,
            sweep_interval_secs: 60,
        }
    }
}

/// Upstream model endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Full URL of the model endpoint.
    pub url: String,

    /// Total request timeout in seconds.
    pub timeout_secs: u64,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Bearer credential injected into forwarded requests.
    pub api_key: Option<String>,

    /// Model name used when the client did not specify one.
    pub default_model: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: "https://router.huggingface.co/fireworks-ai/inference/v1/chat/completions"
                .to_string(),
            timeout_secs: 30,
            connect_timeout_secs: 5,
            api_key: None,
            default_model: "accounts/fireworks/models/deepseek-r1-0528".to_string(),
        }
    }
}

/// Content filter policy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Load the built-in policy table before `rules`.
    pub use_default_rules: bool,

    /// Run the structured entity detector as the last stage.
    pub entity_detection: bool,

    /// Additional rules appended to the policy table.
    pub rules: Vec<RuleSpec>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            use_default_rules: true,
            entity_detection: false,
            rules: Vec::new(),
        }
    }
}

/// Log sink configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    pub level: String,

    /// Directory for rotated log files.
    pub directory: String,

    /// Log file name prefix.
    pub file_prefix: String,

    /// Rotation period: minutely, hourly, daily or never.
    pub rotation: String,

    /// Number of rotated files kept on disk.
    pub max_files: usize,

    /// Also log to stdout.
    pub console: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: "logs".to_string(),
            file_prefix: "mif-firewall".to_string(),
            rotation: "daily".to_string(),
            max_files: 3,
            console: true,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable admin API.
    pub enabled: bool,

    /// Admin API bind address. Keep it on loopback.
    pub bind_address: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bind_address: "127.0.0.1:8001".to_string(),
        }
    }
}

/// Request hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 1024 * 1024, // 1MB
        }
    }
}
