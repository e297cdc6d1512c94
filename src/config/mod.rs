//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → env.rs (environment / .env overrides)
//!     → validation.rs (semantic checks)
//!     → FirewallConfig (validated, immutable)
//!     → shared by value/Arc with all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod env;
pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::FirewallConfig;
pub use schema::{
    AdminConfig, FilterConfig, ListenerConfig, LoggingConfig, ObservabilityConfig,
    RateLimitConfig, SecurityConfig, UpstreamConfig,
};
