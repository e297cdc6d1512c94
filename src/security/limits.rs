//! Request size limits.
//!
//! Bodies larger than `security.max_body_size` are rejected with
//! 413 Payload Too Large before the pipeline sees them.

use axum::extract::DefaultBodyLimit;

use crate::config::SecurityConfig;

/// Body limit layer for the public router.
pub fn body_limit(config: &SecurityConfig) -> DefaultBodyLimit {
    DefaultBodyLimit::max(config.max_body_size)
}
