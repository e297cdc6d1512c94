//! Startup orchestration.
//!
//! # Responsibilities
//! - Compile the rule table and build the upstream client
//! - Assemble the request pipeline from its collaborators
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Every invalid rule is reported, not just the first

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::config::FirewallConfig;
use crate::filter::{ContentFilter, RuleError, RuleSet};
use crate::observability::TracingRequestLogger;
use crate::pipeline::RequestPipeline;
use crate::security::SlidingWindowLimiter;
use crate::upstream::{ForwarderSetupError, HttpForwarder};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid filter rules: {}", join(.0))]
    Rules(Vec<RuleError>),

    #[error(transparent)]
    Forwarder(#[from] ForwarderSetupError),
}

fn join(errors: &[RuleError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Build the production pipeline described by `config`.
pub fn build_pipeline(config: &FirewallConfig) -> Result<RequestPipeline, StartupError> {
    let rules = RuleSet::from_config(&config.filter).map_err(StartupError::Rules)?;
    tracing::info!(
        rules = rules.len(),
        entity_detection = rules.entity_detector().is_some(),
        "Content filter rules compiled"
    );

    let forwarder = HttpForwarder::new(&config.upstream)?;
    tracing::info!(
        url = %config.upstream.url,
        timeout_secs = config.upstream.timeout_secs,
        credential = config.upstream.api_key.is_some(),
        "Upstream forwarder ready"
    );

    Ok(RequestPipeline::new(
        Arc::new(SlidingWindowLimiter::from_config(&config.rate_limit)),
        ContentFilter::new(rules),
        Arc::new(forwarder),
        Arc::new(TracingRequestLogger),
        Duration::from_secs(config.upstream.timeout_secs),
    ))
}
