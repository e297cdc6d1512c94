//! Request pipeline: parse, extract, rate limit, filter, forward.
//!
//! # Responsibilities
//! - Run the checks in a fixed order, each one a possible terminal exit
//! - Emit exactly one audit event per request
//! - Bound the upstream call with the configured deadline

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::HeaderMap;
use serde_json::Value;

use crate::filter::ContentFilter;
use crate::observability::metrics;
use crate::observability::{RequestLogger, TrafficStats};
use crate::pipeline::outcome::Outcome;
use crate::pipeline::prompt::{extract_prompt, preview, single_line};
use crate::security::RateLimiter;
use crate::upstream::{Forwarder, UpstreamError};

/// Characters of the prompt kept in the info-level audit line.
const PREVIEW_CHARS: usize = 50;

/// Orchestrates one inference request end to end.
///
/// All collaborators are shared handles; one pipeline serves every request.
pub struct RequestPipeline {
    limiter: Arc<dyn RateLimiter>,
    filter: ContentFilter,
    forwarder: Arc<dyn Forwarder>,
    logger: Arc<dyn RequestLogger>,
    stats: Arc<TrafficStats>,
    upstream_timeout: Duration,
}

impl RequestPipeline {
    pub fn new(
        limiter: Arc<dyn RateLimiter>,
        filter: ContentFilter,
        forwarder: Arc<dyn Forwarder>,
        logger: Arc<dyn RequestLogger>,
        upstream_timeout: Duration,
    ) -> Self {
        Self {
            limiter,
            filter,
            forwarder,
            logger,
            stats: Arc::new(TrafficStats::new()),
            upstream_timeout,
        }
    }

    pub fn limiter(&self) -> &Arc<dyn RateLimiter> {
        &self.limiter
    }

    pub fn filter(&self) -> &ContentFilter {
        &self.filter
    }

    pub fn stats(&self) -> &Arc<TrafficStats> {
        &self.stats
    }

    /// Process one request body from `client_id`.
    pub async fn handle(&self, raw_body: &[u8], headers: &HeaderMap, client_id: &str) -> Outcome {
        let outcome = self.decide(raw_body, headers, client_id).await;
        let kind = outcome.kind();
        self.stats.record(kind);
        metrics::record_outcome(kind.as_str());
        outcome
    }

    async fn decide(&self, raw_body: &[u8], headers: &HeaderMap, client_id: &str) -> Outcome {
        let payload = match serde_json::from_slice::<Value>(raw_body) {
            Ok(value) if value.is_object() => value,
            _ => {
                self.logger.warning(&format!(
                    "Malformed request from IP {client_id}: body is not a JSON object"
                ));
                return Outcome::MalformedInput;
            }
        };

        let prompt = extract_prompt(&payload);

        if !self.limiter.admit(client_id, Instant::now()) {
            self.logger.warning(&format!(
                "Rate limited request from IP {client_id}: reason=rate limit exceeded prompt={}",
                single_line(&prompt)
            ));
            return Outcome::RateLimited;
        }

        let verdict = self.filter.evaluate(&prompt);
        if verdict.blocked {
            let reason = verdict.reason.unwrap_or_default();
            let category = reason.split(':').next().unwrap_or_default();
            metrics::record_block(category);
            self.logger.warning(&format!(
                "Blocked request from IP {client_id}: reason={reason} prompt={}",
                single_line(&prompt)
            ));
            return Outcome::Blocked(reason);
        }

        self.logger.info(&format!(
            "Allowed request from IP {client_id}: {}",
            single_line(&preview(&prompt, PREVIEW_CHARS))
        ));

        self.forward(payload, headers, client_id).await
    }

    async fn forward(&self, payload: Value, headers: &HeaderMap, client_id: &str) -> Outcome {
        let start = Instant::now();
        let call = self.forwarder.forward(payload, headers, self.upstream_timeout);
        let result = match tokio::time::timeout(self.upstream_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(UpstreamError::Timeout(self.upstream_timeout.as_secs())),
        };

        match result {
            Ok(response) => {
                metrics::record_upstream("ok", start);
                Outcome::Forwarded(response)
            }
            Err(err) => {
                metrics::record_upstream(err.kind(), start);
                tracing::error!(client = %client_id, error = %err, "Upstream call failed");
                Outcome::UpstreamFailed(err)
            }
        }
    }
}
