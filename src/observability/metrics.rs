//! Metrics collection and exposition.
//!
//! # Metrics
//! - `mif_requests_total` (counter): requests by outcome
//! - `mif_blocked_total` (counter): content blocks by rule category
//! - `mif_upstream_duration_seconds` (histogram): upstream latency by result
//! - `mif_rate_limit_clients` (gauge): clients holding window state
//!
//! Recording is a no-op until `init_metrics` installs the Prometheus recorder.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_outcome(outcome: &'static str) {
    ::metrics::counter!("mif_requests_total", "outcome" => outcome).increment(1);
}

pub fn record_block(category: &str) {
    ::metrics::counter!("mif_blocked_total", "category" => category.to_owned()).increment(1);
}

pub fn record_upstream(result: &'static str, start: Instant) {
    ::metrics::histogram!("mif_upstream_duration_seconds", "result" => result)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_tracked_clients(count: usize) {
    ::metrics::gauge!("mif_rate_limit_clients").set(count as f64);
}
