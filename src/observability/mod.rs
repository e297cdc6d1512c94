//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Request pipeline produces:
//!     → logging.rs (audit events + operational logs → console, rotating file)
//!     → metrics.rs (Prometheus counters, histograms, gauges)
//!     → stats.rs (in-process counters for the admin API)
//!
//! Offline:
//!     rotated log files → report.rs (per-client aggregation)
//! ```
//!
//! # Design Decisions
//! - Logging never fails a request
//! - Metrics are cheap (atomic increments) and no-ops when disabled

pub mod logging;
pub mod metrics;
pub mod report;
pub mod stats;

pub use logging::{RequestLogger, TracingRequestLogger, AUDIT_TARGET};
pub use stats::{OutcomeKind, StatsSnapshot, TrafficStats};
