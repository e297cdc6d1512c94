//! Upstream model endpoint subsystem.
//!
//! # Data Flow
//! ```text
//! Approved request (original body + client headers)
//!     → forwarder.rs (header cleanup, payload adjustments)
//!     → POST upstream.url with deadline
//!     → JSON response | UpstreamError (error.rs)
//! ```
//!
//! # Design Decisions
//! - No retries: a failed call is surfaced as-is
//! - Timeouts are distinct from transport failures (504 vs 502)

pub mod error;
pub mod forwarder;

pub use error::UpstreamError;
pub use forwarder::{Forwarder, ForwarderSetupError, HttpForwarder};
