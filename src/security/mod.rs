//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → limits.rs (body size)
//!     → headers.rs (resolve client identity)
//!     → rate_limit.rs (sliding window per client, driven by the pipeline)
//! ```
//!
//! # Design Decisions
//! - Fail closed: reject on any security check failure
//! - No trust in client input unless configured

pub mod headers;
pub mod limits;
pub mod rate_limit;

pub use rate_limit::{RateLimiter, SlidingWindowLimiter, Sweeper};
