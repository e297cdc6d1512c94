//! Request pipeline.
//!
//! # Data Flow
//! ```text
//! raw body + headers + client id
//!     → parse JSON object          (else MalformedInput)
//!     → prompt.rs extraction
//!     → RateLimiter::admit         (else RateLimited)
//!     → ContentFilter::evaluate    (else Blocked)
//!     → Forwarder::forward         (Forwarded | UpstreamFailed)
//! ```
//!
//! # Design Decisions
//! - Transport agnostic: the HTTP layer only maps `Outcome` to responses
//! - A rate-limited request never reaches the content filter

pub mod handler;
pub mod outcome;
pub mod prompt;

pub use handler::RequestPipeline;
pub use outcome::Outcome;
pub use prompt::extract_prompt;
