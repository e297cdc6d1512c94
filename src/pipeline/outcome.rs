//! Terminal results of the request pipeline.

use serde_json::Value;

use crate::observability::OutcomeKind;
use crate::upstream::UpstreamError;

/// What happened to one request. Exactly one per call to `handle`.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Passed every check; carries the upstream JSON response.
    Forwarded(Value),
    /// Client exceeded its sliding window.
    RateLimited,
    /// Content filter hit; carries the block reason.
    Blocked(String),
    /// Body was not a JSON object.
    MalformedInput,
    /// Admitted and approved, but the upstream call failed.
    UpstreamFailed(UpstreamError),
}

impl Outcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Outcome::Forwarded(_) => OutcomeKind::Forwarded,
            Outcome::RateLimited => OutcomeKind::RateLimited,
            Outcome::Blocked(_) => OutcomeKind::Blocked,
            Outcome::MalformedInput => OutcomeKind::Malformed,
            Outcome::UpstreamFailed(_) => OutcomeKind::UpstreamFailed,
        }
    }
}
