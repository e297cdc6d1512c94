//! In-process outcome counters served by the admin API.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Terminal outcome category of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    Forwarded,
    Blocked,
    RateLimited,
    Malformed,
    UpstreamFailed,
}

impl OutcomeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeKind::Forwarded => "forwarded",
            OutcomeKind::Blocked => "blocked",
            OutcomeKind::RateLimited => "rate_limited",
            OutcomeKind::Malformed => "malformed",
            OutcomeKind::UpstreamFailed => "upstream_failed",
        }
    }
}

#[derive(Debug, Default)]
pub struct TrafficStats {
    forwarded: AtomicU64,
    blocked: AtomicU64,
    rate_limited: AtomicU64,
    malformed: AtomicU64,
    upstream_failed: AtomicU64,
}

/// Point-in-time copy of [`TrafficStats`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub total_requests: u64,
    pub forwarded: u64,
    pub blocked: u64,
    pub rate_limited: u64,
    pub malformed: u64,
    pub upstream_failed: u64,
}

impl TrafficStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, kind: OutcomeKind) {
        let counter = match kind {
            OutcomeKind::Forwarded => &self.forwarded,
            OutcomeKind::Blocked => &self.blocked,
            OutcomeKind::RateLimited => &self.rate_limited,
            OutcomeKind::Malformed => &self.malformed,
            OutcomeKind::UpstreamFailed => &self.upstream_failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let forwarded = self.forwarded.load(Ordering::Relaxed);
        let blocked = self.blocked.load(Ordering::Relaxed);
        let rate_limited = self.rate_limited.load(Ordering::Relaxed);
        let malformed = self.malformed.load(Ordering::Relaxed);
        let upstream_failed = self.upstream_failed.load(Ordering::Relaxed);
        StatsSnapshot {
            total_requests: forwarded + blocked + rate_limited + malformed + upstream_failed,
            forwarded,
            blocked,
            rate_limited,
            malformed,
            upstream_failed,
        }
    }
}
