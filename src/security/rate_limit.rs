//! Per-client sliding-window rate limiting.
//!
//! # Algorithm
//! ```text
//! cutoff = now - window
//! drop timestamps < cutoff
//! append now
//! admit iff len <= max_requests
//! ```
//!
//! Rejected attempts stay in the window, so a client hammering the endpoint
//! keeps itself locked out until it backs off for a full window.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::sync::broadcast;
use tokio::time;

use crate::config::RateLimitConfig;
use crate::observability::metrics;

/// Admission control keyed by client identity.
///
/// The in-memory [`SlidingWindowLimiter`] is the only implementation shipped;
/// the trait is the seam for a shared store in multi-process deployments.
pub trait RateLimiter: Send + Sync {
    /// Record an attempt by `client_id` at `now` and decide whether to admit it.
    fn admit(&self, client_id: &str, now: Instant) -> bool;

    /// Evict clients idle past their window plus grace. Returns the number evicted.
    fn sweep(&self, now: Instant) -> usize;

    /// Number of clients currently holding window state.
    fn tracked_clients(&self) -> usize;
}

/// In-memory sliding-window limiter.
///
/// Each client's read-prune-append-decide runs under that key's shard lock
/// (`DashMap::entry`), so concurrent calls for one client serialize while
/// calls for other clients proceed.
pub struct SlidingWindowLimiter {
    windows: DashMap<String, VecDeque<Instant>>,
    max_requests: usize,
    window: Duration,
    idle_grace: Duration,
}

impl SlidingWindowLimiter {
    pub fn new(max_requests: usize, window: Duration, idle_grace: Duration) -> Self {
        Self {
            windows: DashMap::new(),
            max_requests,
            window,
            idle_grace,
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(
            config.max_requests,
            Duration::from_secs(config.window_secs),
            Duration::from_secs(config.idle_grace_secs),
        )
    }

    pub fn max_requests(&self) -> usize {
        self.max_requests
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Attempts currently held in `client_id`'s window, rejected ones included.
    pub fn attempts(&self, client_id: &str) -> usize {
        self.windows.get(client_id).map_or(0, |stamps| stamps.len())
    }
}

impl RateLimiter for SlidingWindowLimiter {
    fn admit(&self, client_id: &str, now: Instant) -> bool {
        let mut stamps = match self.windows.get_mut(client_id) {
            Some(stamps) => stamps,
            None => self.windows.entry(client_id.to_owned()).or_default(),
        };

        if let Some(cutoff) = now.checked_sub(self.window) {
            while stamps.front().is_some_and(|t| *t < cutoff) {
                stamps.pop_front();
            }
        }

        // `now` may have been sampled before a competing call took the lock;
        // clamp so the window stays non-decreasing.
        let stamp = stamps.back().map_or(now, |last| (*last).max(now));
        stamps.push_back(stamp);

        stamps.len() <= self.max_requests
    }

    fn sweep(&self, now: Instant) -> usize {
        let before = self.windows.len();
        // No horizon when the idle span overflows or predates the clock:
        // nobody can be idle long enough yet.
        let horizon = self
            .window
            .checked_add(self.idle_grace)
            .and_then(|idle| now.checked_sub(idle));
        match horizon {
            Some(horizon) => self
                .windows
                .retain(|_, stamps| stamps.back().is_some_and(|last| *last >= horizon)),
            None => self.windows.retain(|_, stamps| !stamps.is_empty()),
        }
        before.saturating_sub(self.windows.len())
    }

    fn tracked_clients(&self) -> usize {
        self.windows.len()
    }
}

/// Background task evicting idle clients on a fixed interval.
pub struct Sweeper {
    limiter: Arc<dyn RateLimiter>,
    interval: Duration,
}

impl Sweeper {
    pub fn new(limiter: Arc<dyn RateLimiter>, interval: Duration) -> Self {
        Self { limiter, interval }
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(interval_secs = self.interval.as_secs(), "Rate limit sweeper starting");

        let mut ticker = time::interval(self.interval);
        // First tick completes immediately; nothing to sweep yet.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let evicted = self.limiter.sweep(time::Instant::now().into_std());
                    let tracked = self.limiter.tracked_clients();
                    metrics::record_tracked_clients(tracked);
                    if evicted > 0 {
                        tracing::debug!(evicted, tracked, "Evicted idle rate limit windows");
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Rate limit sweeper received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;

    const WINDOW: Duration = Duration::from_secs(60);

    fn limiter(max: usize) -> SlidingWindowLimiter {
        SlidingWindowLimiter::new(max, WINDOW, Duration::from_secs(30))
    }

    #[test]
    fn admits_exactly_max_per_window() {
        let rl = limiter(3);
        let t0 = Instant::now();

        for i in 0..3 {
            assert!(rl.admit("10.0.0.1", t0 + Duration::from_secs(i)), "request {i}");
        }
        assert!(!rl.admit("10.0.0.1", t0 + Duration::from_secs(3)));
    }

    #[test]
    fn window_slides_instead_of_resetting() {
        let rl = limiter(2);
        let t0 = Instant::now();

        assert!(rl.admit("c", t0));
        assert!(rl.admit("c", t0 + Duration::from_secs(30)));
        assert!(!rl.admit("c", t0 + Duration::from_secs(45)));

        // t0 has aged out, the t0+30 and t0+45 attempts have not
        assert!(!rl.admit("c", t0 + Duration::from_secs(61)));
        // everything before t0+46 has aged out now; only the t0+61 attempt remains
        assert!(rl.admit("c", t0 + Duration::from_secs(106)));
    }

    #[test]
    fn admits_again_after_full_window() {
        let rl = limiter(2);
        let t0 = Instant::now();

        assert!(rl.admit("c", t0));
        assert!(rl.admit("c", t0));
        assert!(!rl.admit("c", t0));
        assert!(rl.admit("c", t0 + WINDOW + Duration::from_millis(1)));
    }

    #[test]
    fn rejected_attempts_still_count() {
        let rl = limiter(1);
        let t0 = Instant::now();

        assert!(rl.admit("c", t0));
        // Keep hammering: each rejection extends the lockout
        assert!(!rl.admit("c", t0 + Duration::from_secs(50)));
        assert!(!rl.admit("c", t0 + Duration::from_secs(100)));
        assert!(rl.admit("c", t0 + Duration::from_secs(161)));
    }

    #[test]
    fn clients_are_independent() {
        let rl = limiter(1);
        let t0 = Instant::now();

        assert!(rl.admit("a", t0));
        assert!(!rl.admit("a", t0));
        assert!(rl.admit("b", t0));
        assert_eq!(rl.tracked_clients(), 2);
    }

    #[test]
    fn concurrent_admits_never_exceed_max() {
        let max = 25;
        let rl = limiter(max);
        let now = Instant::now();
        let barrier = Barrier::new(2 * max);

        let admitted = std::thread::scope(|s| {
            let handles: Vec<_> = (0..2 * max)
                .map(|_| {
                    s.spawn(|| {
                        barrier.wait();
                        rl.admit("203.0.113.9", now)
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .filter(|ok| *ok)
                .count()
        });

        assert_eq!(admitted, max);
    }

    #[test]
    fn sweep_evicts_only_idle_clients() {
        let rl = limiter(5);
        let t0 = Instant::now();

        rl.admit("idle", t0);
        rl.admit("active", t0 + Duration::from_secs(80));

        // horizon = t0 + 100 - 90 = t0 + 10
        let evicted = rl.sweep(t0 + Duration::from_secs(100));
        assert_eq!(evicted, 1);
        assert_eq!(rl.tracked_clients(), 1);

        // Evicted client starts fresh
        assert!(rl.admit("idle", t0 + Duration::from_secs(100)));
    }

    #[test]
    fn sweep_survives_huge_window() {
        let rl = SlidingWindowLimiter::new(5, Duration::from_secs(u64::MAX), Duration::from_secs(300));
        let now = Instant::now();
        assert!(rl.admit("c", now));

        assert_eq!(rl.sweep(now + Duration::from_secs(3600)), 0);
        assert_eq!(rl.tracked_clients(), 1);
    }

    #[test]
    fn attempts_count_rejections() {
        let rl = limiter(1);
        let t0 = Instant::now();
        assert_eq!(rl.attempts("c"), 0);

        rl.admit("c", t0);
        rl.admit("c", t0);
        assert_eq!(rl.attempts("c"), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn sweeper_evicts_idle_clients_until_shutdown() {
        // window 60s + grace 30s: idle after 90s
        let rl = Arc::new(limiter(5));
        rl.admit("idle", time::Instant::now().into_std());

        let (tx, rx) = broadcast::channel(1);
        let task = tokio::spawn(Sweeper::new(rl.clone(), Duration::from_secs(10)).run(rx));

        time::sleep(Duration::from_secs(50)).await;
        assert_eq!(rl.tracked_clients(), 1);

        time::sleep(Duration::from_secs(55)).await;
        assert_eq!(rl.tracked_clients(), 0);

        tx.send(()).unwrap();
        time::timeout(Duration::from_secs(1), task)
            .await
            .expect("sweeper did not stop on shutdown")
            .unwrap();
    }
}
