//! Fixed-window rate limiting keyed by client identifier.
//!
//! Every identifier owns one counter and the instant its window ends. The
//! first request after that instant starts a fresh window with a count of one.
//! The counter is incremented before it is compared, so exactly
//! `max_requests` requests succeed per window and the next one is rejected.
//!
//! The registry is built once at startup and shared through an `Arc`. A
//! background sweeper drops expired entries to bound memory; an entry it has
//! not reached yet is still reset correctly on its next access.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::config::RateLimitConfig;
use crate::observability::metrics;

/// Counter state for one identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitEntry {
    pub count: u64,
    pub window_reset_at: Instant,
}

/// Process-wide identifier → counter map.
///
/// Check-and-record runs under the entry's shard lock, and the sweep uses
/// `retain`, which takes the same locks. A sweep therefore never deletes an
/// entry that a concurrent request is renewing.
#[derive(Debug)]
pub struct RateLimitRegistry {
    entries: DashMap<String, RateLimitEntry>,
    max_requests: u64,
    window: Duration,
}

impl RateLimitRegistry {
    pub fn new(max_requests: u64, window: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            max_requests,
            window,
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.max_requests, Duration::from_millis(config.window_ms))
    }

    /// Record one request for `identifier` at `now`.
    /// Returns true if the request is within the limit.
    pub fn check_and_record(&self, identifier: &str, now: Instant) -> bool {
        let mut inserted = false;
        let allowed = {
            let mut entry = self
                .entries
                .entry(identifier.to_owned())
                .or_insert_with(|| {
                    inserted = true;
                    RateLimitEntry {
                        count: 0,
                        window_reset_at: now + self.window,
                    }
                });

            // A freshly inserted entry has count 0 and falls through to the increment.
            if now > entry.window_reset_at {
                *entry = RateLimitEntry {
                    count: 1,
                    window_reset_at: now + self.window,
                };
                true
            } else {
                entry.count += 1;
                entry.count <= self.max_requests
            }
        };

        // Outside the shard lock.
        if inserted {
            metrics::record_registry_insert();
        }
        allowed
    }

    /// Remove every entry whose window ended before `now`.
    /// Returns the number of entries removed.
    pub fn sweep(&self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| now <= entry.window_reset_at);
        before.saturating_sub(self.entries.len())
    }

    pub fn get(&self, identifier: &str) -> Option<RateLimitEntry> {
        self.entries.get(identifier).map(|e| *e.value())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_requests(&self) -> u64 {
        self.max_requests
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Seconds a rejected client should wait, rounded up.
    pub fn retry_after_secs(&self) -> u64 {
        let millis = self.window.as_millis() as u64;
        millis.div_ceil(1000)
    }
}

/// Run `sweep` every `interval` until the shutdown signal fires.
pub fn spawn_sweeper(
    registry: Arc<RateLimitRegistry>,
    interval: Duration,
    mut shutdown: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = registry.sweep(Instant::now());
                    metrics::record_sweep(removed, registry.len());
                    tracing::debug!(
                        removed,
                        remaining = registry.len(),
                        "Rate limit sweep finished"
                    );
                }
                _ = shutdown.recv() => {
                    tracing::debug!("Rate limit sweeper stopping");
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(60_000);

    #[test]
    fn test_exactly_max_requests_per_window() {
        let registry = RateLimitRegistry::new(100, WINDOW);
        let now = Instant::now();

        for i in 0..100 {
            assert!(registry.check_and_record("X", now), "request {} should pass", i + 1);
        }
        assert!(!registry.check_and_record("X", now));
        assert!(!registry.check_and_record("X", now + Duration::from_millis(59_999)));
        assert_eq!(registry.get("X").unwrap().count, 102);
    }

    #[test]
    fn test_identifiers_are_independent() {
        let registry = RateLimitRegistry::new(1, WINDOW);
        let now = Instant::now();

        assert!(registry.check_and_record("a", now));
        assert!(!registry.check_and_record("a", now));
        assert!(registry.check_and_record("b", now));
    }

    #[test]
    fn test_window_resets_after_expiry() {
        let registry = RateLimitRegistry::new(2, WINDOW);
        let start = Instant::now();

        assert!(registry.check_and_record("X", start));
        assert!(registry.check_and_record("X", start));
        assert!(!registry.check_and_record("X", start));

        // The reset instant itself still belongs to the old window.
        assert!(!registry.check_and_record("X", start + WINDOW));

        let later = start + WINDOW + Duration::from_millis(1);
        assert!(registry.check_and_record("X", later));
        let entry = registry.get("X").unwrap();
        assert_eq!(entry.count, 1);
        assert_eq!(entry.window_reset_at, later + WINDOW);
    }

    #[test]
    fn test_sweep_removes_only_expired() {
        let registry = RateLimitRegistry::new(10, WINDOW);
        let start = Instant::now();

        registry.check_and_record("old", start);
        registry.check_and_record("fresh", start + Duration::from_millis(30_000));

        let removed = registry.sweep(start + WINDOW + Duration::from_millis(1));
        assert_eq!(removed, 1);
        assert!(registry.get("old").is_none());
        assert!(registry.get("fresh").is_some());
    }

    #[test]
    fn test_sweep_keeps_entry_at_reset_instant() {
        let registry = RateLimitRegistry::new(10, WINDOW);
        let start = Instant::now();

        registry.check_and_record("X", start);
        assert_eq!(registry.sweep(start + WINDOW), 0);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_retry_after_rounds_up() {
        assert_eq!(RateLimitRegistry::new(1, WINDOW).retry_after_secs(), 60);
        assert_eq!(
            RateLimitRegistry::new(1, Duration::from_millis(1_500)).retry_after_secs(),
            2
        );
    }

    #[test]
    fn test_concurrent_requests_never_exceed_limit() {
        let registry = Arc::new(RateLimitRegistry::new(50, WINDOW));
        let now = Instant::now();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    (0..25)
                        .filter(|_| registry.check_and_record("shared", now))
                        .count()
                })
            })
            .collect();

        let allowed: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(allowed, 50);
    }

    #[test]
    fn test_sweep_never_drops_an_active_window() {
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::sync::Barrier;

        const MAX: u64 = 50;
        let registry = Arc::new(RateLimitRegistry::new(MAX, WINDOW));
        let start = Instant::now();
        registry.check_and_record("active", start);

        // Every sweep and every request runs at a time past the first window,
        // so the sweep sees the original entry as expired until it is renewed.
        let now = start + WINDOW + Duration::from_millis(1);
        let done = Arc::new(AtomicBool::new(false));
        let ready = Arc::new(Barrier::new(5));

        let sweeper = {
            let registry = registry.clone();
            let done = done.clone();
            let ready = ready.clone();
            std::thread::spawn(move || {
                ready.wait();
                let mut sweeps = 0u64;
                loop {
                    registry.sweep(now);
                    sweeps += 1;
                    if done.load(Ordering::SeqCst) {
                        break sweeps;
                    }
                }
            })
        };

        let requesters: Vec<_> = (0..4)
            .map(|_| {
                let registry = registry.clone();
                let ready = ready.clone();
                std::thread::spawn(move || {
                    ready.wait();
                    (0..100)
                        .filter(|_| registry.check_and_record("active", now))
                        .count()
                })
            })
            .collect();

        let allowed: usize = requesters.into_iter().map(|h| h.join().unwrap()).sum();
        done.store(true, Ordering::SeqCst);
        assert!(sweeper.join().unwrap() > 0);

        // A sweep that deleted the renewed entry would have restarted the count.
        assert_eq!(allowed, MAX as usize);
        let entry = registry.get("active").expect("active entry was swept");
        assert_eq!(entry.count, 400);
        assert_eq!(entry.window_reset_at, now + WINDOW);
        assert_eq!(registry.sweep(now), 0);
    }

    #[test]
    fn test_entries_gauge_tracks_inserts_between_sweeps() {
        use metrics_exporter_prometheus::PrometheusBuilder;

        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        let registry = RateLimitRegistry::new(10, WINDOW);
        let start = Instant::now();

        ::metrics::with_local_recorder(&recorder, || {
            registry.check_and_record("a", start);
            registry.check_and_record("a", start);
            registry.check_and_record("b", start);
        });
        assert!(handle.render().contains("gatekeeper_rate_limit_entries 2"));

        ::metrics::with_local_recorder(&recorder, || {
            let later = start + WINDOW + Duration::from_millis(1);
            let removed = registry.sweep(later);
            metrics::record_sweep(removed, registry.len());
        });
        assert!(handle.render().contains("gatekeeper_rate_limit_entries 0"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_runs_and_stops_on_shutdown() {
        let registry = Arc::new(RateLimitRegistry::new(10, Duration::from_millis(10)));
        registry.check_and_record("X", Instant::now() - Duration::from_secs(1));

        let (tx, rx) = broadcast::channel(1);
        let handle = spawn_sweeper(registry.clone(), Duration::from_secs(1), rx);

        tokio::time::sleep(Duration::from_millis(1_100)).await;
        assert!(registry.is_empty());

        tx.send(()).unwrap();
        handle.await.unwrap();
    }
}
