use crate::utils::time::current_timestamp;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for the dispatch pipeline and the tracking poll
pub struct SyncMetrics {
    pub fetches_started: AtomicU64,
    pub fetches_applied: AtomicU64,
    pub fetches_failed: AtomicU64,
    pub fetches_superseded: AtomicU64,
    pub fetches_dropped: AtomicU64,
    pub mutations_succeeded: AtomicU64,
    pub mutations_failed: AtomicU64,
    pub polls: AtomicU64,
    pub start_time: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub fetches_started: u64,
    pub fetches_applied: u64,
    pub fetches_failed: u64,
    pub fetches_superseded: u64,
    /// Results discarded because the owning view was disposed
    pub fetches_dropped: u64,
    pub fetch_success_rate: f64,
    pub mutations_succeeded: u64,
    pub mutations_failed: u64,
    pub polls: u64,
    pub uptime_seconds: i64,
}

impl SyncMetrics {
    pub fn new() -> Self {
        Self {
            fetches_started: AtomicU64::new(0),
            fetches_applied: AtomicU64::new(0),
            fetches_failed: AtomicU64::new(0),
            fetches_superseded: AtomicU64::new(0),
            fetches_dropped: AtomicU64::new(0),
            mutations_succeeded: AtomicU64::new(0),
            mutations_failed: AtomicU64::new(0),
            polls: AtomicU64::new(0),
            start_time: current_timestamp(),
        }
    }

    pub fn increment(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let fetches_applied = self.fetches_applied.load(Ordering::Relaxed);
        let fetches_failed = self.fetches_failed.load(Ordering::Relaxed);

        let resolved = fetches_applied + fetches_failed;
        let fetch_success_rate = if resolved > 0 {
            (fetches_applied as f64 / resolved as f64) * 100.0
        } else {
            0.0
        };

        MetricsSnapshot {
            fetches_started: self.fetches_started.load(Ordering::Relaxed),
            fetches_applied,
            fetches_failed,
            fetches_superseded: self.fetches_superseded.load(Ordering::Relaxed),
            fetches_dropped: self.fetches_dropped.load(Ordering::Relaxed),
            fetch_success_rate,
            mutations_succeeded: self.mutations_succeeded.load(Ordering::Relaxed),
            mutations_failed: self.mutations_failed.load(Ordering::Relaxed),
            polls: self.polls.load(Ordering::Relaxed),
            uptime_seconds: (current_timestamp() - self.start_time).max(0),
        }
    }
}

impl Default for SyncMetrics {
    fn default() -> Self {
        Self::new()
    }
}
