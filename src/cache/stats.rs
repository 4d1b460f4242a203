//! Cache Statistics Module
//!
//! Tracks per-tier hits, misses and absorbed remote failures.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use super::Tier;

// == Cache Stats ==
/// Point-in-time snapshot of cache performance metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Reads answered by the networked tier
    pub remote_hits: u64,
    /// Reads the networked tier could not answer (absent or stale)
    pub remote_misses: u64,
    /// Remote failures absorbed as misses (timeouts, decode failures, write failures)
    pub remote_errors: u64,
    /// Reads answered by the local tier
    pub local_hits: u64,
    /// Reads the local tier could not answer (absent or expired)
    pub local_misses: u64,
    /// Current number of entries held locally, including not-yet-purged expired ones
    pub local_entries: usize,
    /// Whether a networked tier is configured and connected
    pub remote_available: bool,
}

impl CacheStats {
    // == Hit Rate ==
    /// Overall hit rate: a read counts as a hit if either tier answered it.
    ///
    /// Returns 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let hits = self.remote_hits + self.local_hits;
        // Every read that reaches the local tier was a remote miss first, so
        // local outcomes alone count the reads the remote tier did not serve.
        let total = self.remote_hits + self.local_hits + self.local_misses;
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }
}

// == Stats Recorder ==
/// Lock-free counters shared by concurrent callers.
#[derive(Debug, Default)]
pub(crate) struct StatsRecorder {
    remote_hits: AtomicU64,
    remote_misses: AtomicU64,
    remote_errors: AtomicU64,
    local_hits: AtomicU64,
    local_misses: AtomicU64,
}

impl StatsRecorder {
    pub(crate) fn record_hit(&self, tier: Tier) {
        match tier {
            Tier::Networked => self.remote_hits.fetch_add(1, Ordering::Relaxed),
            Tier::Local => self.local_hits.fetch_add(1, Ordering::Relaxed),
        };
    }

    pub(crate) fn record_miss(&self, tier: Tier) {
        match tier {
            Tier::Networked => self.remote_misses.fetch_add(1, Ordering::Relaxed),
            Tier::Local => self.local_misses.fetch_add(1, Ordering::Relaxed),
        };
    }

    pub(crate) fn record_remote_error(&self) {
        self.remote_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, local_entries: usize, remote_available: bool) -> CacheStats {
        CacheStats {
            remote_hits: self.remote_hits.load(Ordering::Relaxed),
            remote_misses: self.remote_misses.load(Ordering::Relaxed),
            remote_errors: self.remote_errors.load(Ordering::Relaxed),
            local_hits: self.local_hits.load(Ordering::Relaxed),
            local_misses: self.local_misses.load(Ordering::Relaxed),
            local_entries,
            remote_available,
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_default() {
        let stats = CacheStats::default();
        assert_eq!(stats.remote_hits, 0);
        assert_eq!(stats.local_misses, 0);
        assert!(!stats.remote_available);
    }

    #[test]
    fn test_hit_rate_no_requests() {
        let stats = CacheStats::default();
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed_tiers() {
        let recorder = StatsRecorder::default();
        // remote hit
        recorder.record_hit(Tier::Networked);
        // remote miss, local hit
        recorder.record_miss(Tier::Networked);
        recorder.record_hit(Tier::Local);
        // remote miss, local miss
        recorder.record_miss(Tier::Networked);
        recorder.record_miss(Tier::Local);
        // remote miss, local miss
        recorder.record_miss(Tier::Networked);
        recorder.record_miss(Tier::Local);

        let stats = recorder.snapshot(3, true);
        assert_eq!(stats.remote_hits, 1);
        assert_eq!(stats.remote_misses, 3);
        assert_eq!(stats.local_hits, 1);
        assert_eq!(stats.local_misses, 2);
        assert_eq!(stats.local_entries, 3);
        assert!((stats.hit_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_record_remote_error() {
        let recorder = StatsRecorder::default();
        recorder.record_remote_error();
        recorder.record_remote_error();
        assert_eq!(recorder.snapshot(0, false).remote_errors, 2);
    }
}
