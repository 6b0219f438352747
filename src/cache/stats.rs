//! Cache Statistics Module
//!
//! Tracks cache and lock activity: hits, misses, lazy expirations and
//! lock contention.

use serde::Serialize;

// == Cache Stats ==
/// Counters describing store activity since process start.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Number of `get` calls that returned a live value
    pub hits: u64,
    /// Number of `get` calls that found nothing (absent or expired)
    pub misses: u64,
    /// Number of entries removed because their expiry had passed
    pub expirations: u64,
    /// Number of successful lock acquisitions
    pub lock_acquisitions: u64,
    /// Number of lock attempts rejected as already locked
    pub lock_contentions: u64,
    /// Current number of entries in the map, locks included
    pub total_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Record Hit ==
    /// Increments the hit counter.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    // == Record Miss ==
    /// Increments the miss counter.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Record Expirations ==
    /// Adds `count` entries dropped after their expiry passed.
    pub fn record_expirations(&mut self, count: usize) {
        self.expirations += count as u64;
    }

    // == Record Lock Acquired ==
    /// Increments the successful lock acquisition counter.
    pub fn record_lock_acquired(&mut self) {
        self.lock_acquisitions += 1;
    }

    // == Record Lock Contention ==
    /// Increments the rejected lock attempt counter.
    pub fn record_lock_contention(&mut self) {
        self.lock_contentions += 1;
    }

    // == Update Entry Count ==
    /// Updates the total entries count.
    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}
