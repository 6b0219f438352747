//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with expiry support.

use std::time::Duration;

use tokio::time::Instant;

// == Cache Entry ==
/// Represents a single cache entry: serialized payload plus expiry instant.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored value, serialized as JSON text
    pub value: String,
    /// Instant at which the entry stops being visible
    pub expires_at: Instant,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry that expires `ttl` after `now`.
    pub fn new(value: String, now: Instant, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: now + ttl,
        }
    }

    // == Is Expired ==
    /// Checks whether the entry has expired as of `now`.
    ///
    /// Boundary condition: an entry is expired once `now >= expires_at`, so
    /// a lookup made exactly at the TTL mark already misses.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    // == Time To Live ==
    /// Returns the remaining lifetime as of `now`, zero once expired.
    pub fn ttl_remaining_at(&self, now: Instant) -> Duration {
        self.expires_at.saturating_duration_since(now)
    }
}
