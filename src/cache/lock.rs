//! Resource Lock Module
//!
//! Non-blocking, time-boxed exclusive leases stored in the cache map under
//! the `lock:<resource>` namespace.

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::debug;

use crate::cache::{CacheEntry, CacheStore, LOCK_PREFIX};
use crate::error::{CacheError, Result};

/// Marker value stored in a lock entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockMarker {
    pub locked: bool,
    /// Identifies the acquisition that created the entry
    pub lease: u64,
}

/// Returns the namespaced map key for a resource lock.
pub fn lock_key(resource: &str) -> String {
    format!("{}{}", LOCK_PREFIX, resource)
}

impl CacheStore {
    // == Try Lock ==
    /// Acquires the lock on `resource` if no live lock exists.
    ///
    /// The existence check and the insert happen under the same `&mut self`
    /// borrow. A lock whose safety timeout has passed counts as released and
    /// is replaced. Returns the lease id of the new lock.
    pub fn try_lock(&mut self, resource: &str) -> Result<u64> {
        validate_resource(resource)?;

        let key = lock_key(resource);
        let now = Instant::now();

        if let Some(existing) = self.entries.get(&key) {
            if !existing.is_expired_at(now) {
                self.stats.record_lock_contention();
                debug!(
                    resource,
                    remaining_ms = existing.ttl_remaining_at(now).as_millis() as u64,
                    "Resource is locked"
                );
                return Err(CacheError::AlreadyLocked(resource.to_string()));
            }
            debug!(resource, "Reclaiming expired lock");
            self.stats.record_expirations(1);
        }

        let lease = self.next_lease + 1;
        let marker = serde_json::to_string(&LockMarker {
            locked: true,
            lease,
        })
        .map_err(|source| CacheError::Encoding {
            key: key.clone(),
            source,
        })?;

        self.next_lease = lease;
        self.entries
            .insert(key, CacheEntry::new(marker, now, self.lock_ttl));
        self.stats.record_lock_acquired();
        self.stats.set_total_entries(self.entries.len());

        debug!(resource, lease, "Lock acquired");
        Ok(lease)
    }

    // == Release Lease ==
    /// Removes the lock on `resource` only if it still belongs to `lease`.
    ///
    /// Returns whether an entry was removed.
    pub fn release_lease(&mut self, resource: &str, lease: u64) -> bool {
        let key = lock_key(resource);
        let owned = self
            .entries
            .get(&key)
            .and_then(|entry| serde_json::from_str::<LockMarker>(&entry.value).ok())
            .is_some_and(|marker| marker.lease == lease);

        if owned {
            self.entries.remove(&key);
            self.stats.set_total_entries(self.entries.len());
            debug!(resource, lease, "Lock released");
        }
        owned
    }

    // == Unlock ==
    /// Removes the lock on `resource` regardless of who holds it.
    ///
    /// Returns whether an entry was removed.
    pub fn unlock(&mut self, resource: &str) -> bool {
        let removed = self.entries.remove(&lock_key(resource)).is_some();
        if removed {
            self.stats.set_total_entries(self.entries.len());
            debug!(resource, "Lock removed by name");
        }
        removed
    }

    // == Is Locked ==
    /// Returns true if a live lock exists on `resource`.
    pub fn is_locked(&self, resource: &str) -> bool {
        let now = Instant::now();
        self.entries
            .get(&lock_key(resource))
            .is_some_and(|entry| !entry.is_expired_at(now))
    }
}

fn validate_resource(resource: &str) -> Result<()> {
    if resource.is_empty() {
        return Err(CacheError::InvalidKey(
            "resource name cannot be empty".to_string(),
        ));
    }
    Ok(())
}
