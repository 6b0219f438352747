//! Shared Cache Handle
//!
//! The async, cloneable interface the update resolver consumes: `get`,
//! `set`, `lock` and `unlock` over a single `CacheStore`.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::cache::{CacheStats, CacheStore};
use crate::config::Config;
use crate::error::Result;

// == Update Cache ==
/// Thread-safe handle to the process-wide store.
///
/// Cloning yields another handle to the same map.
#[derive(Clone, Debug)]
pub struct UpdateCache {
    store: Arc<RwLock<CacheStore>>,
}

impl UpdateCache {
    /// Wraps an existing store.
    pub fn new(store: CacheStore) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
        }
    }

    /// Creates a store using the configured cache and lock TTLs.
    pub fn from_config(config: &Config) -> Self {
        Self::new(CacheStore::with_lock_ttl(config.cache_ttl, config.lock_ttl))
    }

    /// Returns the live value under `key`, or `None` if absent or expired.
    pub async fn get<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        // Write lock: an expired read evicts the entry
        self.store.write().await.get(key)
    }

    /// Stores `value` under `key` for the configured TTL.
    pub async fn set<T>(&self, key: &str, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        self.store.write().await.set(key, value)
    }

    /// Removes `key`, returning whether it was present.
    pub async fn delete(&self, key: &str) -> Result<bool> {
        self.store.write().await.delete(key)
    }

    /// Acquires the lock on `resource` without waiting.
    ///
    /// Fails with `CacheError::AlreadyLocked` while another live lock exists.
    pub async fn lock(&self, resource: &str) -> Result<ReleaseHandle> {
        let lease = self.store.write().await.try_lock(resource)?;
        Ok(ReleaseHandle {
            store: Arc::clone(&self.store),
            resource: resource.to_string(),
            lease,
        })
    }

    /// Releases the lock on `resource` by name, whoever holds it.
    pub async fn unlock(&self, resource: &str) {
        self.store.write().await.unlock(resource);
    }

    /// Returns true while a live lock exists on `resource`.
    pub async fn is_locked(&self, resource: &str) -> bool {
        self.store.read().await.is_locked(resource)
    }

    /// Removes every expired entry, returning how many were dropped.
    pub async fn cleanup_expired(&self) -> usize {
        self.store.write().await.cleanup_expired()
    }

    pub async fn stats(&self) -> CacheStats {
        self.store.read().await.stats()
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }

    /// Raw existence check that ignores expiry.
    pub async fn contains_key(&self, key: &str) -> bool {
        self.store.read().await.contains_key(key)
    }
}

// == Release Handle ==
/// Capability to release one specific lock acquisition.
///
/// Releasing is idempotent and never touches a lock that has since been
/// re-acquired by someone else.
pub struct ReleaseHandle {
    store: Arc<RwLock<CacheStore>>,
    resource: String,
    lease: u64,
}

impl ReleaseHandle {
    /// Releases the lock if this handle still owns it.
    pub async fn release(&self) {
        self.store
            .write()
            .await
            .release_lease(&self.resource, self.lease);
    }

    /// Name of the locked resource.
    pub fn resource(&self) -> &str {
        &self.resource
    }
}

impl fmt::Debug for ReleaseHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReleaseHandle")
            .field("resource", &self.resource)
            .field("lease", &self.lease)
            .finish()
    }
}
