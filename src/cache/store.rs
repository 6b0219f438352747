//! Cache Store Module
//!
//! Main cache engine: a HashMap of serialized entries with a single
//! process-wide TTL and lazy eviction on read.

use std::collections::HashMap;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::time::Instant;
use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, LOCK_PREFIX};
use crate::error::{CacheError, Result};

// == Cache Store ==
/// Expiring key-value storage shared by cached values and resource locks.
#[derive(Debug)]
pub struct CacheStore {
    /// Key-value storage; lock entries live under `lock:<resource>`
    pub(super) entries: HashMap<String, CacheEntry>,
    /// Activity counters
    pub(super) stats: CacheStats,
    /// Lifetime of every cached value
    ttl: Duration,
    /// Safety timeout of every lock entry
    pub(super) lock_ttl: Duration,
    /// Last lease id handed out by `try_lock`
    pub(super) next_lease: u64,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new CacheStore whose locks share the value TTL.
    pub fn new(ttl: Duration) -> Self {
        Self::with_lock_ttl(ttl, ttl)
    }

    /// Creates a new CacheStore with a separate lock safety timeout.
    pub fn with_lock_ttl(ttl: Duration, lock_ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::new(),
            ttl,
            lock_ttl,
            next_lease: 0,
        }
    }

    // == Set ==
    /// Serializes `value` and stores it under `key`, expiring `ttl` from now.
    ///
    /// Existing entries are overwritten unconditionally. On a serialization
    /// failure the map is left untouched.
    pub fn set<T>(&mut self, key: &str, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        validate_key(key)?;

        let encoded = serde_json::to_string(value).map_err(|source| CacheError::Encoding {
            key: key.to_string(),
            source,
        })?;

        let entry = CacheEntry::new(encoded, Instant::now(), self.ttl);
        self.entries.insert(key.to_string(), entry);
        self.stats.set_total_entries(self.entries.len());

        debug!(key, ttl_ms = self.ttl.as_millis() as u64, "Cache set");
        Ok(())
    }

    // == Get ==
    /// Retrieves and deserializes the value stored under `key`.
    ///
    /// Returns `Ok(None)` for missing keys. An expired entry is removed
    /// before `Ok(None)` is returned.
    pub fn get<T>(&mut self, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        validate_key(key)?;

        let now = Instant::now();
        let entry = match self.entries.get(key) {
            Some(entry) => entry,
            None => {
                self.stats.record_miss();
                debug!(key, "Cache miss");
                return Ok(None);
            }
        };

        if entry.is_expired_at(now) {
            self.entries.remove(key);
            self.stats.record_expirations(1);
            self.stats.record_miss();
            self.stats.set_total_entries(self.entries.len());
            debug!(key, "Cache entry expired");
            return Ok(None);
        }

        let value = serde_json::from_str(&entry.value).map_err(|source| CacheError::Decoding {
            key: key.to_string(),
            source,
        })?;
        self.stats.record_hit();
        debug!(key, "Cache hit");
        Ok(Some(value))
    }

    // == Delete ==
    /// Removes an entry by key, returning whether one was present.
    pub fn delete(&mut self, key: &str) -> Result<bool> {
        validate_key(key)?;

        let removed = self.entries.remove(key).is_some();
        self.stats.set_total_entries(self.entries.len());
        Ok(removed)
    }

    // == Contains Key ==
    /// Raw existence check that ignores expiry and does not evict.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    // == Cleanup Expired ==
    /// Removes all expired entries, locks included.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired_at(now));

        let count = before - self.entries.len();
        self.stats.record_expirations(count);
        self.stats.set_total_entries(self.entries.len());
        count
    }

    /// Returns the configured value TTL.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the configured lock safety timeout.
    pub fn lock_ttl(&self) -> Duration {
        self.lock_ttl
    }

    // == Length ==
    /// Returns the current number of entries, expired-but-unread ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Rejects empty keys and keys inside the lock namespace.
fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::InvalidKey("key cannot be empty".to_string()));
    }
    if key.starts_with(LOCK_PREFIX) {
        return Err(CacheError::InvalidKey(format!(
            "'{}' uses the reserved '{}' prefix",
            key, LOCK_PREFIX
        )));
    }
    Ok(())
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::BTreeMap;

    const TTL: Duration = Duration::from_millis(100);

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Release {
        version: String,
        assets: Vec<String>,
    }

    #[test]
    fn test_store_new() {
        let store = CacheStore::new(TTL);
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert_eq!(store.ttl(), TTL);
        assert_eq!(store.lock_ttl(), TTL);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let mut store = CacheStore::new(TTL);
        let value: Option<String> = store.get("nonexistent").unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_store_set_and_get_struct() {
        let mut store = CacheStore::new(Duration::from_secs(60));
        let release = Release {
            version: "1.2.3".to_string(),
            assets: vec!["app-darwin.zip".to_string()],
        };

        store.set("latest:org/app", &release).unwrap();
        let cached: Option<Release> = store.get("latest:org/app").unwrap();

        assert_eq!(cached, Some(release));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_overwrite() {
        let mut store = CacheStore::new(Duration::from_secs(60));

        store.set("key1", "value1").unwrap();
        store.set("key1", "value2").unwrap();

        let value: Option<String> = store.get("key1").unwrap();
        assert_eq!(value.as_deref(), Some("value2"));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_ttl_expiration_evicts() {
        let mut store = CacheStore::new(TTL);
        store.set("a", &serde_json::json!({ "v": 1 })).unwrap();

        tokio::time::advance(Duration::from_millis(50)).await;
        let value: Option<serde_json::Value> = store.get("a").unwrap();
        assert_eq!(value, Some(serde_json::json!({ "v": 1 })));

        tokio::time::advance(Duration::from_millis(100)).await;
        let value: Option<serde_json::Value> = store.get("a").unwrap();
        assert!(value.is_none());
        assert!(!store.contains_key("a"), "expired entry must be evicted");
        assert_eq!(store.stats().expirations, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_expired_exactly_at_ttl() {
        let mut store = CacheStore::new(TTL);
        store.set("edge", &1u32).unwrap();

        tokio::time::advance(TTL).await;
        let value: Option<u32> = store.get("edge").unwrap();
        assert!(value.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_set_resets_expiry() {
        let mut store = CacheStore::new(TTL);
        store.set("k", &1u32).unwrap();

        tokio::time::advance(Duration::from_millis(80)).await;
        store.set("k", &2u32).unwrap();

        tokio::time::advance(Duration::from_millis(80)).await;
        let value: Option<u32> = store.get("k").unwrap();
        assert_eq!(value, Some(2));
    }

    #[test]
    fn test_store_decoding_error() {
        let mut store = CacheStore::new(Duration::from_secs(60));
        store.set("k", "not a number").unwrap();

        let result: Result<Option<u64>> = store.get("k");
        assert!(matches!(result, Err(CacheError::Decoding { .. })));
    }

    #[test]
    fn test_store_encoding_error_keeps_previous_value() {
        let mut store = CacheStore::new(Duration::from_secs(60));
        store.set("k", "old").unwrap();

        // JSON object keys must be strings
        let mut bad: BTreeMap<Vec<u8>, u8> = BTreeMap::new();
        bad.insert(vec![1, 2], 3);

        let result = store.set("k", &bad);
        assert!(matches!(result, Err(CacheError::Encoding { .. })));

        let value: Option<String> = store.get("k").unwrap();
        assert_eq!(value.as_deref(), Some("old"));
    }

    #[test]
    fn test_store_delete() {
        let mut store = CacheStore::new(Duration::from_secs(60));

        store.set("key1", "value1").unwrap();
        assert!(store.delete("key1").unwrap());
        assert!(!store.delete("key1").unwrap());
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_rejects_invalid_keys() {
        let mut store = CacheStore::new(TTL);

        assert!(matches!(store.set("", "v"), Err(CacheError::InvalidKey(_))));
        assert!(matches!(
            store.set("lock:repo/x", "v"),
            Err(CacheError::InvalidKey(_))
        ));
        assert!(matches!(
            store.get::<String>(""),
            Err(CacheError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_store_reserves_lock_namespace() {
        let mut store = CacheStore::new(TTL);
        store.try_lock("repo/x").unwrap();

        assert!(matches!(
            store.get::<String>("lock:repo/x"),
            Err(CacheError::InvalidKey(_))
        ));
        assert!(matches!(
            store.delete("lock:repo/x"),
            Err(CacheError::InvalidKey(_))
        ));
        assert!(store.is_locked("repo/x"), "lock entry must be untouched");
    }

    #[test]
    fn test_store_stats() {
        let mut store = CacheStore::new(Duration::from_secs(60));

        store.set("key1", "value1").unwrap();
        let _: Option<String> = store.get("key1").unwrap(); // hit
        let _: Option<String> = store.get("nonexistent").unwrap(); // miss

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_cleanup_expired() {
        let mut store = CacheStore::new(TTL);
        store.set("key1", "value1").unwrap();

        tokio::time::advance(Duration::from_millis(60)).await;
        store.set("key2", "value2").unwrap();

        tokio::time::advance(Duration::from_millis(60)).await;
        let removed = store.cleanup_expired();

        assert_eq!(removed, 1);
        assert_eq!(store.len(), 1);
        assert!(store.contains_key("key2"));
    }
}
