//! Listing cache with TTL (Time-To-Live) support.
//!
//! [`CacheStore`] is the key/value interface the aggregator writes merged
//! listings to; [`MemoryCache`] is an in-process implementation. Entries
//! expire on a monotonic clock and are never invalidated explicitly.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::error::CacheError;

/// A grouped key/value store with per-entry TTL.
///
/// Concurrent readers and writers may race; the last write wins.
pub trait CacheStore: Send + Sync {
    /// Returns the live value stored under `(group, key)`.
    fn get(&self, group: &str, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Stores `value` under `(group, key)` for `ttl`.
    fn set(
        &self,
        group: &str,
        key: &str,
        value: Vec<u8>,
        ttl: Duration,
    ) -> Result<(), CacheError>;
}

/// Cache entry with its expiry instant.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: Vec<u8>,
    /// When the entry expires (monotonic clock).
    expires_at: Instant,
}

impl CacheEntry {
    fn new(value: Vec<u8>, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

type Entries = HashMap<(String, String), CacheEntry>;

/// In-process cache store.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<Entries>,
}

impl MemoryCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes all expired entries.
    ///
    /// Every write already does this; calling it directly frees memory
    /// between writes.
    pub fn evict_expired(&self) -> Result<usize, CacheError> {
        let mut entries = self.lock()?;
        Ok(sweep(&mut entries))
    }

    /// Returns the number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, Entries>, CacheError> {
        self.entries
            .lock()
            .map_err(|_| CacheError::Unavailable("cache lock poisoned".to_string()))
    }
}

fn sweep(entries: &mut Entries) -> usize {
    let before = entries.len();
    entries.retain(|(group, key), entry| {
        let keep = !entry.is_expired();
        if !keep {
            trace!(group = %group, key = %key, "Evicting expired cache entry");
        }
        keep
    });
    let evicted = before - entries.len();
    if evicted > 0 {
        debug!(evicted = evicted, "Evicted expired cache entries");
    }
    evicted
}

impl CacheStore for MemoryCache {
    fn get(&self, group: &str, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut entries = self.lock()?;
        let id = (group.to_string(), key.to_string());
        let expired = match entries.get(&id) {
            Some(entry) if !entry.is_expired() => return Ok(Some(entry.value.clone())),
            Some(_) => true,
            None => false,
        };
        if expired {
            trace!(group = %group, key = %key, "Dropping expired cache entry");
            entries.remove(&id);
        }
        Ok(None)
    }

    fn set(
        &self,
        group: &str,
        key: &str,
        value: Vec<u8>,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let mut entries = self.lock()?;
        sweep(&mut entries);
        entries.insert(
            (group.to_string(), key.to_string()),
            CacheEntry::new(value, ttl),
        );
        debug!(group = %group, key = %key, ttl_secs = ttl.as_secs(), "Stored cache entry");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn set_and_get() {
        let cache = MemoryCache::new();
        cache
            .set("list", "k1", b"[]".to_vec(), Duration::from_secs(60))
            .unwrap();

        assert_eq!(cache.get("list", "k1").unwrap(), Some(b"[]".to_vec()));
        assert_eq!(cache.get("list", "missing").unwrap(), None);
    }

    #[test]
    fn groups_do_not_collide() {
        let cache = MemoryCache::new();
        cache
            .set("list", "k1", b"list".to_vec(), Duration::from_secs(60))
            .unwrap();
        cache
            .set("search", "k1", b"search".to_vec(), Duration::from_secs(60))
            .unwrap();

        assert_eq!(cache.get("list", "k1").unwrap(), Some(b"list".to_vec()));
        assert_eq!(cache.get("search", "k1").unwrap(), Some(b"search".to_vec()));
    }

    #[test]
    fn entries_expire() {
        let cache = MemoryCache::new();
        cache
            .set("list", "k1", b"[]".to_vec(), Duration::from_millis(50))
            .unwrap();

        assert!(cache.get("list", "k1").unwrap().is_some());
        thread::sleep(Duration::from_millis(60));
        assert!(cache.get("list", "k1").unwrap().is_none());
    }

    #[test]
    fn last_write_wins() {
        let cache = MemoryCache::new();
        cache
            .set("list", "k1", b"a".to_vec(), Duration::from_secs(60))
            .unwrap();
        cache
            .set("list", "k1", b"b".to_vec(), Duration::from_secs(60))
            .unwrap();

        assert_eq!(cache.get("list", "k1").unwrap(), Some(b"b".to_vec()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn expired_entries_do_not_accumulate() {
        let cache = MemoryCache::new();
        cache
            .set("list", "monday", b"a".to_vec(), Duration::from_millis(50))
            .unwrap();
        thread::sleep(Duration::from_millis(60));
        cache
            .set("list", "tuesday", b"b".to_vec(), Duration::from_secs(60))
            .unwrap();

        assert_eq!(cache.len(), 1);
        assert!(cache.get("list", "tuesday").unwrap().is_some());
    }

    #[test]
    fn reading_an_expired_entry_drops_it() {
        let cache = MemoryCache::new();
        cache
            .set("list", "k1", b"a".to_vec(), Duration::from_millis(50))
            .unwrap();
        thread::sleep(Duration::from_millis(60));

        assert!(cache.get("list", "k1").unwrap().is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn evict_expired() {
        let cache = MemoryCache::new();
        cache
            .set("list", "short", b"a".to_vec(), Duration::from_millis(50))
            .unwrap();
        cache
            .set("list", "long", b"b".to_vec(), Duration::from_secs(60))
            .unwrap();

        thread::sleep(Duration::from_millis(60));

        assert_eq!(cache.evict_expired().unwrap(), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.get("list", "long").unwrap().is_some());
    }
}
