//! Key/value caches with expiry
//!
//! Selection results and enrichment lookups are memoized behind
//! [`KeyValueCache`]. [`TtlCache`] is the in-process implementation;
//! [`NoopCache`] disables caching entirely.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::Arc;

use crate::{Clock, SystemClock};

/// Pluggable cache keyed by string
pub trait KeyValueCache<V: Clone>: Send + Sync {
    /// Fetch a live entry
    fn get(&self, key: &str) -> Option<V>;

    /// Store an entry; it expires after the cache's TTL
    fn put(&self, key: &str, value: V);

    /// Drop all entries
    fn clear(&self);
}

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    stored_at: DateTime<Utc>,
}

/// Concurrent in-memory cache with a fixed time-to-live
pub struct TtlCache<V> {
    entries: DashMap<String, Entry<V>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<V: Clone + Send + Sync> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of stored entries, expired ones included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove expired entries
    pub fn purge_expired(&self) {
        let now = self.clock.now();
        self.entries.retain(|_, entry| now - entry.stored_at < self.ttl);
    }
}

impl<V: Clone + Send + Sync> KeyValueCache<V> for TtlCache<V> {
    fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        {
            let entry = self.entries.get(key)?;
            if now - entry.stored_at < self.ttl {
                return Some(entry.value.clone());
            }
        }
        self.entries.remove(key);
        None
    }

    fn put(&self, key: &str, value: V) {
        self.entries.insert(
            key.to_string(),
            Entry {
                value,
                stored_at: self.clock.now(),
            },
        );
    }

    fn clear(&self) {
        self.entries.clear();
    }
}

/// Cache that never stores anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

impl<V: Clone> KeyValueCache<V> for NoopCache {
    fn get(&self, _key: &str) -> Option<V> {
        None
    }

    fn put(&self, _key: &str, _value: V) {}

    fn clear(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ManualClock;

    #[test]
    fn test_entry_expires_after_ttl() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let cache: TtlCache<u32> = TtlCache::with_clock(Duration::minutes(30), clock.clone());

        cache.put("k", 7);
        clock.advance(Duration::minutes(29));
        assert_eq!(cache.get("k"), Some(7));

        clock.advance(Duration::minutes(1));
        assert_eq!(cache.get("k"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear_and_purge() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let cache: TtlCache<String> = TtlCache::with_clock(Duration::minutes(10), clock.clone());
        cache.put("a", "x".into());
        clock.advance(Duration::minutes(11));
        cache.put("b", "y".into());
        cache.purge_expired();
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_noop_cache_stores_nothing() {
        let cache = NoopCache;
        KeyValueCache::<u32>::put(&cache, "k", 1);
        assert_eq!(KeyValueCache::<u32>::get(&cache, "k"), None);
    }
}
