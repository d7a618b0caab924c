//! Time-bounded response cache.
//!
//! Responses are stored as JSON values under caller-supplied keys such as
//! `goals` or `calendar:2024-03`. Entries expire after the cache TTL; an
//! expired entry is evicted the first time it is read.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Cache hit/miss statistics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    /// Entries dropped because their TTL ran out
    pub expired: usize,
}

impl CacheStats {
    /// Calculate cache hit rate (0.0 to 1.0)
    pub fn hit_rate(&self) -> f64 {
        let queries = self.hits + self.misses;
        if queries == 0 {
            0.0
        } else {
            self.hits as f64 / queries as f64
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: serde_json::Value,
    inserted_at: Instant,
}

impl CacheEntry {
    fn is_expired_at(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.inserted_at) >= ttl
    }
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    stats: CacheStats,
}

/// In-memory TTL cache shared by API calls
#[derive(Debug)]
pub struct ResponseCache {
    ttl: Duration,
    state: Mutex<CacheState>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            state: Mutex::new(CacheState::default()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh cached value for `key`, if any
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get_at(key, Instant::now())
    }

    fn get_at<T: DeserializeOwned>(&self, key: &str, now: Instant) -> Option<T> {
        let mut state = self.lock();

        let expired = match state.entries.get(key) {
            None => {
                state.stats.misses += 1;
                return None;
            }
            Some(entry) => entry.is_expired_at(now, self.ttl),
        };

        if expired {
            state.entries.remove(key);
            state.stats.expired += 1;
            state.stats.misses += 1;
            tracing::debug!(key, "Cache entry expired");
            return None;
        }

        let value = state.entries.get(key).map(|e| e.value.clone())?;
        match serde_json::from_value(value) {
            Ok(v) => {
                state.stats.hits += 1;
                tracing::debug!(key, "Cache hit");
                Some(v)
            }
            Err(e) => {
                // Same key cached with a different shape; treat as a miss
                tracing::warn!(key, "Discarding cache entry that failed to decode: {}", e);
                state.entries.remove(key);
                state.stats.misses += 1;
                None
            }
        }
    }

    /// Store `value` under `key`, replacing any previous entry
    pub fn insert<T: Serialize>(&self, key: &str, value: &T) {
        self.insert_at(key, value, Instant::now());
    }

    fn insert_at<T: Serialize>(&self, key: &str, value: &T, now: Instant) {
        match serde_json::to_value(value) {
            Ok(value) => {
                self.lock().entries.insert(
                    key.to_string(),
                    CacheEntry {
                        value,
                        inserted_at: now,
                    },
                );
            }
            Err(e) => tracing::warn!(key, "Not caching value that failed to serialize: {}", e),
        }
    }

    pub fn invalidate(&self, key: &str) -> bool {
        self.lock().entries.remove(key).is_some()
    }

    /// Drop every key starting with `prefix`; returns how many were removed
    pub fn invalidate_prefix(&self, prefix: &str) -> usize {
        let mut state = self.lock();
        let before = state.entries.len();
        state.entries.retain(|k, _| !k.starts_with(prefix));
        before - state.entries.len()
    }

    /// Evict every expired entry
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Instant::now())
    }

    fn purge_expired_at(&self, now: Instant) -> usize {
        let ttl = self.ttl;
        let mut state = self.lock();
        let before = state.entries.len();
        state.entries.retain(|_, e| !e.is_expired_at(now, ttl));
        let removed = before - state.entries.len();
        state.stats.expired += removed;
        removed
    }

    pub fn clear(&self) {
        self.lock().entries.clear();
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        self.lock().stats.clone()
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        // A panic while holding the lock cannot leave the map half-written
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(300))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        cache.insert("goals", &vec!["a".to_string(), "b".to_string()]);

        let hit: Option<Vec<String>> = cache.get("goals");
        assert_eq!(hit, Some(vec!["a".to_string(), "b".to_string()]));

        let miss: Option<Vec<String>> = cache.get("workouts");
        assert!(miss.is_none());

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hit_rate(), 0.5);
    }

    #[test]
    fn test_entries_expire_after_ttl() {
        let ttl = Duration::from_secs(60);
        let cache = ResponseCache::new(ttl);
        let start = Instant::now();
        cache.insert_at("score", &42u32, start);

        assert_eq!(cache.get_at::<u32>("score", start + Duration::from_secs(59)), Some(42));
        assert_eq!(cache.get_at::<u32>("score", start + ttl), None);

        // Expired entry was evicted on read
        assert!(cache.is_empty());
        assert_eq!(cache.stats().expired, 1);
    }

    #[test]
    fn test_purge_expired() {
        let cache = ResponseCache::new(Duration::from_secs(10));
        let start = Instant::now();
        cache.insert_at("old", &1u8, start);
        cache.insert_at("new", &2u8, start + Duration::from_secs(8));

        assert_eq!(cache.purge_expired_at(start + Duration::from_secs(12)), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_invalidate_prefix() {
        let cache = ResponseCache::default();
        cache.insert("calendar:2024-03", &1u8);
        cache.insert("calendar:2024-04", &2u8);
        cache.insert("goals", &3u8);

        assert_eq!(cache.invalidate_prefix("calendar:"), 2);
        assert_eq!(cache.len(), 1);
        assert!(cache.invalidate("goals"));
        assert!(!cache.invalidate("goals"));
    }

    #[test]
    fn test_shape_mismatch_is_a_miss() {
        let cache = ResponseCache::default();
        cache.insert("score", &"not a number");
        assert_eq!(cache.get::<u32>("score"), None);
        assert!(cache.is_empty());
    }
}
