use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde_json::Value as JsonValue;
use tokio::time::Instant;

use crate::QueryParams;

#[derive(Clone, Debug)]
struct CacheEntry {
    value: JsonValue,
    inserted_at: Instant,
}

/// Time-bounded cache for absolute-URL lookups.
///
/// Entries are usable while `now - inserted_at <= ttl` and are evicted
/// lazily by the lookup that finds them expired. The lock covers map access
/// only; concurrent misses on one key each fetch upstream and the last
/// write wins.
#[derive(Debug)]
pub struct ResponseCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Builds the cache key for an absolute URL and its parameters.
    pub fn key(url: &str, params: &QueryParams) -> String {
        if params.is_empty() {
            url.to_owned()
        } else {
            format!("{url}?{}", params.cache_key_part())
        }
    }

    pub fn get(&self, key: &str) -> Option<JsonValue> {
        let mut entries = self.lock();
        let entry = entries.get(key)?;
        if entry.inserted_at.elapsed() <= self.ttl {
            #[cfg(feature = "tracing")]
            tracing::trace!(key, "cache hit");
            return Some(entry.value.clone());
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(key, "cache entry expired");
        entries.remove(key);
        None
    }

    pub fn set(&self, key: impl Into<String>, value: JsonValue) {
        let entry = CacheEntry {
            value,
            inserted_at: Instant::now(),
        };
        self.lock().insert(key.into(), entry);
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of stored entries, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // Entries are plain values; a panic while holding the lock cannot leave
    // one half-written.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
