//! In-memory response cache with TTL expiry and pattern invalidation.
//!
//! One instance is constructed per app session and injected into the
//! query services; tests build their own isolated instances. Entries are
//! raw `serde_json::Value`s keyed by request identity, so a single fetch
//! can feed any typed consumer.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use tracing::debug;

use crate::api::ApiError;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    stored_at: DateTime<Utc>,
}

impl CacheEntry {
    fn is_fresh(&self, ttl: Duration) -> bool {
        Utc::now() - self.stored_at < ttl
    }
}

#[derive(Debug, Default)]
pub struct ResponseCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    /// Bumped on every invalidation. A fetch that started before the bump
    /// must not store its result: a late response would otherwise clobber
    /// a just-invalidated entry.
    generation: AtomicU64,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh-entry lookup. A stale entry is treated as absent and dropped
    /// here (lazy expiry; no background sweep).
    fn lookup(&self, key: &str, ttl: Duration) -> Option<Value> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some(entry) if entry.is_fresh(ttl) => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Return the cached value for `key` if fresh; otherwise run `fetch`,
    /// store its result, and return it. A failed fetch caches nothing and
    /// propagates the error.
    ///
    /// Overlapping misses on the same key may each invoke `fetch`; the
    /// duplicate-fetch window is an accepted cost, never a correctness
    /// issue - values are stored and cloned out whole.
    pub async fn get_with<F, Fut>(&self, key: &str, ttl: Duration, fetch: F) -> Result<Value, ApiError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, ApiError>>,
    {
        if let Some(hit) = self.lookup(key, ttl) {
            debug!(key, "cache hit");
            return Ok(hit);
        }

        let started_gen = self.generation.load(Ordering::Acquire);
        debug!(key, "cache miss - fetching");
        let value = fetch().await?;

        let mut entries = self.entries.lock().unwrap();
        if self.generation.load(Ordering::Acquire) == started_gen {
            entries.insert(
                key.to_string(),
                CacheEntry {
                    value: value.clone(),
                    stored_at: Utc::now(),
                },
            );
        } else {
            // An invalidation ran while the fetch was in flight; the
            // response may predate the write that triggered it.
            debug!(key, "cache store skipped - invalidated during fetch");
        }
        Ok(value)
    }

    /// Store a value directly. Used to repopulate single-resource keys
    /// from authoritative write responses.
    pub fn put(&self, key: &str, value: Value) {
        self.entries.lock().unwrap().insert(
            key.to_string(),
            CacheEntry {
                value,
                stored_at: Utc::now(),
            },
        );
    }

    /// Remove every entry whose key contains `pattern` as a substring, or
    /// all entries when `pattern` is `None`. Matching nothing is not an
    /// error.
    pub fn invalidate(&self, pattern: Option<&str>) {
        // Bump first: in-flight fetches that complete after this point
        // must not store.
        self.generation.fetch_add(1, Ordering::AcqRel);
        let mut entries = self.entries.lock().unwrap();
        match pattern {
            Some(pattern) => {
                let before = entries.len();
                entries.retain(|key, _| !key.contains(pattern));
                debug!(pattern, removed = before - entries.len(), "cache invalidated");
            }
            None => {
                entries.clear();
                debug!("cache cleared");
            }
        }
    }

    /// Drop entries older than `ttl`. Optional memory-hygiene sweep for
    /// keys that are never read again.
    pub fn purge_expired(&self, ttl: Duration) {
        let mut entries = self.entries.lock().unwrap();
        entries.retain(|_, entry| entry.is_fresh(ttl));
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Age an entry in place so tests can cross TTL boundaries without
    /// sleeping.
    #[cfg(test)]
    pub(crate) fn backdate(&self, key: &str, by: Duration) {
        if let Some(entry) = self.entries.lock().unwrap().get_mut(key) {
            entry.stored_at = entry.stored_at - by;
        }
    }
}
