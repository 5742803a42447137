//! Key-value store with per-entry expiry.

use crate::clock::Clock;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::trace;

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

/// Type-safe in-process cache with a default time-to-live.
///
/// All operations take one short-lived lock. An expired entry stays in
/// place until its key is claimed or deleted again.
pub struct Cache<V> {
    entries: Mutex<HashMap<String, Entry<V>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> Cache<V> {
    /// Create a cache on a custom clock.
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    /// Default time-to-live for new entries.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Get a live value.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        self.entries
            .lock()
            .get(key)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.value.clone())
    }

    /// Store `value` only if no live entry exists for `key`.
    ///
    /// Returns `true` if this call wrote the entry. The check and the write
    /// happen under one lock, so exactly one of several racing callers wins.
    pub fn insert_if_absent(&self, key: &str, value: V) -> bool {
        let now = self.clock.now();
        let mut entries = self.entries.lock();
        if let Some(entry) = entries.get(key) {
            if entry.expires_at > now {
                return false;
            }
            trace!(key, "reclaiming expired cache entry");
        }
        entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: now + self.ttl,
            },
        );
        true
    }

    /// Delete a value. Returns `true` if a live entry was removed.
    pub fn delete(&self, key: &str) -> bool {
        let now = self.clock.now();
        self.entries
            .lock()
            .remove(key)
            .is_some_and(|entry| entry.expires_at > now)
    }

    /// Check if a live entry exists.
    pub fn exists(&self, key: &str) -> bool {
        self.remaining_ttl(key).is_some()
    }

    /// Time left before `key` expires.
    pub fn remaining_ttl(&self, key: &str) -> Option<Duration> {
        let now = self.clock.now();
        self.entries
            .lock()
            .get(key)
            .and_then(|entry| entry.expires_at.checked_duration_since(now))
            .filter(|left| !left.is_zero())
    }

    /// Remove everything.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Number of stored entries, live or not yet purged.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Check if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl<V> std::fmt::Debug for Cache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("ttl", &self.ttl)
            .field("entries", &self.entries.lock().len())
            .finish()
    }
}

/// Helper to build cache keys with namespacing.
///
/// # Example
///
/// ```rust
/// use turbo_cache::cache_key;
///
/// let key = cache_key!("low-stock", "prod-1");
/// assert_eq!(key, "low-stock:prod-1");
/// ```
#[macro_export]
macro_rules! cache_key {
    ($prefix:expr, $($part:expr),+) => {{
        let mut key = String::from($prefix);
        $(
            key.push(':');
            key.push_str(&$part.to_string());
        )+
        key
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ManualClock;

    fn cache(ttl_secs: u64) -> (Cache<u32>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let cache = Cache::with_clock(Duration::from_secs(ttl_secs), clock.clone());
        (cache, clock)
    }

    #[test]
    fn test_claim_expires_after_ttl() {
        let (cache, clock) = cache(10);
        assert!(cache.insert_if_absent("a", 1));
        assert!(cache.exists("a"));
        assert!(!cache.exists("b"));
        clock.advance(Duration::from_secs(9));
        assert!(cache.exists("a"));
        clock.advance(Duration::from_secs(1));
        assert!(!cache.exists("a"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_insert_if_absent_respects_live_entries() {
        let (cache, clock) = cache(10);
        assert!(cache.insert_if_absent("a", 1));
        assert!(!cache.insert_if_absent("a", 2));
        assert_eq!(cache.get("a"), Some(1));

        clock.advance(Duration::from_secs(10));
        assert!(cache.get("a").is_none());
        assert!(cache.insert_if_absent("a", 3));
        assert_eq!(cache.get("a"), Some(3));
        assert_eq!(cache.remaining_ttl("a"), Some(Duration::from_secs(10)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_insert_if_absent_single_winner() {
        let (cache, _) = cache(60);
        let wins = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let cache = &cache;
                    s.spawn(move || cache.insert_if_absent("k", i))
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .filter(|won| *won)
                .count()
        });
        assert_eq!(wins, 1);
    }

    #[test]
    fn test_delete_and_remaining_ttl() {
        let (cache, clock) = cache(30);
        cache.insert_if_absent("a", 1);
        clock.advance(Duration::from_secs(10));
        assert_eq!(cache.remaining_ttl("a"), Some(Duration::from_secs(20)));
        assert!(cache.delete("a"));
        assert!(!cache.delete("a"));
        assert!(cache.remaining_ttl("a").is_none());
        assert!(cache.insert_if_absent("a", 2));
    }

    #[test]
    fn test_clear() {
        let (cache, _) = cache(30);
        cache.insert_if_absent("a", 1);
        cache.insert_if_absent("b", 2);
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.insert_if_absent("a", 3));
    }

    #[test]
    fn test_cache_key_macro() {
        let key = cache_key!("cart", "user123", 7);
        assert_eq!(key, "cart:user123:7");
    }
}
