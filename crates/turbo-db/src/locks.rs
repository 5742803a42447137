//! Per-key mutual exclusion.

use parking_lot::lock_api::ArcMutexGuard;
use parking_lot::{Mutex, RawMutex};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

/// Idle lock slots are pruned once the map grows past this size.
const PRUNE_THRESHOLD: usize = 1024;

/// Guard returned by [`KeyedLocks::lock`]. The key is locked until it drops.
pub type KeyGuard = ArcMutexGuard<RawMutex, ()>;

/// A set of mutexes, one per key.
///
/// Holding the lock for one key never blocks work on another key, which is
/// what row-level locking looks like without a database underneath.
#[derive(Debug)]
pub struct KeyedLocks<K> {
    slots: Mutex<HashMap<K, Arc<Mutex<()>>>>,
}

impl<K> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash + Clone> KeyedLocks<K> {
    /// Create an empty lock set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until the lock for `key` is held.
    pub fn lock(&self, key: &K) -> KeyGuard {
        let slot = {
            let mut slots = self.slots.lock();
            if slots.len() > PRUNE_THRESHOLD {
                slots.retain(|_, slot| Arc::strong_count(slot) > 1);
            }
            Arc::clone(slots.entry(key.clone()).or_default())
        };
        slot.lock_arc()
    }

    /// Try to take the lock for `key` without blocking.
    pub fn try_lock(&self, key: &K) -> Option<KeyGuard> {
        let slot = Arc::clone(self.slots.lock().entry(key.clone()).or_default());
        slot.try_lock_arc()
    }

    /// Number of lock slots currently tracked.
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    /// Check if no slots are tracked.
    pub fn is_empty(&self) -> bool {
        self.slots.lock().is_empty()
    }
}
