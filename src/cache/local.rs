//! Local Store Module
//!
//! Process-lifetime key/value store with TTL checked on read.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use serde_json::Value;

use super::clock::{Clock, SystemClock};
use super::entry::CacheEntry;

// == Local Store ==
/// In-process cache tier.
///
/// Thread-safe: every operation takes `&self` and synchronizes internally, so
/// a single instance can be shared behind an `Arc` by any number of callers.
/// Unbounded; expired entries are skipped on read and dropped lazily or by
/// [`purge_expired`](Self::purge_expired).
#[derive(Debug)]
pub struct LocalStore {
    entries: RwLock<HashMap<String, CacheEntry>>,
    clock: Arc<dyn Clock>,
}

impl LocalStore {
    // == Constructors ==
    /// Creates an empty store on the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates an empty store on the given clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// The clock this store reads time from.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    // == Get ==
    /// Returns a copy of the value if present and not expired.
    ///
    /// An expired entry is removed on the way out.
    pub fn get(&self, key: &str) -> Option<Value> {
        let now = self.clock.now_ms();

        {
            let entries = self.entries.read();
            match entries.get(key) {
                None => return None,
                Some(entry) if !entry.is_expired(now) => return Some(entry.value.clone()),
                Some(_) => {}
            }
        }

        // Re-check under the write lock: another caller may have refreshed it.
        let mut entries = self.entries.write();
        if entries.get(key).is_some_and(|e| e.is_expired(now)) {
            entries.remove(key);
        }
        None
    }

    // == Set ==
    /// Stores a value, overwriting any previous entry and resetting its TTL.
    pub fn set(&self, key: impl Into<String>, value: Value, ttl: Duration) {
        let entry = CacheEntry::new(value, self.clock.now_ms(), ttl);
        self.entries.write().insert(key.into(), entry);
    }

    // == Delete ==
    /// Removes an entry. Returns whether one was present.
    pub fn delete(&self, key: &str) -> bool {
        self.entries.write().remove(key).is_some()
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    // == Purge Expired ==
    /// Removes all expired entries, returning how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now_ms();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    // == Length ==
    /// Number of stored entries, expired or not.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Default for LocalStore {
    fn default() -> Self {
        Self::new()
    }
}
