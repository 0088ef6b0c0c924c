//! Cache Store Module
//!
//! The key→value container for one named cache. Combines HashMap storage
//! with LRU capacity eviction and TTL expiry per its policy, and feeds the
//! statistics accumulator on every operation.
//!
//! The store guarantees safe concurrent access through its owning lock, but
//! not atomicity of check-then-load across its boundary; that guarantee is
//! provided one layer up by the resolver's per-key load lock.

use std::collections::HashMap;

use serde_json::Value;

use crate::cache::entry::CacheEntry;
use crate::cache::key::CacheKey;
use crate::cache::lru::LruTracker;
use crate::cache::policy::{CachePolicy, EvictionCause};
use crate::cache::stats::{CacheStats, StatsSnapshot};

// == Cache Store ==
/// Storage for one named cache, enforcing one eviction policy.
#[derive(Debug)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<CacheKey, CacheEntry>,
    /// Recency order for capacity eviction
    lru: LruTracker,
    /// Performance counters
    stats: CacheStats,
    /// Eviction policy, fixed at construction
    policy: CachePolicy,
}

impl CacheStore {
    // == Constructor ==
    /// Creates an empty store governed by the given policy.
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            policy,
        }
    }

    // == Get ==
    /// Looks up a value, recording a hit or a miss.
    ///
    /// An expired entry is removed (cause `Expired`) and counted as a miss.
    /// A successful read refreshes the entry's access clock, which extends
    /// its life only under an access-based TTL; a write-based TTL is
    /// unaffected by reads.
    pub fn get(&mut self, key: &CacheKey) -> Option<Value> {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(&self.policy),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if expired {
            self.remove_entry(key, EvictionCause::Expired);
            self.stats.record_miss();
            return None;
        }

        let entry = self.entries.get_mut(key)?;
        entry.touch();
        let value = entry.value.clone();
        self.lru.touch(key);
        self.stats.record_hit();
        Some(value)
    }

    // == Insert ==
    /// Stores a value, overwriting any existing entry for the key.
    ///
    /// An overwrite resets the entry's write clock. A new insert that would
    /// exceed `max_entries` first evicts the least recently used entries
    /// (cause `Capacity`).
    pub fn insert(&mut self, key: CacheKey, value: Value) {
        let is_overwrite = self.entries.contains_key(&key);

        if !is_overwrite {
            if let Some(max) = self.policy.max_entries {
                while self.entries.len() >= max {
                    let Some(oldest) = self.lru.evict_oldest() else {
                        break;
                    };
                    if let Some(evicted) = self.entries.remove(&oldest) {
                        self.policy
                            .notify_eviction(&oldest, &evicted.value, EvictionCause::Capacity);
                        self.stats.record_eviction(1, EvictionCause::Capacity);
                    }
                }
            }
        }

        self.entries.insert(key.clone(), CacheEntry::new(value));
        self.lru.touch(&key);
    }

    // == Invalidate ==
    /// Removes an entry by key. The eviction callback fires with cause
    /// `Explicit`, which does not count toward eviction statistics.
    ///
    /// Returns true if an entry was present.
    pub fn invalidate(&mut self, key: &CacheKey) -> bool {
        self.remove_entry(key, EvictionCause::Explicit)
    }

    // == Cleanup Expired ==
    /// Removes every expired entry (cause `Expired`), returning how many
    /// were removed. Driven periodically by the background sweeper.
    pub fn cleanup_expired(&mut self) -> usize {
        let expired_keys: Vec<CacheKey> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(&self.policy))
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired_keys.len();
        for key in expired_keys {
            self.remove_entry(&key, EvictionCause::Expired);
        }
        count
    }

    // == Estimated Size ==
    /// Current entry count. This is an estimate: under concurrent mutation
    /// the value may be momentarily out of date, and expired entries linger
    /// until a lookup or the sweeper removes them. Both are acceptable.
    pub fn estimated_size(&self) -> usize {
        self.entries.len()
    }

    // == Load Recording ==
    /// Records a loader invocation that produced a value.
    pub fn record_load_success(&mut self, duration_nanos: u64) {
        self.stats.record_load_success(duration_nanos);
    }

    /// Records a loader invocation that failed.
    pub fn record_load_failure(&mut self, duration_nanos: u64) {
        self.stats.record_load_failure(duration_nanos);
    }

    // == Stats ==
    /// Returns a point-in-time statistics snapshot.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot(self.entries.len())
    }

    // == Internal Removal ==
    /// Removes one entry, notifies the listener, and records the eviction
    /// when the cause is an automatic one.
    fn remove_entry(&mut self, key: &CacheKey, cause: EvictionCause) -> bool {
        match self.entries.remove(key) {
            Some(entry) => {
                self.lru.remove(key);
                self.policy.notify_eviction(key, &entry.value, cause);
                self.stats.record_eviction(1, cause);
                true
            }
            None => false,
        }
    }
}
