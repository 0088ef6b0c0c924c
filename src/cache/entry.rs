//! Cache Entry Module
//!
//! A single cached value with the clocks the eviction policy reads.

use std::time::Instant;

use serde_json::Value;

use crate::cache::policy::CachePolicy;

// == Cache Entry ==
/// One cached value, owned exclusively by its store.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored value
    pub value: Value,
    /// When the value was written (reset on overwrite)
    written_at: Instant,
    /// When the value was last read (starts equal to `written_at`)
    last_access: Instant,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a fresh entry; both clocks start now.
    pub fn new(value: Value) -> Self {
        let now = Instant::now();
        Self {
            value,
            written_at: now,
            last_access: now,
        }
    }

    // == Touch ==
    /// Resets the access clock. Called on successful reads so that an
    /// access-based TTL keeps a hot entry alive. Has no effect on a
    /// write-based TTL, which only looks at `written_at`.
    pub fn touch(&mut self) {
        self.last_access = Instant::now();
    }

    // == Is Expired ==
    /// Checks the entry against the policy's TTLs.
    ///
    /// An entry is expired once its write TTL has elapsed since the write,
    /// or its access TTL has elapsed since the last read. With neither TTL
    /// configured the entry never expires.
    pub fn is_expired(&self, policy: &CachePolicy) -> bool {
        if let Some(ttl) = policy.ttl_after_write {
            if self.written_at.elapsed() >= ttl {
                return true;
            }
        }
        if let Some(ttl) = policy.ttl_after_access {
            if self.last_access.elapsed() >= ttl {
                return true;
            }
        }
        false
    }
}
