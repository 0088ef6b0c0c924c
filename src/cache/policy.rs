//! Eviction Policy Module
//!
//! Per-cache configuration describing how a named cache bounds and expires
//! its entries. Immutable once the store is constructed.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::cache::key::CacheKey;

// == Eviction Cause ==
/// Why an entry left the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictionCause {
    /// Removed to enforce the entry-count bound
    Capacity,
    /// Removed because a TTL elapsed
    Expired,
    /// Removed by an explicit invalidation
    Explicit,
    /// Removed for any other reason
    Other,
}

impl EvictionCause {
    /// True for automatic removals. Explicit invalidations invoke the
    /// eviction callback but do not count toward eviction statistics.
    pub fn was_evicted(self) -> bool {
        !matches!(self, EvictionCause::Explicit)
    }
}

impl fmt::Display for EvictionCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EvictionCause::Capacity => "capacity",
            EvictionCause::Expired => "expired",
            EvictionCause::Explicit => "explicit",
            EvictionCause::Other => "other",
        };
        write!(f, "{}", label)
    }
}

// == Eviction Listener ==
/// Callback invoked after an entry is removed, with the removal cause.
pub type EvictionListener = Arc<dyn Fn(&CacheKey, &Value, EvictionCause) + Send + Sync>;

// == Cache Policy ==
/// Eviction policy for one named cache.
///
/// A policy with neither a size bound nor a TTL is a valid configuration:
/// the cache is unbounded and entries persist until process restart.
///
/// `ttl_after_access` and `ttl_after_write` are not interchangeable.
/// Access-based expiry resets on every read, so a frequently read key may
/// stay in the cache stale indefinitely. Write-based expiry ignores read
/// frequency and bounds staleness from the moment of the write. A policy
/// may set either, both, or neither.
#[derive(Clone, Default)]
pub struct CachePolicy {
    /// Maximum entry count; None = unbounded
    pub max_entries: Option<usize>,
    /// Expire entries this long after they were written
    pub ttl_after_write: Option<Duration>,
    /// Expire entries this long after they were last read
    pub ttl_after_access: Option<Duration>,
    /// Callback invoked on entry removal
    pub on_evict: Option<EvictionListener>,
}

impl CachePolicy {
    /// Creates an unbounded, never-expiring policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum entry count. Exceeding it evicts the least
    /// recently used entries first.
    pub fn max_entries(mut self, max: usize) -> Self {
        self.max_entries = Some(max);
        self
    }

    /// Expires entries a fixed duration after they were written,
    /// regardless of how often they are read.
    pub fn ttl_after_write(mut self, ttl: Duration) -> Self {
        self.ttl_after_write = Some(ttl);
        self
    }

    /// Expires entries a fixed duration after their last read. Reads
    /// reset the clock.
    pub fn ttl_after_access(mut self, ttl: Duration) -> Self {
        self.ttl_after_access = Some(ttl);
        self
    }

    /// Registers a callback invoked after an entry is removed.
    pub fn on_evict<F>(mut self, listener: F) -> Self
    where
        F: Fn(&CacheKey, &Value, EvictionCause) + Send + Sync + 'static,
    {
        self.on_evict = Some(Arc::new(listener));
        self
    }

    /// Invokes the eviction listener, if one is registered.
    pub(crate) fn notify_eviction(&self, key: &CacheKey, value: &Value, cause: EvictionCause) {
        if let Some(listener) = &self.on_evict {
            listener(key, value, cause);
        }
    }
}

impl fmt::Debug for CachePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachePolicy")
            .field("max_entries", &self.max_entries)
            .field("ttl_after_write", &self.ttl_after_write)
            .field("ttl_after_access", &self.ttl_after_access)
            .field("on_evict", &self.on_evict.as_ref().map(|_| "<listener>"))
            .finish()
    }
}
