//! Cache Statistics Module
//!
//! Tracks per-cache performance metrics: hits, misses, load outcomes and
//! timings, evictions. Counters are monotonically non-decreasing for the
//! process lifetime; a snapshot derives the rate metrics on request.

use serde::Serialize;

use crate::cache::policy::EvictionCause;

// == Cache Stats ==
/// Live per-cache counters, updated on every cache operation.
///
/// Mutation goes through the owning store's lock, which makes the updates
/// safe under concurrent callers.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    hits: u64,
    misses: u64,
    load_successes: u64,
    load_failures: u64,
    total_load_time_nanos: u64,
    evictions: u64,
    eviction_weight: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Record Hit ==
    /// Records a lookup that returned a cached value.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    // == Record Miss ==
    /// Records a lookup that found no usable entry (absent or expired).
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Record Load Success ==
    /// Records a loader invocation that produced a value.
    pub fn record_load_success(&mut self, duration_nanos: u64) {
        self.load_successes += 1;
        self.total_load_time_nanos += duration_nanos;
    }

    // == Record Load Failure ==
    /// Records a loader invocation that failed.
    pub fn record_load_failure(&mut self, duration_nanos: u64) {
        self.load_failures += 1;
        self.total_load_time_nanos += duration_nanos;
    }

    // == Record Eviction ==
    /// Records an entry removal. Only automatic removals (capacity, expiry)
    /// count; explicit invalidations pass through unchanged.
    pub fn record_eviction(&mut self, weight: u64, cause: EvictionCause) {
        if cause.was_evicted() {
            self.evictions += 1;
            self.eviction_weight += weight;
        }
    }

    // == Snapshot ==
    /// Produces an immutable point-in-time view, including the derived rate
    /// metrics. `estimated_size` is supplied by the owning store.
    pub fn snapshot(&self, estimated_size: usize) -> StatsSnapshot {
        let request_count = self.hits + self.misses;
        let load_count = self.load_successes + self.load_failures;

        // Rate convention when nothing has been requested yet: every lookup
        // so far (all zero of them) was a hit, so hit_rate is 1.0 and
        // miss_rate is 0.0.
        let (hit_rate, miss_rate) = if request_count == 0 {
            (1.0, 0.0)
        } else {
            (
                self.hits as f64 / request_count as f64,
                self.misses as f64 / request_count as f64,
            )
        };

        let (load_failure_rate, average_load_penalty) = if load_count == 0 {
            (0.0, 0.0)
        } else {
            (
                self.load_failures as f64 / load_count as f64,
                self.total_load_time_nanos as f64 / load_count as f64,
            )
        };

        StatsSnapshot {
            estimated_size,
            hit_count: self.hits,
            miss_count: self.misses,
            request_count,
            hit_rate,
            miss_rate,
            load_count,
            load_success_count: self.load_successes,
            load_failure_count: self.load_failures,
            load_failure_rate,
            total_load_time: self.total_load_time_nanos,
            average_load_penalty,
            eviction_count: self.evictions,
            eviction_weight: self.eviction_weight,
        }
    }
}

// == Stats Snapshot ==
/// Immutable point-in-time read of one cache's statistics.
///
/// Serialized with the camelCase field names the reporting surface expects.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    /// Entry count at snapshot time; an estimate under concurrent mutation
    pub estimated_size: usize,
    /// Lookups that returned a cached value
    pub hit_count: u64,
    /// Lookups that found no usable entry
    pub miss_count: u64,
    /// hit_count + miss_count
    pub request_count: u64,
    /// hit_count / request_count (1.0 when no requests yet)
    pub hit_rate: f64,
    /// miss_count / request_count (0.0 when no requests yet)
    pub miss_rate: f64,
    /// Total loader invocations
    pub load_count: u64,
    /// Loader invocations that produced a value
    pub load_success_count: u64,
    /// Loader invocations that failed
    pub load_failure_count: u64,
    /// load_failure_count / load_count (0.0 when no loads yet)
    pub load_failure_rate: f64,
    /// Total nanoseconds spent in loaders
    pub total_load_time: u64,
    /// Average nanoseconds per loader invocation
    pub average_load_penalty: f64,
    /// Automatic removals (capacity, expiry)
    pub eviction_count: u64,
    /// Sum of weights of evicted entries
    pub eviction_weight: u64,
}
