//! Cache-Aside Resolver Module
//!
//! The generic compute-or-fetch entry point. A caller hands over a cache
//! name, the operation's signature, and a loader that performs the real
//! fetch; the resolver returns the cached value or loads, stores, and
//! returns it.
//!
//! Concurrency policy: per-key load deduplication. Resolves for the same
//! (cache, key) serialize on a per-key async lock, so at most one load is in
//! flight per key; the callers queued behind it observe the stored value as
//! a hit. If the loading caller is cancelled mid-load, the next queued
//! caller takes over and performs its own load; store state is never
//! corrupted and waiters are never cancelled transitively. Slot bookkeeping
//! is released through a drop guard, so cancelled resolves do not leave
//! entries behind in the lock map.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Instant;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex as AsyncMutex;
use tracing::debug;

use crate::cache::key::{derive_key, CacheKey, OperationSignature};
use crate::cache::registry::CacheRegistry;
use crate::cache::stats::StatsSnapshot;
use crate::error::{CacheError, Result};

/// Identifies one in-flight load slot.
type LoadSlot = (String, CacheKey);

// == Cache Resolver ==
/// Resolves cached operation results against the registry's named stores.
pub struct CacheResolver {
    registry: Arc<CacheRegistry>,
    /// One async lock per (cache, key) with a resolve in progress. Each
    /// interested caller holds a [`LoadSlotGuard`]; the map entry is dropped
    /// when the last guard drops, whether the resolve completed or its
    /// future was cancelled mid-load.
    load_locks: StdMutex<HashMap<LoadSlot, Arc<AsyncMutex<()>>>>,
}

/// A caller's claim on one load slot. Releases the slot's map entry on
/// drop, so a resolve future that is cancelled mid-load cleans up the same
/// way a completed one does.
struct LoadSlotGuard<'a> {
    resolver: &'a CacheResolver,
    slot: LoadSlot,
    lock: Arc<AsyncMutex<()>>,
}

impl Drop for LoadSlotGuard<'_> {
    fn drop(&mut self) {
        self.resolver.release_load_lock(&self.slot, &self.lock);
    }
}

impl CacheResolver {
    // == Constructor ==
    pub fn new(registry: Arc<CacheRegistry>) -> Self {
        Self {
            registry,
            load_locks: StdMutex::new(HashMap::new()),
        }
    }

    // == Resolve ==
    /// Returns the cached value for the operation, or computes it.
    ///
    /// On a hit the loader never runs. On a miss the loader runs, a success
    /// is stored and timed as a load-success, and a failure is timed as a
    /// load-failure and propagated. Failed loads are never cached and never
    /// retried here; `NotFound` in particular is an expected outcome, not a
    /// transient fault.
    pub async fn resolve<T, F, Fut>(
        &self,
        cache_name: &str,
        signature: OperationSignature,
        loader: F,
    ) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let key = derive_key(signature)?;
        // The registry check comes before the loader can possibly run: an
        // undeclared cache name fails without touching the data source.
        let store = self.registry.store(cache_name)?;

        let slot = self.claim_load_slot((cache_name.to_string(), key.clone()));
        {
            let _guard = slot.lock.lock().await;

            let cached = store.write().await.get(&key);
            match cached {
                Some(value) => {
                    debug!(cache = cache_name, key = %key, "cache hit");
                    serde_json::from_value(value).map_err(|e| {
                        CacheError::Internal(format!(
                            "cached value for key {} does not deserialize: {}",
                            key, e
                        ))
                    })
                }
                None => {
                    debug!(cache = cache_name, key = %key, "cache miss, loading");
                    let started = Instant::now();
                    let loaded = loader().await;
                    let elapsed = started.elapsed().as_nanos() as u64;

                    match loaded {
                        Ok(value) => {
                            let mut guard = store.write().await;
                            guard.record_load_success(elapsed);
                            match serde_json::to_value(&value) {
                                Ok(json) => {
                                    guard.insert(key.clone(), json);
                                    Ok(value)
                                }
                                Err(e) => Err(CacheError::Internal(format!(
                                    "loaded value for key {} does not serialize: {}",
                                    key, e
                                ))),
                            }
                        }
                        Err(err) => {
                            store.write().await.record_load_failure(elapsed);
                            Err(err)
                        }
                    }
                }
            }
        }
    }

    // == Invalidate ==
    /// Explicitly removes one cached entry. Returns true if it was present.
    pub async fn invalidate(&self, cache_name: &str, key: &CacheKey) -> Result<bool> {
        let store = self.registry.store(cache_name)?;
        let removed = store.write().await.invalidate(key);
        Ok(removed)
    }

    // == Stats ==
    /// Statistics snapshot for one named cache.
    pub async fn stats(&self, cache_name: &str) -> Result<StatsSnapshot> {
        let store = self.registry.store(cache_name)?;
        let snapshot = store.read().await.stats();
        Ok(snapshot)
    }

    // == Load Lock Management ==
    /// Fetches or creates the per-key lock for a slot and wraps it in a
    /// guard that releases the slot on drop.
    fn claim_load_slot(&self, slot: LoadSlot) -> LoadSlotGuard<'_> {
        let lock = {
            let mut locks = self.load_locks.lock().expect("load lock map poisoned");
            locks.entry(slot.clone()).or_default().clone()
        };
        LoadSlotGuard {
            resolver: self,
            slot,
            lock,
        }
    }

    /// Drops the slot's map entry once no other caller holds the lock.
    /// Called from the guard's drop, never directly.
    fn release_load_lock(&self, slot: &LoadSlot, lock: &Arc<AsyncMutex<()>>) {
        let mut locks = self.load_locks.lock().expect("load lock map poisoned");
        // Two strong counts remain when only the map and the dropping guard
        // hold the lock; any higher count means another resolve is queued.
        if Arc::strong_count(lock) <= 2 {
            locks.remove(slot);
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::key::KeyPart;
    use crate::cache::policy::{CachePolicy, EvictionCause};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    fn resolver_with(table: Vec<(String, CachePolicy)>) -> Arc<CacheResolver> {
        Arc::new(CacheResolver::new(Arc::new(CacheRegistry::new(table))))
    }

    fn resolver() -> Arc<CacheResolver> {
        resolver_with(vec![("user".to_string(), CachePolicy::new())])
    }

    #[tokio::test]
    async fn test_miss_loads_and_stores() {
        let resolver = resolver();

        let value: String = resolver
            .resolve("user", OperationSignature::blocking([1u64]), || async {
                tokio::time::sleep(Duration::from_millis(5)).await;
                Ok("A".to_string())
            })
            .await
            .unwrap();

        assert_eq!(value, "A");
        let snap = resolver.stats("user").await.unwrap();
        assert_eq!(snap.miss_count, 1);
        assert_eq!(snap.load_success_count, 1);
        assert_eq!(snap.estimated_size, 1);
        assert!(snap.total_load_time > 0);
    }

    #[tokio::test]
    async fn test_hit_skips_loader() {
        let resolver = resolver();
        let loads = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let loads = loads.clone();
            let value: String = resolver
                .resolve("user", OperationSignature::blocking([1u64]), move || async move {
                    loads.fetch_add(1, Ordering::SeqCst);
                    Ok("A".to_string())
                })
                .await
                .unwrap();
            assert_eq!(value, "A");
        }

        assert_eq!(loads.load(Ordering::SeqCst), 1);
        let snap = resolver.stats("user").await.unwrap();
        assert_eq!(snap.hit_count, 2);
        assert_eq!(snap.miss_count, 1);
    }

    #[tokio::test]
    async fn test_second_loader_never_runs_on_hit() {
        let resolver = resolver();

        let first: String = resolver
            .resolve("user", OperationSignature::blocking([1u64]), || async {
                Ok("A".to_string())
            })
            .await
            .unwrap();
        assert_eq!(first, "A");

        // A different loader for the same key must not be consulted.
        let second: String = resolver
            .resolve("user", OperationSignature::blocking([1u64]), || async {
                panic!("loader must not run on a hit")
            })
            .await
            .unwrap();
        assert_eq!(second, "A");
    }

    #[tokio::test]
    async fn test_unknown_cache_fails_without_loading() {
        let resolver = resolver();
        let loaded = Arc::new(AtomicUsize::new(0));

        let counter = loaded.clone();
        let result: Result<String> = resolver
            .resolve("session", OperationSignature::blocking([1u64]), move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok("A".to_string())
            })
            .await;

        assert!(matches!(result, Err(CacheError::UnknownCache(_))));
        assert_eq!(loaded.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_not_found_is_propagated_and_not_cached() {
        let resolver = resolver();
        let loads = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let loads = loads.clone();
            let result: Result<String> = resolver
                .resolve("user", OperationSignature::blocking([9u64]), move || async move {
                    loads.fetch_add(1, Ordering::SeqCst);
                    Err(CacheError::NotFound("user:9".to_string()))
                })
                .await;
            assert!(matches!(result, Err(CacheError::NotFound(_))));
        }

        // The failure was not cached: the loader ran both times.
        assert_eq!(loads.load(Ordering::SeqCst), 2);
        let snap = resolver.stats("user").await.unwrap();
        assert_eq!(snap.load_failure_count, 2);
        assert_eq!(snap.estimated_size, 0);
    }

    #[tokio::test]
    async fn test_load_failure_is_propagated_and_not_cached() {
        let resolver = resolver();

        let result: Result<String> = resolver
            .resolve("user", OperationSignature::blocking([1u64]), || async {
                Err(CacheError::Load("connection reset".to_string()))
            })
            .await;
        assert!(matches!(result, Err(CacheError::Load(_))));

        // A later successful load for the same key goes through.
        let value: String = resolver
            .resolve("user", OperationSignature::blocking([1u64]), || async {
                Ok("A".to_string())
            })
            .await
            .unwrap();
        assert_eq!(value, "A");
    }

    #[tokio::test]
    async fn test_blocking_and_suspending_shapes_share_the_cache() {
        let resolver = resolver();
        let loads = Arc::new(AtomicUsize::new(0));

        let counter = loads.clone();
        let _: String = resolver
            .resolve("user", OperationSignature::blocking([1u64]), move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok("A".to_string())
            })
            .await
            .unwrap();

        // Same logical argument through the suspending shape: must hit.
        let counter = loads.clone();
        let value: String = resolver
            .resolve("user", OperationSignature::suspending([1u64]), move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok("B".to_string())
            })
            .await
            .unwrap();

        assert_eq!(value, "A");
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_resolves_load_once() {
        let resolver = resolver();
        let loads = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let resolver = resolver.clone();
            let loads = loads.clone();
            handles.push(tokio::spawn(async move {
                let value: String = resolver
                    .resolve("user", OperationSignature::blocking([1u64]), move || async move {
                        loads.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Ok("A".to_string())
                    })
                    .await
                    .unwrap();
                value
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap(), "A");
        }
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_load_lock_map_is_drained() {
        let resolver = resolver();

        for n in 0..4u64 {
            let _: String = resolver
                .resolve("user", OperationSignature::blocking([n]), || async {
                    Ok("v".to_string())
                })
                .await
                .unwrap();
        }

        assert!(resolver.load_locks.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_resolve_releases_its_lock_slot() {
        let resolver = resolver();

        let task = {
            let resolver = resolver.clone();
            tokio::spawn(async move {
                let _: Result<String> = resolver
                    .resolve("user", OperationSignature::blocking([1u64]), || async {
                        tokio::time::sleep(Duration::from_secs(60)).await;
                        Ok("A".to_string())
                    })
                    .await;
            })
        };

        // Let the load begin, then cancel the caller mid-load.
        tokio::time::sleep(Duration::from_millis(50)).await;
        task.abort();
        assert!(task.await.unwrap_err().is_cancelled());

        assert!(resolver.load_locks.lock().unwrap().is_empty());

        // The key is usable again: a fresh resolve loads normally.
        let value: String = resolver
            .resolve("user", OperationSignature::blocking([1u64]), || async {
                Ok("B".to_string())
            })
            .await
            .unwrap();
        assert_eq!(value, "B");
    }

    #[tokio::test]
    async fn test_invalidate_absent_key_is_false() {
        let resolver = resolver();
        let key = CacheKey::Single(KeyPart::Uint(7));
        assert!(!resolver.invalidate("user", &key).await.unwrap());
    }

    #[tokio::test]
    async fn test_invalidate_forces_reload() {
        let resolver = resolver();
        let loads = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let loads = loads.clone();
            let _: String = resolver
                .resolve("user", OperationSignature::blocking([1u64]), move || async move {
                    loads.fetch_add(1, Ordering::SeqCst);
                    Ok("A".to_string())
                })
                .await
                .unwrap();
        }
        assert_eq!(loads.load(Ordering::SeqCst), 1);

        let key = CacheKey::Single(KeyPart::Uint(1));
        assert!(resolver.invalidate("user", &key).await.unwrap());

        let loads_again = loads.clone();
        let _: String = resolver
            .resolve("user", OperationSignature::blocking([1u64]), move || async move {
                loads_again.fetch_add(1, Ordering::SeqCst);
                Ok("A".to_string())
            })
            .await
            .unwrap();
        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_user_cache_capacity_scenario() {
        // Declared cache "user" with max_entries = 2, then the full
        // resolve/hit/evict sequence.
        let evicted = Arc::new(Mutex::new(Vec::new()));
        let log = evicted.clone();
        let resolver = resolver_with(vec![(
            "user".to_string(),
            CachePolicy::new().max_entries(2).on_evict(move |key, _, cause| {
                log.lock().unwrap().push((key.clone(), cause));
            }),
        )]);

        let value: String = resolver
            .resolve("user", OperationSignature::blocking([1u64]), || async {
                Ok("A".to_string())
            })
            .await
            .unwrap();
        assert_eq!(value, "A");
        assert_eq!(resolver.stats("user").await.unwrap().miss_count, 1);

        // Cached: the second loader is not consulted.
        let value: String = resolver
            .resolve("user", OperationSignature::blocking([1u64]), || async {
                Ok("B".to_string())
            })
            .await
            .unwrap();
        assert_eq!(value, "A");
        assert_eq!(resolver.stats("user").await.unwrap().hit_count, 1);

        // Keys 2 and 3 push key 1 out by capacity.
        for n in [2u64, 3u64] {
            let _: String = resolver
                .resolve("user", OperationSignature::blocking([n]), move || async move {
                    Ok(format!("v{}", n))
                })
                .await
                .unwrap();
        }

        assert_eq!(
            evicted.lock().unwrap().as_slice(),
            &[(CacheKey::Single(KeyPart::Uint(1)), EvictionCause::Capacity)]
        );
        assert!(resolver.stats("user").await.unwrap().estimated_size <= 2);
    }
}
