//! Expiry Sweep Task
//!
//! Background task that periodically removes expired entries from every
//! declared cache. Lookups already drop expired entries lazily; the sweep
//! keeps rarely read caches from holding dead entries indefinitely.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheRegistry;

/// Spawns a background task that periodically sweeps expired entries.
///
/// The task runs in an infinite loop, sleeping for the configured interval
/// between sweeps. Each sweep takes every store's write lock briefly, one
/// store at a time. Removals fire the store's eviction callback with cause
/// `Expired` and count toward its eviction statistics.
///
/// # Arguments
/// * `registry` - The declared caches to sweep
/// * `cleanup_interval_secs` - Interval in seconds between sweeps
///
/// # Returns
/// A JoinHandle for the spawned task, used to abort the task during
/// graceful shutdown.
pub fn spawn_cleanup_task(
    registry: Arc<CacheRegistry>,
    cleanup_interval_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting expiry sweep task with interval of {} seconds",
            cleanup_interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let mut removed = 0;
            for (name, store) in registry.stores() {
                let count = store.write().await.cleanup_expired();
                if count > 0 {
                    debug!(cache = name, removed = count, "swept expired entries");
                }
                removed += count;
            }

            if removed > 0 {
                info!("Expiry sweep: removed {} expired entries", removed);
            } else {
                debug!("Expiry sweep: no expired entries found");
            }
        }
    })
}
