//! Configuration Module
//!
//! Server settings from environment variables, plus the static cache table:
//! the closed set of cache names and their policies, fixed at process start.

use std::env;
use std::time::Duration;

use tracing::info;

use crate::cache::CachePolicy;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible
/// defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Background expiry sweep interval in seconds
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 1)
    pub fn from_env() -> Self {
        Self {
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            cleanup_interval: env::var("CLEANUP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            cleanup_interval: 1,
        }
    }
}

// == Cache Table ==
/// The declared caches and their policies.
///
/// This is the whole set: any other name fails with an unknown-cache error,
/// and nothing can be registered after construction.
///
/// All three use write-based TTL or none at all. Access-based TTL would let
/// a frequently read record stay stale indefinitely, since every read resets
/// its idle clock; write-based TTL bounds staleness from the write. The
/// `comment` cache deliberately has no TTL: entries live until capacity
/// pressure or restart.
pub fn declared_caches() -> Vec<(String, CachePolicy)> {
    vec![
        (
            "user".to_string(),
            CachePolicy::new()
                .max_entries(1000)
                .ttl_after_write(Duration::from_secs(10))
                .on_evict(|key, _value, cause| {
                    info!(%key, %cause, "evicted from user cache");
                }),
        ),
        (
            "article".to_string(),
            CachePolicy::new()
                .max_entries(1000)
                .ttl_after_write(Duration::from_secs(10)),
        ),
        (
            "comment".to_string(),
            CachePolicy::new().max_entries(1000).on_evict(|key, _value, cause| {
                info!(%key, %cause, "evicted from comment cache");
            }),
        ),
    ]
}
