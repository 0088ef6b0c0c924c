//! Cache Module
//!
//! The caching core: named stores with LRU capacity eviction and TTL
//! expiry, per-cache statistics, key derivation over operation signatures,
//! and the cache-aside resolver that ties them together.

mod entry;
mod key;
mod lru;
mod policy;
mod registry;
mod resolver;
mod stats;
mod store;


// Re-export public types
pub use key::{derive_key, CacheKey, KeyPart, OperationSignature};
pub use policy::{CachePolicy, EvictionCause, EvictionListener};
pub use registry::CacheRegistry;
pub use resolver::CacheResolver;
pub use stats::{CacheStats, StatsSnapshot};
pub use store::CacheStore;
