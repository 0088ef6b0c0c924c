//! Lookaside - A declarative cache-aside layer
//!
//! Named caches with per-cache eviction policies (entry bounds, write- or
//! access-based TTL), operational statistics, and a generic resolver that
//! memoizes expensive lookups, including asynchronous call shapes whose
//! underlying signature carries a synthetic completion token.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod repos;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use tasks::spawn_cleanup_task;
