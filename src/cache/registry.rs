//! Cache Registry Module
//!
//! Owns the closed set of named cache stores, fixed at process start.
//!
//! Requiring every cache name to be declared up front keeps the usage sites
//! enumerable and auditable; asking for an undeclared name is a programmer
//! error, not a request to create a cache on the fly.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::cache::policy::CachePolicy;
use crate::cache::store::CacheStore;
use crate::error::{CacheError, Result};

// == Cache Registry ==
/// The pre-declared set of named cache stores.
///
/// Constructed once from a `(name, policy)` table; there is deliberately no
/// way to register further names afterwards.
#[derive(Debug)]
pub struct CacheRegistry {
    stores: HashMap<String, Arc<RwLock<CacheStore>>>,
}

impl CacheRegistry {
    // == Constructor ==
    /// Builds one store per declared cache.
    pub fn new(table: Vec<(String, CachePolicy)>) -> Self {
        let stores = table
            .into_iter()
            .map(|(name, policy)| (name, Arc::new(RwLock::new(CacheStore::new(policy)))))
            .collect();
        Self { stores }
    }

    // == Store ==
    /// Returns the store for a declared cache name.
    pub fn store(&self, name: &str) -> Result<Arc<RwLock<CacheStore>>> {
        self.stores
            .get(name)
            .cloned()
            .ok_or_else(|| CacheError::UnknownCache(name.to_string()))
    }

    // == Iteration ==
    /// All declared stores, for the background sweeper.
    pub fn stores(&self) -> impl Iterator<Item = (&str, &Arc<RwLock<CacheStore>>)> {
        self.stores.iter().map(|(name, store)| (name.as_str(), store))
    }

    /// The declared cache names.
    pub fn cache_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.stores.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
