//! Builder API for creating cache instances.
//!
//! The store, the key generator and the configuration are injected here; the
//! cache never reaches for a global connection.

use std::sync::Arc;

use crate::cache::Cache;
use crate::config::{CacheConfig, CountMode};
use crate::error::CacheError;
use crate::keys::{KeyGenerator, UuidKeys};
use crate::store::Store;

/// Builder for creating a `Cache`.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use tally_cache::{CacheBuilder, CountMode, MemoryStore};
///
/// let cache = CacheBuilder::new(Arc::new(MemoryStore::new()))
///     .count_mode(CountMode::Completed)
///     .build()
///     .await?;
/// ```
pub struct CacheBuilder {
    store: Arc<dyn Store>,
    keys: Arc<dyn KeyGenerator>,
    config: CacheConfig,
}

impl CacheBuilder {
    /// Create a new CacheBuilder over the given store.
    pub fn new(store: Arc<dyn Store>) -> Self {
        CacheBuilder {
            store,
            keys: Arc::new(UuidKeys),
            config: CacheConfig::default(),
        }
    }

    /// Replace the UUID key generator.
    pub fn key_generator(mut self, keys: Arc<dyn KeyGenerator>) -> Self {
        self.keys = keys;
        self
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: CacheConfig) -> Self {
        self.config = config;
        self
    }

    pub fn count_mode(mut self, mode: CountMode) -> Self {
        self.config.count_mode = mode;
        self
    }

    pub fn clear_on_init(mut self, clear: bool) -> Self {
        self.config.clear_on_init = clear;
        self
    }

    pub fn serialize_calls(mut self, on: bool) -> Self {
        self.config.serialize_calls = on;
        self
    }

    /// Build the cache, clearing the store first if configured to.
    pub async fn build(self) -> Result<Cache, CacheError> {
        Cache::assemble(self.store, self.keys, self.config).await
    }
}
