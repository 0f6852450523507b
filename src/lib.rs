//! tally-cache - A key-value cache with call counting and call history
//!
//! This library provides:
//! - A cache facade that stores values under freshly generated UUID keys
//! - Pluggable store backends (Redis, in-memory)
//! - Instrumentation layers that count calls and log inputs/outputs of any `Operation`
//! - Replay of the recorded history as a readable transcript
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tally_cache::{Cache, RedisStore, RedisStoreConfig, Store, replay};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store: Arc<dyn Store> = Arc::new(RedisStore::new(RedisStoreConfig::from_env()).await?);
//!     let cache = Cache::new(store).await?;
//!
//!     let key = cache.store("foo").await?;
//!     assert_eq!(cache.retrieve_str(&key).await?, Some("foo".to_string()));
//!
//!     // Cache.store was called 1 times:
//!     // Cache.store(*('foo',)) -> 5f0c...
//!     replay(&cache.store_handle()).await?;
//!     Ok(())
//! }
//! ```

mod builder;
mod cache;
mod config;
mod error;
mod keys;
mod operation;
mod replay;
mod repr;
mod store;
pub mod stores;
mod utils;
mod value;

// Re-export public API
pub use builder::CacheBuilder;
pub use cache::Cache;
pub use config::{CacheConfig, CountMode};
pub use error::CacheError;
pub use keys::{KeyGenerator, UuidKeys};
pub use operation::{CallHistory, CountCalls, FnOperation, Operation, OperationHandle, instrument};
pub use replay::{ReplayEntry, Transcript, replay, replay_to, transcript};
pub use repr::{ArgsRepr, Repr};
pub use store::Store;
pub use stores::memory::MemoryStore;
pub use stores::redis::{RedisStore, RedisStoreConfig};
pub use utils::{inputs_key, outputs_key};
pub use value::{Encode, Value};
