use async_trait::async_trait;
use std::sync::Arc;

use crate::builder::CacheBuilder;
use crate::config::{CacheConfig, CountMode};
use crate::error::CacheError;
use crate::keys::KeyGenerator;
use crate::operation::{CallHistory, CountCalls, Operation, OperationHandle, instrument};
use crate::store::Store;
use crate::value::Value;

/// The uninstrumented write behind `Cache::store`: mint a key, write the value.
pub(crate) struct StoreValue {
    store: Arc<dyn Store>,
    keys: Arc<dyn KeyGenerator>,
}

#[async_trait]
impl Operation for StoreValue {
    type Args = (Value,);
    type Output = String;

    async fn invoke(&self, args: (Value,)) -> Result<String, CacheError> {
        let (value,) = args;
        let key = self.keys.generate();
        self.store.set(&key, &value.to_bytes()).await?;
        Ok(key)
    }
}

/// Key-value cache facade with an instrumented `store`.
///
/// Every `store` call mints a fresh key and is counted under
/// `Cache::STORE_IDENTITY`, with its argument and returned key appended to the
/// `Cache.store:inputs` / `Cache.store:outputs` logs. Values are never kept in
/// local memory; every read goes to the store.
///
/// # Example
/// ```ignore
/// let store: Arc<dyn Store> = Arc::new(RedisStore::new(RedisStoreConfig::from_env()).await?);
/// let cache = Cache::new(store).await?;
///
/// let key = cache.store("foo").await?;
/// assert_eq!(cache.retrieve_str(&key).await?, Some("foo".to_string()));
///
/// replay(&cache.store_handle()).await?;
/// ```
pub struct Cache {
    store: Arc<dyn Store>,
    store_op: CountCalls<CallHistory<StoreValue>>,
}

impl Cache {
    /// Operation identity of `Cache::store`.
    pub const STORE_IDENTITY: &'static str = "Cache.store";

    /// Create a cache with the default configuration and UUID keys.
    ///
    /// The store is cleared first.
    pub async fn new(store: Arc<dyn Store>) -> Result<Self, CacheError> {
        CacheBuilder::new(store).build().await
    }

    pub fn builder(store: Arc<dyn Store>) -> CacheBuilder {
        CacheBuilder::new(store)
    }

    pub(crate) async fn assemble(
        store: Arc<dyn Store>,
        keys: Arc<dyn KeyGenerator>,
        config: CacheConfig,
    ) -> Result<Self, CacheError> {
        if config.clear_on_init {
            store.clear_all().await?;
        }

        let write = StoreValue {
            store: store.clone(),
            keys,
        };
        let store_op = instrument(
            write,
            Self::STORE_IDENTITY,
            store.clone(),
            config.count_mode,
        )
        .serialize_calls(config.serialize_calls);

        tracing::debug!(
            "Cache initialized: backend={}, count_mode={:?}, cleared={}, serialized={}",
            store.name(),
            config.count_mode,
            config.clear_on_init,
            config.serialize_calls
        );
        Ok(Cache { store, store_op })
    }

    /// Store `value` under a freshly generated key and return the key.
    pub async fn store(&self, value: impl Into<Value>) -> Result<String, CacheError> {
        self.store_op.invoke((value.into(),)).await
    }

    /// Return the raw stored bytes.
    ///
    /// The response will be `None` when the key is unset.
    pub async fn retrieve(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        self.store.get(key).await
    }

    /// Return the stored value passed through `transform`.
    ///
    /// `transform` is not called when the key is unset.
    pub async fn retrieve_with<T, F>(&self, key: &str, transform: F) -> Result<Option<T>, CacheError>
    where
        F: FnOnce(Vec<u8>) -> Result<T, CacheError>,
    {
        match self.store.get(key).await? {
            Some(raw) => transform(raw).map(Some),
            None => Ok(None),
        }
    }

    /// Return the stored value decoded as UTF-8 text.
    pub async fn retrieve_str(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.retrieve_with(key, |raw| decode_text(key, raw)).await
    }

    /// Return the stored value parsed as an integer.
    pub async fn retrieve_int(&self, key: &str) -> Result<Option<i64>, CacheError> {
        self.retrieve_with(key, |raw| {
            decode_text(key, raw)?
                .trim()
                .parse::<i64>()
                .map_err(|e| CacheError::coercion(key, e.to_string()))
        })
        .await
    }

    /// Return the stored value parsed as a float.
    pub async fn retrieve_float(&self, key: &str) -> Result<Option<f64>, CacheError> {
        self.retrieve_with(key, |raw| {
            decode_text(key, raw)?
                .trim()
                .parse::<f64>()
                .map_err(|e| CacheError::coercion(key, e.to_string()))
        })
        .await
    }

    /// Replay handle of the instrumented `store` operation.
    pub fn store_handle(&self) -> OperationHandle {
        self.store_op.handle()
    }

    /// The shared store every operation of this cache goes through.
    pub fn adapter(&self) -> &Arc<dyn Store> {
        &self.store
    }

    pub fn count_mode(&self) -> CountMode {
        self.store_op.mode()
    }

    pub fn serializes_calls(&self) -> bool {
        self.store_op.is_serialized()
    }
}

fn decode_text(key: &str, raw: Vec<u8>) -> Result<String, CacheError> {
    String::from_utf8(raw).map_err(|e| CacheError::coercion(key, e.to_string()))
}
