use async_trait::async_trait;

use crate::error::CacheError;

/// A store is the narrow interface to an external key-value service.
///
/// Values cross this boundary as raw bytes, the same way they travel over the
/// Redis protocol. Every primitive must be atomic per key: the instrumentation
/// layer adds no locking of its own and relies on `increment` and `append`
/// being serialized by the backend.
#[async_trait]
pub trait Store: Send + Sync {
    /// A name for errors/tracing.
    ///
    /// # Example
    /// - "memory"
    /// - "redis"
    fn name(&self) -> &'static str;

    /// Overwrites or creates the value at `key`.
    async fn set(&self, key: &str, value: &[u8]) -> Result<(), CacheError>;

    /// Return the stored value.
    ///
    /// The response must be `None` when the key is unset.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Atomically adds 1 to the integer at `key` (unset counts as 0) and
    /// returns the new value.
    async fn increment(&self, key: &str) -> Result<i64, CacheError>;

    /// Appends `value` to the end of the list at `key`, creating the list if needed.
    async fn append(&self, key: &str, value: &[u8]) -> Result<(), CacheError>;

    /// Returns the list elements between `start` and `end` inclusive, in insertion order.
    ///
    /// Negative indices count from the tail, so `(0, -1)` is the whole list.
    async fn range(&self, key: &str, start: isize, end: isize)
    -> Result<Vec<Vec<u8>>, CacheError>;

    /// True if the key holds a value of any type.
    async fn exists(&self, key: &str) -> Result<bool, CacheError>;

    /// Drops every key.
    async fn clear_all(&self) -> Result<(), CacheError>;
}
