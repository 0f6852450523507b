use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::error::CacheError;
use crate::store::Store;
use crate::utils::resolve_range;

const WRONGTYPE: &str = "WRONGTYPE Operation against a key holding the wrong kind of value";

/// A single key's contents.
#[derive(Clone)]
enum Slot {
    Scalar(Vec<u8>),
    List(Vec<Vec<u8>>),
}

/// Thread-safe in-memory store using a HashMap behind an RwLock.
///
/// Scalars and lists share one keyspace, as they do in Redis: reading a list
/// with `get` or appending to a scalar fails with a `WRONGTYPE` error. Every
/// primitive holds the lock for its whole read-modify-write, which makes
/// `increment` and `append` atomic per key.
///
/// Suitable for tests and single-process use. For state shared across
/// processes use `RedisStore`.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<HashMap<String, Slot>>,
}

impl MemoryStore {
    /// Create an empty MemoryStore.
    pub fn new() -> Self {
        MemoryStore {
            state: RwLock::new(HashMap::new()),
        }
    }

    /// Number of keys currently held.
    pub async fn len(&self) -> usize {
        self.state.read().await.len()
    }

    /// True when no key is held.
    pub async fn is_empty(&self) -> bool {
        self.state.read().await.is_empty()
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<(), CacheError> {
        let mut state = self.state.write().await;
        state.insert(key.to_string(), Slot::Scalar(value.to_vec()));
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let state = self.state.read().await;

        match state.get(key) {
            None => Ok(None),
            Some(Slot::Scalar(value)) => Ok(Some(value.clone())),
            Some(Slot::List(_)) => Err(CacheError::store("memory", key, WRONGTYPE)),
        }
    }

    async fn increment(&self, key: &str) -> Result<i64, CacheError> {
        let mut state = self.state.write().await;

        let current = match state.get(key) {
            None => 0,
            Some(Slot::Scalar(raw)) => std::str::from_utf8(raw)
                .ok()
                .and_then(|s| s.parse::<i64>().ok())
                .ok_or_else(|| {
                    CacheError::store("memory", key, "value is not an integer or out of range")
                })?,
            Some(Slot::List(_)) => return Err(CacheError::store("memory", key, WRONGTYPE)),
        };

        let next = current
            .checked_add(1)
            .ok_or_else(|| CacheError::store("memory", key, "increment would overflow"))?;
        state.insert(key.to_string(), Slot::Scalar(next.to_string().into_bytes()));
        Ok(next)
    }

    async fn append(&self, key: &str, value: &[u8]) -> Result<(), CacheError> {
        let mut state = self.state.write().await;

        match state
            .entry(key.to_string())
            .or_insert_with(|| Slot::List(Vec::new()))
        {
            Slot::List(items) => {
                items.push(value.to_vec());
                Ok(())
            }
            Slot::Scalar(_) => Err(CacheError::store("memory", key, WRONGTYPE)),
        }
    }

    async fn range(
        &self,
        key: &str,
        start: isize,
        end: isize,
    ) -> Result<Vec<Vec<u8>>, CacheError> {
        let state = self.state.read().await;

        let items = match state.get(key) {
            None => return Ok(Vec::new()),
            Some(Slot::List(items)) => items,
            Some(Slot::Scalar(_)) => return Err(CacheError::store("memory", key, WRONGTYPE)),
        };

        Ok(match resolve_range(items.len(), start, end) {
            Some((from, to)) => items[from..to].to_vec(),
            None => Vec::new(),
        })
    }

    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.state.read().await.contains_key(key))
    }

    async fn clear_all(&self) -> Result<(), CacheError> {
        self.state.write().await.clear();
        Ok(())
    }
}
