//! Call instrumentation for arbitrary operations.
//!
//! An [`Operation`] is anything invoked with a set of positional arguments.
//! [`CountCalls`] and [`CallHistory`] wrap an inner operation, implement the
//! same trait and record call metadata in a shared [`Store`]:
//!
//! - `CountCalls` increments the integer at `{identity}`.
//! - `CallHistory` appends the argument tuple to `{identity}:inputs` and the
//!   result to `{identity}:outputs`.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tally_cache::{CountMode, FnOperation, MemoryStore, Operation, Store, instrument};
//!
//! let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
//! let double = FnOperation::new(|(n,): (i64,)| async move { Ok::<_, CacheError>(n * 2) });
//!
//! // Counting is always the outer layer.
//! let op = instrument(double, "Math.double", store.clone(), CountMode::Attempts);
//! assert_eq!(op.invoke((21,)).await?, 42);
//! ```

use async_trait::async_trait;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::{Arc, Weak};
use tokio::sync::Mutex;

use crate::config::CountMode;
use crate::error::CacheError;
use crate::repr::ArgsRepr;
use crate::store::Store;
use crate::utils::{inputs_key, outputs_key};
use crate::value::Encode;

/// A callable unit of work that can be wrapped by instrumentation layers.
#[async_trait]
pub trait Operation: Send + Sync {
    /// Positional arguments, usually a tuple.
    type Args: Send + 'static;
    /// Result of a successful call.
    type Output: Send + 'static;

    async fn invoke(&self, args: Self::Args) -> Result<Self::Output, CacheError>;
}

/// Adapter turning an async closure into an [`Operation`].
pub struct FnOperation<F, A, R> {
    f: F,
    _marker: PhantomData<fn(A) -> R>,
}

impl<F, A, R> FnOperation<F, A, R> {
    pub fn new(f: F) -> Self {
        FnOperation {
            f,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<F, Fut, A, R> Operation for FnOperation<F, A, R>
where
    F: Fn(A) -> Fut + Send + Sync,
    Fut: Future<Output = Result<R, CacheError>> + Send,
    A: Send + 'static,
    R: Send + 'static,
{
    type Args = A;
    type Output = R;

    async fn invoke(&self, args: A) -> Result<R, CacheError> {
        (self.f)(args).await
    }
}

/// Replay target: an operation identity plus the store it records into.
///
/// The store is held weakly. Once every owner of the store is gone the handle
/// no longer resolves, and replaying it does nothing.
#[derive(Debug, Clone)]
pub struct OperationHandle {
    identity: String,
    store: Option<Weak<dyn Store>>,
}

impl OperationHandle {
    /// A handle bound to a live store.
    pub fn bound(identity: impl Into<String>, store: &Arc<dyn Store>) -> Self {
        OperationHandle {
            identity: identity.into(),
            store: Some(Arc::downgrade(store)),
        }
    }

    /// A handle with no store attached.
    pub fn detached(identity: impl Into<String>) -> Self {
        OperationHandle {
            identity: identity.into(),
            store: None,
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// The bound store, if it is still alive.
    pub fn live_store(&self) -> Option<Arc<dyn Store>> {
        self.store.as_ref()?.upgrade()
    }
}

/// Counts invocations of the inner operation under the key `{identity}`.
///
/// With `CountMode::Attempts` the increment happens before delegating and is
/// never rolled back, so failed calls are counted too. With
/// `CountMode::Completed` only calls whose inner operation returned `Ok` are
/// counted.
pub struct CountCalls<O> {
    inner: O,
    identity: String,
    store: Arc<dyn Store>,
    mode: CountMode,
}

impl<O> CountCalls<O> {
    /// Wrap `inner`, counting every attempt.
    pub fn new(inner: O, identity: impl Into<String>, store: Arc<dyn Store>) -> Self {
        CountCalls {
            inner,
            identity: identity.into(),
            store,
            mode: CountMode::Attempts,
        }
    }

    pub fn with_mode(mut self, mode: CountMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn mode(&self) -> CountMode {
        self.mode
    }

    pub fn handle(&self) -> OperationHandle {
        OperationHandle::bound(self.identity.clone(), &self.store)
    }

    async fn bump(&self) -> Result<(), CacheError> {
        let count = self.store.increment(&self.identity).await?;
        tracing::debug!("Counted call: identity={}, count={}", self.identity, count);
        Ok(())
    }
}

#[async_trait]
impl<O: Operation> Operation for CountCalls<O> {
    type Args = O::Args;
    type Output = O::Output;

    async fn invoke(&self, args: Self::Args) -> Result<Self::Output, CacheError> {
        match self.mode {
            CountMode::Attempts => {
                self.bump().await?;
                self.inner.invoke(args).await
            }
            CountMode::Completed => {
                let output = self.inner.invoke(args).await?;
                self.bump().await?;
                Ok(output)
            }
        }
    }
}

/// Records the arguments and result of every call into two parallel logs.
///
/// The input is appended before delegating and the output after the inner
/// call returns. When the inner call fails the output is not appended and the
/// Outputs log falls one entry behind the Inputs log; replay pairs the logs
/// positionally and drops the unmatched tail.
///
/// # Concurrency
///
/// By default calls are not serialized. Two overlapping calls append their
/// inputs in start order and their outputs in finish order, so a call that
/// finishes first takes the earlier output slot and replay pairs it with the
/// other call's input. If you need positional pairing to hold under concurrent
/// use, enable [`CallHistory::serialize_calls`]. Each call then holds a lock
/// from its input append to its output append. The lock belongs to this
/// wrapper, so only calls made through the same wrapper are ordered.
pub struct CallHistory<O> {
    inner: O,
    identity: String,
    inputs_key: String,
    outputs_key: String,
    store: Arc<dyn Store>,
    serial: Option<Mutex<()>>,
}

impl<O> CallHistory<O> {
    pub fn new(inner: O, identity: impl Into<String>, store: Arc<dyn Store>) -> Self {
        let identity = identity.into();
        CallHistory {
            inner,
            inputs_key: inputs_key(&identity),
            outputs_key: outputs_key(&identity),
            identity,
            store,
            serial: None,
        }
    }

    /// Run calls one at a time so each input and output take the same index.
    pub fn serialize_calls(mut self, on: bool) -> Self {
        self.serial = on.then(|| Mutex::new(()));
        self
    }

    pub fn is_serialized(&self) -> bool {
        self.serial.is_some()
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn handle(&self) -> OperationHandle {
        OperationHandle::bound(self.identity.clone(), &self.store)
    }
}

#[async_trait]
impl<O> Operation for CallHistory<O>
where
    O: Operation,
    O::Args: ArgsRepr,
    O::Output: Encode,
{
    type Args = O::Args;
    type Output = O::Output;

    async fn invoke(&self, args: Self::Args) -> Result<Self::Output, CacheError> {
        let _turn = match &self.serial {
            Some(lock) => Some(lock.lock().await),
            None => None,
        };

        let input = args.args_repr();
        self.store.append(&self.inputs_key, input.as_bytes()).await?;

        let output = match self.inner.invoke(args).await {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!(
                    "Call failed after its input was recorded, outputs log is now behind: identity={}, error={}",
                    self.identity,
                    e
                );
                return Err(e);
            }
        };

        let encoded = output.encode();
        self.store.append(&self.outputs_key, &encoded).await?;
        tracing::debug!("Recorded call: identity={}, input={}", self.identity, input);

        Ok(output)
    }
}

/// Wrap `op` with both instrumentation layers.
///
/// `CountCalls` is the outer layer and `CallHistory` wraps `op` directly, so
/// the recorded input/output pair is the one of `op` itself.
pub fn instrument<O>(
    op: O,
    identity: &str,
    store: Arc<dyn Store>,
    mode: CountMode,
) -> CountCalls<CallHistory<O>>
where
    O: Operation,
    O::Args: ArgsRepr,
    O::Output: Encode,
{
    let history = CallHistory::new(op, identity, store.clone());
    CountCalls::new(history, identity, store).with_mode(mode)
}

impl<O> CountCalls<CallHistory<O>> {
    /// Serialize calls through the wrapped history layer.
    ///
    /// See [`CallHistory::serialize_calls`].
    pub fn serialize_calls(mut self, on: bool) -> Self {
        self.inner = self.inner.serialize_calls(on);
        self
    }

    pub fn is_serialized(&self) -> bool {
        self.inner.is_serialized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::memory::MemoryStore;

    fn memory() -> Arc<dyn Store> {
        Arc::new(MemoryStore::new())
    }

    fn doubler() -> impl Operation<Args = (i64,), Output = i64> {
        FnOperation::<_, (i64,), i64>::new(|(n,): (i64,)| async move {
            Ok::<_, CacheError>(n * 2)
        })
    }

    fn fails_on_negative() -> impl Operation<Args = (i64,), Output = i64> {
        FnOperation::<_, (i64,), i64>::new(|(n,): (i64,)| async move {
            if n < 0 {
                Err(CacheError::coercion("arg", "negative input"))
            } else {
                Ok(n)
            }
        })
    }

    /// Echoes its argument after sleeping that many milliseconds.
    fn sleeper() -> impl Operation<Args = (i64,), Output = i64> {
        FnOperation::<_, (i64,), i64>::new(|(ms,): (i64,)| async move {
            if ms > 0 {
                tokio::time::sleep(std::time::Duration::from_millis(ms as u64)).await;
            }
            Ok::<_, CacheError>(ms)
        })
    }

    async fn counter(store: &Arc<dyn Store>, key: &str) -> Option<Vec<u8>> {
        store.get(key).await.unwrap()
    }

    async fn log(store: &Arc<dyn Store>, key: &str) -> Vec<String> {
        store
            .range(key, 0, -1)
            .await
            .unwrap()
            .into_iter()
            .map(|raw| String::from_utf8(raw).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_count_calls_counts_each_invocation() {
        let store = memory();
        let op = CountCalls::new(doubler(), "Math.double", store.clone());

        for n in 0..3 {
            assert_eq!(op.invoke((n,)).await.unwrap(), n * 2);
        }

        assert_eq!(counter(&store, "Math.double").await, Some(b"3".to_vec()));
    }

    #[tokio::test]
    async fn test_count_attempts_includes_failures() {
        let store = memory();
        let op = CountCalls::new(fails_on_negative(), "Math.check", store.clone());

        assert!(op.invoke((1,)).await.is_ok());
        assert!(op.invoke((-1,)).await.is_err());

        assert_eq!(counter(&store, "Math.check").await, Some(b"2".to_vec()));
    }

    #[tokio::test]
    async fn test_count_completed_skips_failures() {
        let store = memory();
        let op = CountCalls::new(fails_on_negative(), "Math.check", store.clone())
            .with_mode(CountMode::Completed);

        assert!(op.invoke((-1,)).await.is_err());
        assert_eq!(counter(&store, "Math.check").await, None);

        assert!(op.invoke((5,)).await.is_ok());
        assert_eq!(counter(&store, "Math.check").await, Some(b"1".to_vec()));
    }

    #[tokio::test]
    async fn test_call_history_logs_stay_aligned() {
        let store = memory();
        let op = CallHistory::new(doubler(), "Math.double", store.clone());

        op.invoke((1,)).await.unwrap();
        op.invoke((20,)).await.unwrap();

        assert_eq!(log(&store, "Math.double:inputs").await, vec!["(1,)", "(20,)"]);
        assert_eq!(log(&store, "Math.double:outputs").await, vec!["2", "40"]);
        // History alone never touches the counter.
        assert!(!store.exists("Math.double").await.unwrap());
    }

    #[tokio::test]
    async fn test_call_history_failure_leaves_outputs_behind() {
        let store = memory();
        let op = CallHistory::new(fails_on_negative(), "Math.check", store.clone());

        op.invoke((1,)).await.unwrap();
        assert!(op.invoke((-7,)).await.is_err());

        assert_eq!(log(&store, "Math.check:inputs").await, vec!["(1,)", "(-7,)"]);
        assert_eq!(log(&store, "Math.check:outputs").await, vec!["1"]);
    }

    #[tokio::test]
    async fn test_overlapping_calls_record_outputs_in_finish_order() {
        let store = memory();
        let op = CallHistory::new(sleeper(), "Clock.wait", store.clone());
        assert!(!op.is_serialized());

        let (slow, fast) = tokio::join!(op.invoke((30,)), op.invoke((0,)));
        assert_eq!((slow.unwrap(), fast.unwrap()), (30, 0));

        assert_eq!(log(&store, "Clock.wait:inputs").await, vec!["(30,)", "(0,)"]);
        assert_eq!(log(&store, "Clock.wait:outputs").await, vec!["0", "30"]);
    }

    #[tokio::test]
    async fn test_serialized_calls_keep_pairs_aligned() {
        let store = memory();
        let op = CallHistory::new(sleeper(), "Clock.wait", store.clone()).serialize_calls(true);
        assert!(op.is_serialized());

        let (slow, fast) = tokio::join!(op.invoke((30,)), op.invoke((0,)));
        assert_eq!((slow.unwrap(), fast.unwrap()), (30, 0));

        assert_eq!(log(&store, "Clock.wait:inputs").await, vec!["(30,)", "(0,)"]);
        assert_eq!(log(&store, "Clock.wait:outputs").await, vec!["30", "0"]);
    }

    #[tokio::test]
    async fn test_call_history_handle() {
        let store = memory();
        let op = CallHistory::new(doubler(), "Math.double", store.clone());

        let handle = op.handle();
        assert_eq!(handle.identity(), "Math.double");
        assert!(Arc::ptr_eq(&handle.live_store().unwrap(), &store));
    }

    #[tokio::test]
    async fn test_instrument_counts_and_records() {
        let store = memory();
        let op = instrument(doubler(), "Math.double", store.clone(), CountMode::Attempts);

        assert_eq!(op.invoke((4,)).await.unwrap(), 8);
        assert_eq!(op.invoke((5,)).await.unwrap(), 10);

        assert_eq!(counter(&store, "Math.double").await, Some(b"2".to_vec()));
        assert_eq!(log(&store, "Math.double:inputs").await, vec!["(4,)", "(5,)"]);
        assert_eq!(log(&store, "Math.double:outputs").await, vec!["8", "10"]);
    }

    #[tokio::test]
    async fn test_counter_failure_stops_the_call() {
        let store = memory();
        // A text value under the counter key makes INCR fail.
        store.set("Math.double", b"not a number").await.unwrap();
        let op = instrument(doubler(), "Math.double", store.clone(), CountMode::Attempts);

        let err = op.invoke((1,)).await.unwrap_err();
        assert!(matches!(err, CacheError::Store { .. }));
        assert!(log(&store, "Math.double:inputs").await.is_empty());
    }

    #[tokio::test]
    async fn test_handle_resolves_while_store_is_alive() {
        let store = memory();
        let op = instrument(doubler(), "Math.double", store.clone(), CountMode::Attempts);

        let handle = op.handle();
        assert_eq!(handle.identity(), "Math.double");
        assert!(handle.live_store().is_some());

        drop(op);
        drop(store);
        assert!(handle.live_store().is_none());
    }

    #[test]
    fn test_detached_handle_has_no_store() {
        let handle = OperationHandle::detached("Cache.store");
        assert!(handle.live_store().is_none());
    }
}
