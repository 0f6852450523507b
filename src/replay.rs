//! Read-back of an instrumented operation's counter and history logs.

use serde::Serialize;
use std::fmt;
use std::io::Write;

use crate::error::CacheError;
use crate::operation::OperationHandle;
use crate::store::Store;
use crate::utils::{inputs_key, outputs_key};

/// One recorded call: the argument tuple and the result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplayEntry {
    pub input: String,
    pub output: String,
}

/// The call history of one operation.
///
/// `calls` is the persisted counter and is independent of `entries`: failed
/// calls are counted but have no matching output, so the two can differ.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transcript {
    pub name: String,
    pub calls: i64,
    pub entries: Vec<ReplayEntry>,
}

impl Transcript {
    pub fn to_json(&self) -> Result<String, CacheError> {
        serde_json::to_string(self)
            .map_err(|e| CacheError::Serialization(format!("Serialization failed: {}", e)))
    }
}

impl fmt::Display for Transcript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} was called {} times:", self.name, self.calls)?;
        for entry in &self.entries {
            writeln!(f, "{}(*{}) -> {}", self.name, entry.input, entry.output)?;
        }
        Ok(())
    }
}

async fn read_counter(store: &dyn Store, identity: &str) -> Result<i64, CacheError> {
    if !store.exists(identity).await? {
        return Ok(0);
    }
    let Some(raw) = store.get(identity).await? else {
        return Ok(0);
    };

    String::from_utf8_lossy(&raw)
        .trim()
        .parse::<i64>()
        .map_err(|e| CacheError::coercion(identity, format!("Invalid call counter: {}", e)))
}

/// Build the transcript of the operation behind `handle`.
///
/// Returns `Ok(None)` when the handle is detached or its store is gone.
/// Inputs and outputs are paired by position; entries past the end of the
/// shorter log are dropped.
pub async fn transcript(handle: &OperationHandle) -> Result<Option<Transcript>, CacheError> {
    let Some(store) = handle.live_store() else {
        return Ok(None);
    };
    let name = handle.identity();

    let calls = read_counter(store.as_ref(), name).await?;
    let inputs = store.range(&inputs_key(name), 0, -1).await?;
    let outputs = store.range(&outputs_key(name), 0, -1).await?;

    if inputs.len() != outputs.len() {
        tracing::debug!(
            "History logs differ in length, dropping unmatched tail: identity={}, inputs={}, outputs={}",
            name,
            inputs.len(),
            outputs.len()
        );
    }

    let entries = inputs
        .into_iter()
        .zip(outputs)
        .map(|(input, output)| ReplayEntry {
            input: String::from_utf8_lossy(&input).into_owned(),
            output: String::from_utf8_lossy(&output).into_owned(),
        })
        .collect();

    Ok(Some(Transcript {
        name: name.to_string(),
        calls,
        entries,
    }))
}

/// Print the transcript of `handle` to stdout. Prints nothing for an
/// unresolvable handle.
pub async fn replay(handle: &OperationHandle) -> Result<(), CacheError> {
    replay_to(handle, &mut std::io::stdout()).await
}

/// Write the transcript of `handle` to `out`. Writes nothing for an
/// unresolvable handle.
pub async fn replay_to<W: Write>(handle: &OperationHandle, out: &mut W) -> Result<(), CacheError> {
    let Some(transcript) = transcript(handle).await? else {
        return Ok(());
    };
    write!(out, "{}", transcript).map_err(|e| CacheError::Output(e.to_string()))
}
