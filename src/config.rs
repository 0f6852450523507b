use serde::{Deserialize, Serialize};

use crate::error::CacheError;

/// When the call counter is incremented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountMode {
    /// Increment before delegating, whatever the outcome of the inner call.
    #[default]
    Attempts,
    /// Increment only after the inner call returned successfully.
    Completed,
}

/// Configuration for `Cache`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Counting policy of the instrumented operations.
    ///
    /// Default: `CountMode::Attempts`
    pub count_mode: CountMode,

    /// Drop every key in the store when the cache is constructed.
    ///
    /// Default: `true`
    pub clear_on_init: bool,

    /// Run instrumented calls one at a time so the history logs stay
    /// index-aligned under concurrent use.
    ///
    /// Default: `false`
    pub serialize_calls: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            count_mode: CountMode::default(),
            clear_on_init: true,
            serialize_calls: false,
        }
    }
}

impl CacheConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    ///
    /// # Example
    /// ```ignore
    /// let config = CacheConfig::from_json(r#"{"count_mode": "completed"}"#)?;
    /// ```
    pub fn from_json(json: &str) -> Result<Self, CacheError> {
        serde_json::from_str(json)
            .map_err(|e| CacheError::Serialization(format!("Invalid cache config: {}", e)))
    }
}
