/// Error type for cache operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CacheError {
    /// A store adapter call failed.
    #[error("[{backend}] store error for key '{key}': {message}")]
    Store {
        backend: String,
        key: String,
        message: String,
    },
    /// A typed retrieve found data it could not coerce.
    #[error("cannot coerce value at key '{key}': {message}")]
    Coercion { key: String, message: String },
    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Writing a replay transcript to its sink failed.
    #[error("Replay output error: {0}")]
    Output(String),
}

impl CacheError {
    /// Create a new store error.
    pub fn store(
        backend: impl Into<String>,
        key: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        CacheError::Store {
            backend: backend.into(),
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a new coercion error.
    pub fn coercion(key: impl Into<String>, message: impl Into<String>) -> Self {
        CacheError::Coercion {
            key: key.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = CacheError::store("redis", "Cache.store", "connection refused");
        assert_eq!(
            err.to_string(),
            "[redis] store error for key 'Cache.store': connection refused"
        );
    }

    #[test]
    fn test_coercion_error_display() {
        let err = CacheError::coercion("k1", "invalid digit found in string");
        assert_eq!(
            err.to_string(),
            "cannot coerce value at key 'k1': invalid digit found in string"
        );
    }
}
