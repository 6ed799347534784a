//! Cache error types.

use thiserror::Error;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Errors that can occur when using the cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Failed to open the store.
    #[error("failed to open store: {0}")]
    Open(String),

    /// Backend storage error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Failed to serialize or deserialize an entry.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
