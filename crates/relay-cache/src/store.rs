//! Response cache backends and lookup.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::entry::CachedResponse;
use crate::error::{CacheError, CacheResult};
use crate::key::CacheKey;

/// Status of a cache lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStatus {
    /// Fresh cache hit.
    Hit,
    /// Cache miss.
    Miss,
    /// Entry found but past its freshness lifetime.
    Expired,
    /// The store failed; treated as a miss.
    Error,
}

impl CacheStatus {
    /// Whether the lookup produced a servable response.
    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit)
    }
}

impl std::fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hit => write!(f, "HIT"),
            Self::Miss => write!(f, "MISS"),
            Self::Expired => write!(f, "EXPIRED"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// Response cache backend.
///
/// Both operations may suspend. Implementations do their own locking.
#[async_trait(?Send)]
pub trait ResponseCache {
    /// Get a stored response.
    async fn get(&self, key: &CacheKey) -> CacheResult<Option<CachedResponse>>;

    /// Store a response, replacing any previous entry.
    async fn put(&self, key: &CacheKey, response: CachedResponse) -> CacheResult<()>;
}

#[async_trait(?Send)]
impl<T: ResponseCache + ?Sized> ResponseCache for Arc<T> {
    async fn get(&self, key: &CacheKey) -> CacheResult<Option<CachedResponse>> {
        (**self).get(key).await
    }

    async fn put(&self, key: &CacheKey, response: CachedResponse) -> CacheResult<()> {
        (**self).put(key, response).await
    }
}

/// Result of a cache lookup with metadata.
#[derive(Debug)]
pub struct CacheLookup {
    /// The cached response, present only on a fresh hit.
    pub response: Option<CachedResponse>,
    /// Lookup status.
    pub status: CacheStatus,
    /// Store error detail, for logging.
    pub error: Option<String>,
}

impl CacheLookup {
    /// Create a hit result.
    pub fn hit(response: CachedResponse) -> Self {
        Self {
            response: Some(response),
            status: CacheStatus::Hit,
            error: None,
        }
    }

    /// Create a miss result.
    pub fn miss() -> Self {
        Self {
            response: None,
            status: CacheStatus::Miss,
            error: None,
        }
    }

    /// Create an expired result.
    pub fn expired() -> Self {
        Self {
            response: None,
            status: CacheStatus::Expired,
            error: None,
        }
    }

    /// Create an error result.
    pub fn error(err: &CacheError) -> Self {
        Self {
            response: None,
            status: CacheStatus::Error,
            error: Some(err.to_string()),
        }
    }
}

/// Look up a key, folding expiry and store errors into misses.
pub async fn lookup<C: ResponseCache + ?Sized>(cache: &C, key: &CacheKey) -> CacheLookup {
    match cache.get(key).await {
        Ok(Some(response)) if response.is_expired() => CacheLookup::expired(),
        Ok(Some(response)) => CacheLookup::hit(response),
        Ok(None) => CacheLookup::miss(),
        Err(e) => CacheLookup::error(&e),
    }
}

/// In-memory response cache for native runs and tests.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    entries: RwLock<HashMap<String, CachedResponse>>,
}

impl InMemoryCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait(?Send)]
impl ResponseCache for InMemoryCache {
    async fn get(&self, key: &CacheKey) -> CacheResult<Option<CachedResponse>> {
        let entries = self
            .entries
            .read()
            .map_err(|e| CacheError::Storage(e.to_string()))?;
        Ok(entries.get(key.as_str()).cloned())
    }

    async fn put(&self, key: &CacheKey, response: CachedResponse) -> CacheResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| CacheError::Storage(e.to_string()))?;
        entries.insert(key.as_str().to_string(), response);
        Ok(())
    }
}
