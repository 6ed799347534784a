//! Spin Key-Value store backend.

use async_trait::async_trait;
use spin_sdk::key_value::Store;

use crate::entry::CachedResponse;
use crate::error::{CacheError, CacheResult};
use crate::key::CacheKey;
use crate::store::ResponseCache;

/// Response cache backed by a Spin Key-Value store.
///
/// Entries are JSON with the body as base64. The store has no native
/// expiry, so freshness is checked on lookup.
pub struct KvCache {
    store: Store,
}

impl KvCache {
    /// Open a named Key-Value store.
    pub fn open(label: &str) -> CacheResult<Self> {
        let store = Store::open(label).map_err(|e| CacheError::Open(e.to_string()))?;
        Ok(Self { store })
    }
}

#[async_trait(?Send)]
impl ResponseCache for KvCache {
    async fn get(&self, key: &CacheKey) -> CacheResult<Option<CachedResponse>> {
        match self.store.get(key.as_str()) {
            Ok(Some(bytes)) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(CacheError::Storage(e.to_string())),
        }
    }

    async fn put(&self, key: &CacheKey, response: CachedResponse) -> CacheResult<()> {
        let bytes = serde_json::to_vec(&response)?;
        self.store
            .set(key.as_str(), &bytes)
            .map_err(|e| CacheError::Storage(e.to_string()))
    }
}
