//! Cache key composition.

use http::Method;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use url::Url;

/// Canonical (method, URL) identity of an inbound request.
///
/// The URL keeps its scheme, host, port, path and query; the fragment is dropped
/// and the host is lower-cased by URL parsing. Header variation never affects it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestIdentity {
    method: Method,
    url: Url,
}

impl RequestIdentity {
    /// Build the identity of a request.
    pub fn new(method: &Method, url: &Url) -> Self {
        let mut url = url.clone();
        url.set_fragment(None);
        Self {
            method: method.clone(),
            url,
        }
    }

    /// Canonical `METHOD URL` form.
    pub fn canonical(&self) -> String {
        format!("{} {}", self.method, self.url)
    }
}

/// A cache key uniquely identifying a cached response.
///
/// Keys are a prefix plus the SHA-256 of the canonical identity, so the inbound
/// URL (which embeds a credential) never appears in the store's key list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    key: String,
}

impl CacheKey {
    /// Create a cache key from a string.
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// Get the key string.
    pub fn as_str(&self) -> &str {
        &self.key
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key)
    }
}

/// Builder for composing cache keys.
#[derive(Debug, Clone, Default)]
pub struct CacheKeyBuilder {
    prefix: Option<String>,
}

impl CacheKeyBuilder {
    /// Create a new cache key builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a prefix for the cache key.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Build the cache key for a request identity.
    pub fn build(&self, identity: &RequestIdentity) -> CacheKey {
        let digest = hex::encode(Sha256::digest(identity.canonical().as_bytes()));
        match &self.prefix {
            Some(prefix) => CacheKey::new(format!("{}:{}", prefix, digest)),
            None => CacheKey::new(digest),
        }
    }
}
