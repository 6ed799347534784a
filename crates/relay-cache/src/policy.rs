//! Cache policy for relayed content.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Cache scope determining who can cache the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheScope {
    /// Cacheable by CDN and browser (shared cache).
    Public,
    /// No caching.
    #[default]
    None,
}

impl CacheScope {
    /// Get the Cache-Control directive for this scope.
    pub fn cache_control_directive(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::None => "no-store",
        }
    }

    /// Check if this scope allows any caching.
    pub fn allows_caching(&self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Route-level cache policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteCachePolicy {
    /// Cache scope.
    pub scope: CacheScope,
    /// Freshness lifetime of a stored response.
    pub ttl: Duration,
    /// Content never changes for a key, so it is never revalidated.
    pub immutable: bool,
}

impl Default for RouteCachePolicy {
    fn default() -> Self {
        Self {
            scope: CacheScope::None,
            ttl: Duration::ZERO,
            immutable: false,
        }
    }
}

impl RouteCachePolicy {
    /// One year, the longest `max-age` caches are expected to honor.
    pub const ONE_YEAR: Duration = Duration::from_secs(31_536_000);

    /// Create a public cache policy.
    pub fn public(ttl: Duration) -> Self {
        Self {
            scope: CacheScope::Public,
            ttl,
            immutable: false,
        }
    }

    /// Create a public policy for content that never changes.
    pub fn immutable_public(ttl: Duration) -> Self {
        Self {
            immutable: true,
            ..Self::public(ttl)
        }
    }

    /// Whether responses under this policy are stored at all.
    pub fn is_cacheable(&self) -> bool {
        self.scope.allows_caching() && !self.ttl.is_zero()
    }

    /// Generate Cache-Control header value.
    pub fn cache_control_header(&self) -> String {
        if !self.is_cacheable() {
            return "no-store".to_string();
        }

        let mut parts = vec![
            self.scope.cache_control_directive().to_string(),
            format!("max-age={}", self.ttl.as_secs()),
        ];

        if self.immutable {
            parts.push("immutable".to_string());
        }

        parts.join(", ")
    }
}
