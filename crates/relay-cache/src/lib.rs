//! Response caching for the raw content relay.
//!
//! This crate provides:
//! - `RequestIdentity` / `CacheKey` - Canonical (method, URL) cache keys
//! - `RouteCachePolicy` - Freshness and immutability of relayed content
//! - `ResponseHeaders` / `RelayHeadersBuilder` - Header pass-through and overrides
//! - `CachedResponse` - The stored (status, headers, body) entry
//! - `ResponseCache` - Store seam, with `InMemoryCache` and Spin's `KvCache`
//!
//! # Example
//!
//! ```ignore
//! use relay_cache::{CacheKeyBuilder, InMemoryCache, RequestIdentity, RouteCachePolicy};
//!
//! let policy = RouteCachePolicy::immutable_public(RouteCachePolicy::ONE_YEAR);
//! let identity = RequestIdentity::new(&method, &url);
//! let key = CacheKeyBuilder::new().with_prefix("relay").build(&identity);
//!
//! let cache = InMemoryCache::new();
//! let lookup = relay_cache::lookup(&cache, &key).await;
//! ```

mod entry;
mod error;
mod headers;
mod key;
mod policy;
mod store;

#[cfg(target_arch = "wasm32")]
mod kv;

pub use entry::*;
pub use error::*;
pub use headers::*;
pub use key::*;
pub use policy::*;
pub use store::*;

#[cfg(target_arch = "wasm32")]
pub use kv::KvCache;
