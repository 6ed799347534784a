//! Public SDK for the raw content relay.
//!
//! `Relay` runs the four-stage pipeline (cache lookup, path decode, origin
//! fetch, assemble and store) over any `ResponseCache` and `OriginClient`:
//!
//! ```ignore
//! use relay_sdk::prelude::*;
//!
//! let relay = Relay::new(RelayConfig::default(), InMemoryCache::new(), origin)
//!     .with_workload("raw-relay");
//!
//! let mut ctx = RequestContext::parse("GET", "https://relay.example/dG9rZW4.../b3duZXIv.../README.md")?;
//! let outcome = relay.handle(&mut ctx).await;
//! eprintln!("{}", outcome.metrics.to_json());
//! ```

mod relay;
mod response;

pub use relay::*;
pub use response::*;

pub use relay_cache;
pub use relay_core;
pub use relay_data;
pub use relay_observability;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Relay, RelayOutcome, RelayResponse};
    pub use relay_cache::*;
    pub use relay_core::*;
    pub use relay_data::*;
    pub use relay_observability::*;
}
