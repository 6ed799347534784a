//! Core abstractions for the raw content relay.
//!
//! This crate provides the fundamental types:
//! - `RelayConfig` - Origin, cache and logging configuration
//! - `RequestContext` - Per-request identity, URL and timing
//! - `DecodedRoute` / `decode_path` - Credential and coordinate decoding
//! - `RelayError` - Client-visible error taxonomy
//! - `LifecyclePhase` - Request lifecycle tracking

mod config;
mod context;
mod error;
mod lifecycle;
mod route;

pub use config::*;
pub use context::*;
pub use error::*;
pub use lifecycle::*;
pub use route::*;
