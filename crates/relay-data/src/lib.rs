//! Origin fetch layer for the raw content relay.
//!
//! This crate provides:
//! - `OriginClient` - The seam between the relay and the content host
//! - `OriginRequest` - Outbound request builder with bearer auth
//! - `OriginResponse` - Fully buffered origin response
//! - `HttpOriginClient` - reqwest-backed client (native targets)
//! - `SpinOriginClient` - Spin outbound HTTP client (wasm32)

mod client;
mod error;
mod request;
mod response;
mod target;
mod timeout;

#[cfg(not(target_arch = "wasm32"))]
mod http_client;
#[cfg(target_arch = "wasm32")]
mod spin;

pub use client::*;
pub use error::FetchError;
pub use request::OriginRequest;
pub use response::OriginResponse;
pub use target::OriginTarget;
pub use timeout::{OutboundTimeouts, TimeoutConfig};

#[cfg(not(target_arch = "wasm32"))]
pub use http_client::HttpOriginClient;
#[cfg(target_arch = "wasm32")]
pub use spin::SpinOriginClient;
