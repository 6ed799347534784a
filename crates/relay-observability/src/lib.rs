//! Observability for the raw content relay.
//!
//! This crate provides:
//! - `StructuredLogger` - Per-request structured logging on stderr
//! - `MetricsCollector` / `RequestMetrics` - One metrics record per request

mod logging;
mod metrics;

pub use logging::*;
pub use metrics::*;

// Re-export RequestId and TimingContext from relay-core for convenience
pub use relay_core::{RequestId, TimingContext};
