//! Timeout configuration for origin fetches.

use std::time::Duration;

use relay_core::OriginConfig;

/// Timeout configuration for a fetch operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutConfig {
    /// Connection timeout.
    pub connect: Duration,
    /// Total operation timeout.
    pub total: Duration,
}

impl TimeoutConfig {
    /// Create a new timeout configuration.
    pub fn new(connect: Duration, total: Duration) -> Self {
        Self { connect, total }
    }

    /// Create from a single total timeout.
    pub fn from_total(total: Duration) -> Self {
        Self {
            connect: Duration::from_millis(total.as_millis() as u64 / 4),
            total,
        }
    }

    /// Read timeouts from origin configuration.
    pub fn from_config(config: &OriginConfig) -> Self {
        Self::new(config.connect_timeout(), config.timeout())
    }
}

/// Per-phase deadlines in nanoseconds, as wasi-http request options take them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutboundTimeouts {
    pub connect_ns: u64,
    pub first_byte_ns: u64,
    pub between_bytes_ns: u64,
}

impl TimeoutConfig {
    /// Phase deadlines for a host that times connect, first byte and body
    /// reads separately. Both read phases are bounded by the total.
    pub fn outbound(&self) -> OutboundTimeouts {
        let total = saturating_nanos(self.total);
        OutboundTimeouts {
            connect_ns: saturating_nanos(self.connect.min(self.total)),
            first_byte_ns: total,
            between_bytes_ns: total,
        }
    }
}

fn saturating_nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self::from_config(&OriginConfig::default())
    }
}
