//! Per-request relay metrics.

use std::fmt;
use std::time::{Duration, Instant};

use relay_core::RequestId;
use serde::{Deserialize, Serialize};

/// Metrics for a single relayed request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestMetrics {
    /// Request ID for correlation.
    pub request_id: String,
    /// Workload name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workload: Option<String>,
    /// Cache lookup outcome (HIT, MISS, EXPIRED, ERROR).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_status: Option<String>,
    /// Stable error label when the request failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
    /// Origin fetch, when one happened.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<OriginMetrics>,
    /// Whether writing the response to the cache failed.
    pub cache_store_failed: bool,
    /// Body bytes sent to the client.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_bytes: Option<usize>,
    /// Total request duration (microseconds).
    pub total_duration_us: u64,
    /// HTTP status code sent to the client.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

/// Metrics for the origin fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OriginMetrics {
    /// Fetch duration (microseconds).
    pub duration_us: u64,
    /// Origin status code; absent on transport failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    /// Origin body size in bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_bytes: Option<usize>,
    /// Error message if the fetch failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OriginMetrics {
    /// Whether the origin answered with a 2xx status.
    pub fn success(&self) -> bool {
        matches!(self.status_code, Some(200..=299))
    }
}

/// Collector for request metrics.
#[derive(Debug)]
pub struct MetricsCollector {
    request_id: RequestId,
    workload: Option<String>,
    start: Instant,
    cache_status: Option<String>,
    error_kind: Option<String>,
    origin: Option<OriginMetrics>,
    cache_store_failed: bool,
}

impl MetricsCollector {
    /// Create a new metrics collector.
    pub fn new(request_id: RequestId) -> Self {
        Self {
            request_id,
            workload: None,
            start: Instant::now(),
            cache_status: None,
            error_kind: None,
            origin: None,
            cache_store_failed: false,
        }
    }

    /// Set workload name.
    pub fn set_workload(&mut self, workload: impl Into<String>) {
        self.workload = Some(workload.into());
    }

    /// Record the cache lookup outcome.
    pub fn record_cache_status(&mut self, status: impl fmt::Display) {
        self.cache_status = Some(status.to_string());
    }

    /// Record an origin response.
    pub fn record_origin(&mut self, duration: Duration, status_code: u16, response_bytes: usize) {
        self.origin = Some(OriginMetrics {
            duration_us: duration.as_micros() as u64,
            status_code: Some(status_code),
            response_bytes: Some(response_bytes),
            error: None,
        });
    }

    /// Record an origin transport failure.
    pub fn record_origin_failure(&mut self, duration: Duration, error: impl Into<String>) {
        self.origin = Some(OriginMetrics {
            duration_us: duration.as_micros() as u64,
            status_code: None,
            response_bytes: None,
            error: Some(error.into()),
        });
    }

    /// Record a failed cache write.
    pub fn record_store_failure(&mut self) {
        self.cache_store_failed = true;
    }

    /// Record the error label for a failed request.
    pub fn record_error(&mut self, kind: impl Into<String>) {
        self.error_kind = Some(kind.into());
    }

    /// Finalize and return the metrics.
    pub fn finalize(self, status_code: Option<u16>, response_bytes: Option<usize>) -> RequestMetrics {
        RequestMetrics {
            request_id: self.request_id.to_string(),
            workload: self.workload,
            cache_status: self.cache_status,
            error_kind: self.error_kind,
            origin: self.origin,
            cache_store_failed: self.cache_store_failed,
            response_bytes,
            total_duration_us: self.start.elapsed().as_micros() as u64,
            status_code,
        }
    }
}

impl RequestMetrics {
    /// Format as JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Format as human-readable summary.
    pub fn to_summary(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Request: {}", self.request_id));

        if let Some(status) = self.status_code {
            lines.push(format!("  Status: {}", status));
        }

        if let Some(cache) = &self.cache_status {
            lines.push(format!("  Cache: {}", cache));
        }

        if let Some(origin) = &self.origin {
            let status = match origin.status_code {
                Some(code) => code.to_string(),
                None => "FAILED".to_string(),
            };
            lines.push(format!(
                "  Origin [{}]: {}us ({:.2}ms)",
                status,
                origin.duration_us,
                origin.duration_us as f64 / 1000.0
            ));
        }

        if self.cache_store_failed {
            lines.push("  Cache store: FAILED".to_string());
        }

        lines.push(format!(
            "  Total: {}us ({:.2}ms)",
            self.total_duration_us,
            self.total_duration_us as f64 / 1000.0
        ));

        lines.join("\n")
    }
}
