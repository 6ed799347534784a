//! Cached response entries.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::headers::ResponseHeaders;

/// A stored (status, headers, body) response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers as served.
    pub headers: ResponseHeaders,
    /// Response body.
    #[serde(with = "body_base64")]
    pub body: Bytes,
    /// Unix timestamp (seconds) when the entry was stored.
    pub stored_at: u64,
    /// Freshness lifetime in seconds.
    pub ttl_secs: u64,
    /// Whether the entry is marked immutable.
    #[serde(default)]
    pub immutable: bool,
}

impl CachedResponse {
    /// Create an entry stored now.
    pub fn new(status: StatusCode, headers: ResponseHeaders, body: Bytes, ttl: Duration) -> Self {
        Self {
            status: status.as_u16(),
            headers,
            body,
            stored_at: current_timestamp(),
            ttl_secs: ttl.as_secs(),
            immutable: false,
        }
    }

    /// Mark the entry immutable.
    pub fn immutable(mut self) -> Self {
        self.immutable = true;
        self
    }

    /// Status as an `http::StatusCode`.
    ///
    /// Falls back to 500 for a corrupted entry.
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Check if the entry has outlived its freshness lifetime.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp())
    }

    /// Check expiry against an explicit timestamp.
    pub fn is_expired_at(&self, now: u64) -> bool {
        now > self.stored_at.saturating_add(self.ttl_secs)
    }
}

/// Current Unix timestamp in seconds.
pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Serde adapter storing bodies as standard base64 text.
mod body_base64 {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use bytes::Bytes;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(body: &Bytes, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(body))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Bytes, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map(Bytes::from)
            .map_err(serde::de::Error::custom)
    }
}
