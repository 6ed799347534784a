//! Outbound relay responses.

use bytes::Bytes;
use http::StatusCode;
use relay_cache::{header_names, CachedResponse, RelayHeadersBuilder, ResponseHeaders, RouteCachePolicy};
use relay_core::RelayError;
use relay_data::OriginResponse;

/// Content type of every error body.
pub const ERROR_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Response handed back to the platform harness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayResponse {
    pub status: StatusCode,
    pub headers: ResponseHeaders,
    pub body: Bytes,
}

impl RelayResponse {
    /// Plain-text error response. Carries no cache headers.
    pub fn from_error(err: &RelayError) -> Self {
        let mut headers = ResponseHeaders::new();
        headers.set(header_names::CONTENT_TYPE, ERROR_CONTENT_TYPE);
        Self {
            status: err.status_code(),
            headers,
            body: Bytes::from_static(err.public_message().as_bytes()),
        }
    }

    /// Successful origin response with pass-through headers and the relay overrides.
    pub fn from_origin(origin: OriginResponse, policy: &RouteCachePolicy) -> Self {
        let mut headers = ResponseHeaders::pass_through(origin.headers);
        headers.apply(
            RelayHeadersBuilder::new()
                .cache_control_from_policy(policy)
                .allow_any_origin()
                .nosniff()
                .build(),
        );
        Self {
            status: origin.status,
            headers,
            body: origin.body,
        }
    }

    /// Response replayed from the cache, unmodified.
    pub fn from_cached(cached: CachedResponse) -> Self {
        Self {
            status: cached.status(),
            headers: cached.headers,
            body: cached.body,
        }
    }

    /// Independent copy for the cache.
    pub fn to_cached(&self, policy: &RouteCachePolicy) -> CachedResponse {
        let cached = CachedResponse::new(
            self.status,
            self.headers.clone(),
            self.body.clone(),
            policy.ttl,
        );
        if policy.immutable {
            cached.immutable()
        } else {
            cached
        }
    }

    /// Get a header value (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Body as text, replacing invalid UTF-8.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use relay_core::RouteError;

    use super::*;

    fn policy() -> RouteCachePolicy {
        RouteCachePolicy::immutable_public(RouteCachePolicy::ONE_YEAR)
    }

    #[test]
    fn test_error_response_shape() {
        let response = RelayResponse::from_error(&RelayError::Route(RouteError::InvalidEncoding));
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.body_text(), "invalid token or repo");
        assert_eq!(response.header("content-type"), Some(ERROR_CONTENT_TYPE));
        assert_eq!(response.header("cache-control"), None);
        assert_eq!(response.header("access-control-allow-origin"), None);
    }

    #[test]
    fn test_rejected_keeps_origin_status() {
        let response = RelayResponse::from_error(&RelayError::OriginRejected {
            status: StatusCode::NOT_FOUND,
        });
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.body_text(), "could not fetch content");
    }

    #[test]
    fn test_from_origin_overrides_and_passes_through() {
        let origin = OriginResponse::new(
            StatusCode::OK,
            vec![
                ("Content-Type".to_string(), "text/plain; charset=utf-8".to_string()),
                ("ETag".to_string(), "\"abc\"".to_string()),
                ("cache-control".to_string(), "max-age=300".to_string()),
                ("x-content-type-options".to_string(), "sniff".to_string()),
                ("Transfer-Encoding".to_string(), "chunked".to_string()),
            ],
            "hello",
        );
        let response = RelayResponse::from_origin(origin, &policy());

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body_text(), "hello");
        assert_eq!(response.header("etag"), Some("\"abc\""));
        assert_eq!(response.header("content-type"), Some("text/plain; charset=utf-8"));
        assert_eq!(
            response.header("cache-control"),
            Some("public, max-age=31536000, immutable")
        );
        assert_eq!(response.header("access-control-allow-origin"), Some("*"));
        assert_eq!(response.header("x-content-type-options"), Some("nosniff"));
        assert_eq!(response.header("transfer-encoding"), None);
        assert_eq!(response.headers.len(), 5);
    }

    #[test]
    fn test_cached_copy_round_trips() {
        let origin = OriginResponse::new(StatusCode::OK, Vec::new(), "hello");
        let response = RelayResponse::from_origin(origin, &policy());

        let cached = response.to_cached(&policy());
        assert!(cached.immutable);
        assert_eq!(cached.ttl_secs, 31_536_000);

        assert_eq!(RelayResponse::from_cached(cached), response);
    }
}
