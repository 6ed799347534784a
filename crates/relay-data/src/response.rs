//! Origin response handling.

use bytes::Bytes;
use http::StatusCode;

/// A fully buffered origin response.
///
/// The body is read once into `Bytes`; clones share the buffer but each is an
/// independently readable view.
#[derive(Debug, Clone)]
pub struct OriginResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The response headers in origin order.
    pub headers: Vec<(String, String)>,
    /// The response body.
    pub body: Bytes,
}

impl OriginResponse {
    /// Create a new response.
    pub fn new(status: StatusCode, headers: Vec<(String, String)>, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Check if the response was successful (2xx status).
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Get a header value (case-insensitive).
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Get the Content-Type header.
    pub fn content_type(&self) -> Option<&str> {
        self.header("Content-Type")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_response(status: u16, body: &'static [u8]) -> OriginResponse {
        OriginResponse::new(StatusCode::from_u16(status).unwrap(), Vec::new(), body)
    }

    fn make_response_with_headers(headers: Vec<(&str, &str)>) -> OriginResponse {
        let headers = headers
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        OriginResponse::new(StatusCode::OK, headers, Bytes::new())
    }

    #[test]
    fn test_response_is_success() {
        assert!(make_response(200, b"").is_success());
        assert!(make_response(204, b"").is_success());
        assert!(!make_response(304, b"").is_success());
        assert!(!make_response(404, b"").is_success());
        assert!(!make_response(502, b"").is_success());
    }

    #[test]
    fn test_response_header_case_insensitive() {
        let resp = make_response_with_headers(vec![("Content-Type", "text/plain")]);
        assert_eq!(resp.header("content-type"), Some("text/plain"));
        assert_eq!(resp.content_type(), Some("text/plain"));
        assert_eq!(resp.header("X-Missing"), None);
    }

    #[test]
    fn test_response_clone_is_independent_view() {
        let resp = make_response(200, b"hello");
        let copy = resp.clone();
        drop(resp);
        assert_eq!(&copy.body[..], b"hello");
    }
}
