//! Response header handling.

use serde::{Deserialize, Serialize};

use crate::policy::RouteCachePolicy;

/// Header names the relay sets or inspects.
pub mod header_names {
    pub const CACHE_CONTROL: &str = "Cache-Control";
    pub const ACCESS_CONTROL_ALLOW_ORIGIN: &str = "Access-Control-Allow-Origin";
    pub const X_CONTENT_TYPE_OPTIONS: &str = "X-Content-Type-Options";
    pub const CONTENT_TYPE: &str = "Content-Type";
}

/// Headers that describe a single connection or the original message framing.
/// The relay buffers and re-frames the body, so these are not passed through.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Check whether a header is hop-by-hop.
pub fn is_hop_by_hop(name: &str) -> bool {
    HOP_BY_HOP.iter().any(|h| h.eq_ignore_ascii_case(name))
}

/// Ordered response headers with case-insensitive lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseHeaders(Vec<(String, String)>);

impl ResponseHeaders {
    /// Create an empty header list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take origin headers, dropping hop-by-hop ones.
    pub fn pass_through(origin: impl IntoIterator<Item = (String, String)>) -> Self {
        Self(
            origin
                .into_iter()
                .filter(|(name, _)| !is_hop_by_hop(name))
                .collect(),
        )
    }

    /// Get the first value for a header.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Replace every value of a header with one value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.remove(&name);
        self.0.push((name, value.into()));
    }

    /// Remove every value of a header.
    pub fn remove(&mut self, name: &str) {
        self.0.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    }

    /// Apply a list of overrides with `set`.
    pub fn apply(&mut self, overrides: Vec<(String, String)>) {
        for (name, value) in overrides {
            self.set(name, value);
        }
    }

    /// Iterate headers in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of header entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no headers.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for ResponseHeaders {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Builder for the headers the relay forces onto every successful response.
#[derive(Debug, Default)]
pub struct RelayHeadersBuilder {
    cache_control: Option<String>,
    allow_origin: Option<String>,
    nosniff: bool,
}

impl RelayHeadersBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set Cache-Control from policy.
    pub fn cache_control_from_policy(mut self, policy: &RouteCachePolicy) -> Self {
        self.cache_control = Some(policy.cache_control_header());
        self
    }

    /// Allow any origin to read the response.
    pub fn allow_any_origin(mut self) -> Self {
        self.allow_origin = Some("*".to_string());
        self
    }

    /// Forbid MIME sniffing.
    pub fn nosniff(mut self) -> Self {
        self.nosniff = true;
        self
    }

    /// Build the headers.
    pub fn build(self) -> Vec<(String, String)> {
        let mut headers = Vec::new();

        if let Some(cc) = self.cache_control {
            headers.push((header_names::CACHE_CONTROL.to_string(), cc));
        }

        if let Some(origin) = self.allow_origin {
            headers.push((header_names::ACCESS_CONTROL_ALLOW_ORIGIN.to_string(), origin));
        }

        if self.nosniff {
            headers.push((
                header_names::X_CONTENT_TYPE_OPTIONS.to_string(),
                "nosniff".to_string(),
            ));
        }

        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(headers: &[(&str, &str)]) -> Vec<(String, String)> {
        headers
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_pass_through_drops_hop_by_hop() {
        let headers = ResponseHeaders::pass_through(owned(&[
            ("Content-Type", "text/plain"),
            ("Transfer-Encoding", "chunked"),
            ("connection", "keep-alive"),
            ("ETag", "\"abc\""),
        ]));
        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("content-type"), Some("text/plain"));
        assert_eq!(headers.get("etag"), Some("\"abc\""));
        assert_eq!(headers.get("transfer-encoding"), None);
    }

    #[test]
    fn test_set_replaces_case_insensitively() {
        let mut headers = ResponseHeaders::pass_through(owned(&[
            ("cache-control", "max-age=300"),
            ("Cache-Control", "private"),
        ]));
        headers.set("Cache-Control", "no-store");
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("CACHE-CONTROL"), Some("no-store"));
    }

    #[test]
    fn test_relay_headers_builder() {
        let policy = RouteCachePolicy::immutable_public(RouteCachePolicy::ONE_YEAR);
        let headers = RelayHeadersBuilder::new()
            .cache_control_from_policy(&policy)
            .allow_any_origin()
            .nosniff()
            .build();

        assert_eq!(
            headers,
            owned(&[
                ("Cache-Control", "public, max-age=31536000, immutable"),
                ("Access-Control-Allow-Origin", "*"),
                ("X-Content-Type-Options", "nosniff"),
            ])
        );
    }

    #[test]
    fn test_apply_overrides_origin_values() {
        let mut headers = ResponseHeaders::pass_through(owned(&[
            ("content-type", "text/plain"),
            ("cache-control", "max-age=300"),
            ("access-control-allow-origin", "https://github.com"),
        ]));
        headers.apply(
            RelayHeadersBuilder::new()
                .cache_control_from_policy(&RouteCachePolicy::immutable_public(
                    RouteCachePolicy::ONE_YEAR,
                ))
                .allow_any_origin()
                .build(),
        );

        assert_eq!(headers.get("Content-Type"), Some("text/plain"));
        assert_eq!(headers.get("Cache-Control"), Some("public, max-age=31536000, immutable"));
        assert_eq!(headers.get("Access-Control-Allow-Origin"), Some("*"));
        assert_eq!(headers.len(), 3);
    }

    #[test]
    fn test_is_hop_by_hop() {
        assert!(is_hop_by_hop("Keep-Alive"));
        assert!(is_hop_by_hop("TE"));
        assert!(!is_hop_by_hop("Content-Length"));
    }
}
