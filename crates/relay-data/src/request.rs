//! Outbound origin request builder.

use crate::timeout::TimeoutConfig;

/// A GET request to the origin.
///
/// May carry a bearer credential, so `Debug` masks the `Authorization` value.
#[derive(Clone)]
pub struct OriginRequest {
    pub(crate) url: String,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) timeout: TimeoutConfig,
}

impl OriginRequest {
    /// Create a GET request for a URL.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
            timeout: TimeoutConfig::default(),
        }
    }

    /// Set a header, replacing any existing value with the same name.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(&key));
        self.headers.push((key, value.into()));
        self
    }

    /// Add a bearer token authorization header.
    pub fn bearer_auth(self, token: impl AsRef<str>) -> Self {
        self.header("Authorization", format!("Bearer {}", token.as_ref()))
    }

    /// Set the Accept header.
    pub fn accept(self, content_type: impl Into<String>) -> Self {
        self.header("Accept", content_type)
    }

    /// Set the User-Agent header.
    pub fn user_agent(self, agent: impl Into<String>) -> Self {
        self.header("User-Agent", agent)
    }

    /// Set the timeouts.
    pub fn timeout(mut self, timeout: TimeoutConfig) -> Self {
        self.timeout = timeout;
        self
    }

    /// Target URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Request headers in insertion order.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Get a header value (case-insensitive).
    pub fn header_value(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Configured timeouts.
    pub fn timeouts(&self) -> TimeoutConfig {
        self.timeout
    }
}

impl std::fmt::Debug for OriginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let headers: Vec<(&str, &str)> = self
            .headers
            .iter()
            .map(|(k, v)| {
                if k.eq_ignore_ascii_case("authorization") {
                    (k.as_str(), "<redacted>")
                } else {
                    (k.as_str(), v.as_str())
                }
            })
            .collect();
        f.debug_struct("OriginRequest")
            .field("url", &"<redacted>")
            .field("headers", &headers)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_auth() {
        let req = OriginRequest::get("https://origin.test/a").bearer_auth("tok");
        assert_eq!(req.header_value("authorization"), Some("Bearer tok"));
    }

    #[test]
    fn test_header_replaces_case_insensitively() {
        let req = OriginRequest::get("https://origin.test/a")
            .header("accept", "text/plain")
            .accept("application/vnd.github.v3.raw");
        assert_eq!(req.headers().len(), 1);
        assert_eq!(req.header_value("Accept"), Some("application/vnd.github.v3.raw"));
    }

    #[test]
    fn test_debug_redacts_credential() {
        let req = OriginRequest::get("https://origin.test/owner/repo/main/f").bearer_auth("secret");
        let debug = format!("{:?}", req);
        assert!(!debug.contains("secret"));
        assert!(!debug.contains("owner/repo"));
    }
}
