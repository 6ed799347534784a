//! Request context.

use std::collections::HashMap;

use http::Method;
use rand::Rng;
use url::Url;

use crate::lifecycle::TimingContext;

/// Header carrying a caller-supplied request ID.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Unique request identifier for tracing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(pub String);

impl RequestId {
    /// Generate a new request ID.
    pub fn generate() -> Self {
        let bytes: [u8; 12] = rand::thread_rng().gen();
        let id = bytes.iter().map(|b| format!("{:02x}", b)).collect();
        Self(id)
    }

    /// Create from an existing ID string.
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// HTTP headers, keyed by lower-cased name.
pub type Headers = HashMap<String, String>;

/// Error building a request context from raw request parts.
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("invalid request method: {0}")]
    InvalidMethod(String),
}

/// Typed request context passed through the relay pipeline.
#[derive(Debug)]
pub struct RequestContext {
    /// Unique request identifier.
    pub request_id: RequestId,
    /// HTTP method.
    pub method: Method,
    /// Full request URL.
    pub url: Url,
    /// HTTP headers.
    pub headers: Headers,
    /// Timing context for observability.
    pub timing: TimingContext,
}

impl RequestContext {
    /// Create a new request context.
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            request_id: RequestId::generate(),
            method,
            url,
            headers: HashMap::new(),
            timing: TimingContext::new(),
        }
    }

    /// Build a context from a method string and an absolute URL string.
    pub fn parse(method: &str, url: &str) -> Result<Self, ContextError> {
        let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
            .map_err(|_| ContextError::InvalidMethod(method.to_string()))?;
        let url = Url::parse(url)?;
        Ok(Self::new(method, url))
    }

    /// Attach request headers. An `X-Request-ID` header replaces the generated ID.
    pub fn with_headers<K, V>(mut self, headers: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        for (name, value) in headers {
            self.headers
                .insert(name.as_ref().to_ascii_lowercase(), value.into());
        }
        if let Some(id) = self.headers.get(REQUEST_ID_HEADER) {
            if !id.is_empty() {
                self.request_id = RequestId::from_string(id.clone());
            }
        }
        self
    }

    /// Request path, still percent-encoded.
    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// Get a header value by name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(|v| v.as_str())
    }
}
