//! Origin URL split into the parts an outgoing request is built from.

use url::Url;

use crate::error::FetchError;

/// Scheme, authority and path of an origin URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginTarget {
    pub https: bool,
    /// `host` or `host:port`.
    pub authority: String,
    /// Path plus `?query` when present. Never empty.
    pub path_with_query: String,
}

impl OriginTarget {
    /// Parse an absolute http(s) URL.
    ///
    /// Errors never include the URL, since its path embeds the route.
    pub fn parse(url: &str) -> Result<Self, FetchError> {
        let url = Url::parse(url).map_err(|e| FetchError::Request(format!("invalid origin URL: {}", e)))?;

        let https = match url.scheme() {
            "https" => true,
            "http" => false,
            other => {
                return Err(FetchError::Request(format!(
                    "unsupported origin scheme: {}",
                    other
                )))
            }
        };

        let host = url
            .host_str()
            .ok_or_else(|| FetchError::Request("origin URL has no host".to_string()))?;
        let authority = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };

        let path_with_query = match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        };

        Ok(Self {
            https,
            authority,
            path_with_query,
        })
    }
}
