//! reqwest-backed origin client for native targets.

use std::borrow::Cow;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use http::StatusCode;
use relay_core::{byte_string, OriginConfig};
use reqwest::header::HeaderValue;
use reqwest::Client;

use crate::client::OriginClient;
use crate::error::FetchError;
use crate::request::OriginRequest;
use crate::response::OriginResponse;

/// Origin client backed by a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpOriginClient {
    http: Client,
    connect_timeout: Duration,
}

impl HttpOriginClient {
    /// Create a client whose pool uses the connect timeout from origin
    /// configuration. The total timeout is applied per request.
    pub fn new(config: &OriginConfig) -> Result<Self, FetchError> {
        let connect_timeout = config.connect_timeout();
        Ok(Self {
            http: build_client(connect_timeout)?,
            connect_timeout,
        })
    }

    /// The pooled client, or a one-off client when the request asks for a
    /// different connect timeout. reqwest only sets connect timeouts per client.
    fn client_for(&self, connect: Duration) -> Result<Cow<'_, Client>, FetchError> {
        if connect == self.connect_timeout {
            Ok(Cow::Borrowed(&self.http))
        } else {
            build_client(connect).map(Cow::Owned)
        }
    }
}

fn build_client(connect_timeout: Duration) -> Result<Client, FetchError> {
    Client::builder()
        .connect_timeout(connect_timeout)
        .build()
        .map_err(|e| FetchError::Request(format!("failed to build HTTP client: {}", e)))
}

#[async_trait(?Send)]
impl OriginClient for HttpOriginClient {
    async fn fetch(&self, request: OriginRequest) -> Result<OriginResponse, FetchError> {
        let start = Instant::now();
        let timeouts = request.timeouts();
        let total = timeouts.total;

        let http = self.client_for(timeouts.connect)?;
        let mut builder = http.get(request.url()).timeout(total);
        for (name, value) in request.headers() {
            let value = HeaderValue::from_bytes(&byte_string(value))
                .map_err(|_| FetchError::Request(format!("invalid value for header {}", name)))?;
            builder = builder.header(name.as_str(), value);
        }

        let response = builder.send().await.map_err(|e| classify(e, total))?;

        let status = StatusCode::from_u16(response.status().as_u16())
            .map_err(|e| FetchError::Request(e.to_string()))?;
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        let body = response.bytes().await.map_err(|e| {
            let e = e.without_url();
            if e.is_timeout() {
                FetchError::Timeout(total)
            } else {
                FetchError::Body(e.to_string())
            }
        })?;

        tracing::debug!(
            status = status.as_u16(),
            bytes = body.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "origin fetch finished"
        );

        Ok(OriginResponse::new(status, headers, body))
    }
}

/// Map a reqwest error, dropping the URL since it embeds the route.
fn classify(err: reqwest::Error, total: Duration) -> FetchError {
    let err = err.without_url();
    if err.is_timeout() {
        FetchError::Timeout(total)
    } else if err.is_builder() {
        FetchError::Request(err.to_string())
    } else {
        FetchError::Connection(err.to_string())
    }
}
