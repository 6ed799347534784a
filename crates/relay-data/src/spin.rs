//! Spin outbound HTTP origin client.

use async_trait::async_trait;
use http::StatusCode;
use relay_core::byte_string;
use spin_sdk::http::{ErrorCode, Fields, IncomingResponse, Method, OutgoingBody, OutgoingRequest, Scheme};
use spin_sdk::wit::wasi::http0_2_0::outgoing_handler;
use spin_sdk::wit::wasi::http0_2_0::types::RequestOptions;

use crate::client::OriginClient;
use crate::error::FetchError;
use crate::request::OriginRequest;
use crate::response::OriginResponse;
use crate::target::OriginTarget;
use crate::timeout::TimeoutConfig;

/// Origin client using Spin's outbound HTTP.
///
/// The origin host must be listed in the component's `allowed_outbound_hosts`.
/// The request's timeouts become wasi-http request options: `connect` bounds
/// connection setup, `total` bounds the wait for the first response byte and
/// each gap between body bytes. An expired deadline is `FetchError::Timeout`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SpinOriginClient;

impl SpinOriginClient {
    /// Create a new client.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait(?Send)]
impl OriginClient for SpinOriginClient {
    async fn fetch(&self, request: OriginRequest) -> Result<OriginResponse, FetchError> {
        let timeouts = request.timeouts();
        let target = OriginTarget::parse(request.url())?;

        let entries: Vec<(String, Vec<u8>)> = request
            .headers()
            .iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), byte_string(v)))
            .collect();
        let headers = Fields::from_list(&entries)
            .map_err(|e| FetchError::Request(format!("invalid request header: {:?}", e)))?;

        let outgoing = OutgoingRequest::new(headers);
        let scheme = if target.https { Scheme::Https } else { Scheme::Http };
        outgoing
            .set_method(&Method::Get)
            .and_then(|_| outgoing.set_scheme(Some(&scheme)))
            .and_then(|_| outgoing.set_authority(Some(&target.authority)))
            .and_then(|_| outgoing.set_path_with_query(Some(&target.path_with_query)))
            .map_err(|_| FetchError::Request("origin URL rejected by host".to_string()))?;

        let body = outgoing
            .body()
            .map_err(|_| FetchError::Request("request body unavailable".to_string()))?;

        let pending = outgoing_handler::handle(outgoing, Some(request_options(&timeouts)?))
            .map_err(|e| classify(e, &timeouts))?;
        OutgoingBody::finish(body, None).map_err(|e| classify(e, &timeouts))?;

        pending.subscribe().block();
        let response: IncomingResponse = match pending.get() {
            Some(Ok(Ok(response))) => response,
            Some(Ok(Err(e))) => return Err(classify(e, &timeouts)),
            Some(Err(())) | None => {
                return Err(FetchError::Connection("response was not delivered".to_string()))
            }
        };

        let status = StatusCode::from_u16(response.status())
            .map_err(|e| FetchError::Request(e.to_string()))?;
        let headers = response
            .headers()
            .entries()
            .into_iter()
            .map(|(k, v)| (k, String::from_utf8_lossy(&v).into_owned()))
            .collect();

        let body = response
            .into_body()
            .await
            .map_err(|e| FetchError::Body(format!("{:?}", e)))?;

        Ok(OriginResponse::new(status, headers, body))
    }
}

fn request_options(timeouts: &TimeoutConfig) -> Result<RequestOptions, FetchError> {
    let outbound = timeouts.outbound();
    let options = RequestOptions::new();
    options
        .set_connect_timeout(Some(outbound.connect_ns))
        .and_then(|_| options.set_first_byte_timeout(Some(outbound.first_byte_ns)))
        .and_then(|_| options.set_between_bytes_timeout(Some(outbound.between_bytes_ns)))
        .map_err(|_| FetchError::Request("host does not support request timeouts".to_string()))?;
    Ok(options)
}

fn classify(code: ErrorCode, timeouts: &TimeoutConfig) -> FetchError {
    match code {
        ErrorCode::ConnectionTimeout => FetchError::Timeout(timeouts.connect),
        ErrorCode::ConnectionReadTimeout
        | ErrorCode::ConnectionWriteTimeout
        | ErrorCode::HttpResponseTimeout => FetchError::Timeout(timeouts.total),
        other => FetchError::Connection(format!("{:?}", other)),
    }
}
