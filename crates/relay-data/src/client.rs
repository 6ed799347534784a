//! Origin client seam and request construction.

use std::sync::Arc;

use async_trait::async_trait;
use relay_core::{DecodedRoute, OriginConfig};

use crate::error::FetchError;
use crate::request::OriginRequest;
use crate::response::OriginResponse;
use crate::timeout::TimeoutConfig;

/// Branch every file is read from.
pub const ORIGIN_BRANCH: &str = "main";

/// Accept header asking the origin for raw file content.
pub const RAW_ACCEPT: &str = "application/vnd.github.v3.raw";

/// Something that can perform an origin GET.
///
/// Implementations buffer the whole body and report transport failures as
/// `FetchError`; any HTTP status, success or not, is an `Ok` response.
/// Futures are not required to be `Send` because the Spin host is single-threaded.
#[async_trait(?Send)]
pub trait OriginClient {
    /// Perform the request.
    async fn fetch(&self, request: OriginRequest) -> Result<OriginResponse, FetchError>;
}

#[async_trait(?Send)]
impl<T: OriginClient + ?Sized> OriginClient for Arc<T> {
    async fn fetch(&self, request: OriginRequest) -> Result<OriginResponse, FetchError> {
        (**self).fetch(request).await
    }
}

/// Build the origin URL for a decoded route.
///
/// The coordinate and file path are substituted verbatim.
pub fn origin_url(base_url: &str, route: &DecodedRoute) -> String {
    format!(
        "{}/{}/{}/{}",
        base_url.trim_end_matches('/'),
        route.coordinate,
        ORIGIN_BRANCH,
        route.file_path
    )
}

/// Build the complete origin request for a decoded route.
pub fn origin_request(config: &OriginConfig, route: &DecodedRoute) -> OriginRequest {
    OriginRequest::get(origin_url(&config.base_url, route))
        .bearer_auth(&route.credential)
        .accept(RAW_ACCEPT)
        .user_agent(&config.user_agent)
        .timeout(TimeoutConfig::from_config(config))
}
