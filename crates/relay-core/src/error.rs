//! Client-visible relay errors.

use http::StatusCode;

use crate::route::RouteError;

/// Every way a relayed request can end without origin content.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// Malformed path or undecodable segment.
    #[error("bad relay route: {0}")]
    Route(#[from] RouteError),

    /// The origin could not be reached.
    #[error("origin unreachable: {0}")]
    OriginUnreachable(String),

    /// The origin answered with a non-success status.
    #[error("origin rejected request with {status}")]
    OriginRejected { status: StatusCode },
}

impl RelayError {
    /// Status code sent to the client.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Route(_) => StatusCode::BAD_REQUEST,
            Self::OriginUnreachable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::OriginRejected { status } => *status,
        }
    }

    /// Short message sent to the client. Never includes internal detail.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::Route(RouteError::InvalidEncoding) => "invalid token or repo",
            Self::Route(_) => "invalid URL",
            Self::OriginUnreachable(_) => "error connecting to origin",
            Self::OriginRejected { .. } => "could not fetch content",
        }
    }

    /// Stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Route(RouteError::InvalidEncoding) => "decode_failure",
            Self::Route(_) => "malformed_request",
            Self::OriginUnreachable(_) => "origin_unreachable",
            Self::OriginRejected { .. } => "origin_rejected",
        }
    }
}
