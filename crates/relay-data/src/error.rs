//! Origin fetch error types.

use thiserror::Error;

/// Transport-level failures talking to the origin.
///
/// A non-success HTTP status is not an error at this layer; it comes back as an
/// `OriginResponse` and the relay decides what to do with it.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Could not connect (DNS, refused, reset).
    #[error("connection error: {0}")]
    Connection(String),

    /// The fetch took longer than the configured timeout.
    #[error("timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// The request could not be built or sent.
    #[error("request error: {0}")]
    Request(String),

    /// The response body could not be read.
    #[error("failed to read body: {0}")]
    Body(String),
}
