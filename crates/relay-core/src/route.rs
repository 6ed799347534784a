//! Relay path decoding.
//!
//! Inbound paths have the shape `/{credential}/{coordinate}/{file...}` where the
//! first two segments are base64. Empty segments are dropped, so leading, trailing
//! and doubled slashes are tolerated.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;

/// Encoded segments must be strictly longer than this.
pub const MIN_SEGMENT_LEN: usize = 10;

/// Standard alphabet, padding optional, lenient trailing bits.
const LENIENT_STANDARD: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Reasons a path cannot be turned into a route.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("expected at least 3 path segments, got {0}")]
    TooFewSegments(usize),

    #[error("encoded segments must exceed {MIN_SEGMENT_LEN} characters")]
    SegmentTooShort,

    #[error("segment is not valid base64")]
    InvalidEncoding,
}

/// A decoded relay route.
///
/// Holds a live credential, so `Debug` never prints field values.
#[derive(Clone, PartialEq, Eq)]
pub struct DecodedRoute {
    /// Bearer credential forwarded to the origin.
    pub credential: String,
    /// Repository coordinate, informally `owner/repo`.
    pub coordinate: String,
    /// File path inside the repository, may contain `/`.
    pub file_path: String,
}

impl std::fmt::Debug for DecodedRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodedRoute")
            .field("credential", &"<redacted>")
            .field("coordinate", &"<redacted>")
            .field("file_path", &"<redacted>")
            .finish()
    }
}

/// Decode a request path into a route.
pub fn decode_path(path: &str) -> Result<DecodedRoute, RouteError> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.len() < 3 {
        return Err(RouteError::TooFewSegments(segments.len()));
    }

    let encoded_credential = segments[0];
    let encoded_coordinate = segments[1];
    if encoded_credential.len() <= MIN_SEGMENT_LEN || encoded_coordinate.len() <= MIN_SEGMENT_LEN {
        return Err(RouteError::SegmentTooShort);
    }

    Ok(DecodedRoute {
        credential: decode_segment(encoded_credential)?,
        coordinate: decode_segment(encoded_coordinate)?,
        file_path: segments[2..].join("/"),
    })
}

/// Encode a credential, coordinate and file path into a relay path.
pub fn encode_path(credential: &str, coordinate: &str, file_path: &str) -> String {
    format!(
        "/{}/{}/{}",
        LENIENT_STANDARD.encode(byte_string(credential)),
        LENIENT_STANDARD.encode(byte_string(coordinate)),
        file_path.trim_start_matches('/')
    )
}

/// Bytes of a byte string: one byte per char when every char is at most
/// U+00FF, otherwise the UTF-8 encoding.
///
/// Decoded segments hold one char per decoded byte, so this gives back the
/// exact bytes that were base64 encoded.
pub fn byte_string(value: &str) -> Vec<u8> {
    value
        .chars()
        .map(|c| u8::try_from(u32::from(c)).ok())
        .collect::<Option<Vec<u8>>>()
        .unwrap_or_else(|| value.as_bytes().to_vec())
}

/// Any decoded bytes are accepted; each byte becomes the char with that code point.
fn decode_segment(segment: &str) -> Result<String, RouteError> {
    let bytes = LENIENT_STANDARD
        .decode(segment)
        .map_err(|_| RouteError::InvalidEncoding)?;
    Ok(bytes.into_iter().map(char::from).collect())
}
