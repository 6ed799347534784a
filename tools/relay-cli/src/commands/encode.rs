//! Relay path encoding.

use anyhow::{bail, Result};
use relay_sdk::relay_core::{decode_path, encode_path, RouteError};
use serde::Serialize;

use super::EncodeArgs;
use crate::context::Context;

#[derive(Serialize)]
struct Encoded {
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
}

/// Run the encode command.
pub async fn run(args: EncodeArgs, ctx: &Context) -> Result<()> {
    let path = relay_path(&args.credential, &args.coordinate, &args.path.join("/"))?;
    let url = args
        .host
        .as_deref()
        .map(|host| format!("{}{}", host.trim_end_matches('/'), path));

    if ctx.output.is_json() {
        ctx.output.json(&Encoded { path, url });
    } else {
        println!("{}", url.unwrap_or(path));
    }

    Ok(())
}

/// Encode a relay path and check the relay would decode it back unchanged.
pub fn relay_path(credential: &str, coordinate: &str, file_path: &str) -> Result<String> {
    let path = encode_path(credential, coordinate, file_path);

    match decode_path(&path) {
        Ok(route)
            if route.credential == credential
                && route.coordinate == coordinate
                && route.file_path == file_path.trim_matches('/') =>
        {
            Ok(path)
        }
        Ok(_) => bail!(
            "encoded path does not round-trip; the base64 text or file path contains an empty or '/' segment"
        ),
        Err(RouteError::SegmentTooShort) => bail!(
            "credential and coordinate must each encode to more than 10 characters"
        ),
        Err(e) => bail!("encoded path would be rejected by the relay: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relay_path() {
        let path = relay_path("sometoken1234", "owner/repo", "path/to/file.txt").unwrap();
        assert_eq!(path, "/c29tZXRva2VuMTIzNA==/b3duZXIvcmVwbw==/path/to/file.txt");
    }

    #[test]
    fn test_short_credential_rejected() {
        let err = relay_path("tok", "owner/repo", "README.md").unwrap_err();
        assert!(err.to_string().contains("more than 10 characters"));
    }

    #[test]
    fn test_missing_file_path_rejected() {
        assert!(relay_path("sometoken1234", "owner/repo", "").is_err());
    }

    #[test]
    fn test_slash_in_encoding_rejected() {
        // "???" encodes to "Pz8/", which splits the segment
        assert!(relay_path("??????????", "owner/repo", "README.md").is_err());
    }
}
