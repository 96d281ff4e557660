//! Encoded image transport: `data:<media-type>;base64,<payload>` URLs.
//!
//! The drawing surface exports raw PNG bytes; the orchestrator carries them
//! between components in data-URL form and parses that form strictly before
//! contacting the remote capability.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::error::GenerationError;

pub const PNG_MIME: &str = "image/png";

/// A snapshot recovered from a data URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedSnapshot {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

pub fn encode_data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

/// Strict parse of a `data:<media-type>;base64,<payload>` URL.
///
/// Each way the pattern can fail (missing scheme, missing base64 marker,
/// empty media type, undecodable payload) yields a descriptive
/// [`GenerationError::MalformedSnapshot`].
pub fn parse_data_url(url: &str) -> Result<DecodedSnapshot, GenerationError> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| GenerationError::MalformedSnapshot("missing \"data:\" scheme".into()))?;
    let (mime_type, payload) = rest
        .split_once(";base64,")
        .ok_or_else(|| GenerationError::MalformedSnapshot("missing \";base64,\" marker".into()))?;
    if mime_type.is_empty() {
        return Err(GenerationError::MalformedSnapshot("empty media type".into()));
    }
    let bytes = STANDARD
        .decode(payload)
        .map_err(|err| GenerationError::MalformedSnapshot(format!("invalid base64 payload: {err}")))?;
    Ok(DecodedSnapshot {
        mime_type: mime_type.to_owned(),
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_png_bytes() {
        let url = encode_data_url(PNG_MIME, b"not really a png");
        let decoded = parse_data_url(&url).unwrap();
        assert_eq!(decoded.mime_type, PNG_MIME);
        assert_eq!(decoded.bytes, b"not really a png");
    }

    #[test]
    fn rejects_missing_scheme() {
        let err = parse_data_url("image/png;base64,AAAA").unwrap_err();
        assert!(matches!(err, GenerationError::MalformedSnapshot(_)));
        assert!(err.to_string().contains("scheme"));
    }

    #[test]
    fn rejects_missing_base64_marker() {
        let err = parse_data_url("data:image/png,AAAA").unwrap_err();
        assert!(err.to_string().contains(";base64,"));
    }

    #[test]
    fn rejects_empty_media_type() {
        let err = parse_data_url("data:;base64,AAAA").unwrap_err();
        assert!(err.to_string().contains("media type"));
    }

    #[test]
    fn rejects_undecodable_payload() {
        let err = parse_data_url("data:image/png;base64,@@not-base64@@").unwrap_err();
        assert!(err.to_string().contains("base64"));
    }
}
