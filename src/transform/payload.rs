/// Inline image payload decoding
///
/// Generated images come back either as a base64 string or as a byte
/// array. Byte arrays are sometimes base64 text in disguise, so the bytes
/// are sniffed before deciding.

use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::Engine;
use serde::Deserialize;

/// The `data` field of an inline part, in whichever form it arrived
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum InlinePayload {
    Encoded(String),
    Raw(Vec<u8>),
}

/// Turn a payload into image bytes
pub fn decode_payload(payload: InlinePayload) -> Result<Vec<u8>, String> {
    let bytes = match payload {
        InlinePayload::Encoded(text) => {
            decode_base64(text.as_bytes()).map_err(|e| format!("invalid base64 image payload: {}", e))?
        }
        InlinePayload::Raw(bytes) => {
            if image::guess_format(&bytes).is_ok() {
                bytes
            } else {
                decode_base64(&bytes).unwrap_or(bytes)
            }
        }
    };

    if bytes.is_empty() {
        return Err("empty image payload".to_string());
    }
    Ok(bytes)
}

fn decode_base64(input: &[u8]) -> Result<Vec<u8>, base64::DecodeError> {
    let compact: Vec<u8> = input
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();

    STANDARD
        .decode(&compact)
        .or_else(|_| URL_SAFE.decode(&compact))
}
