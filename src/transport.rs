//! Textual byte transports: Base64, hex, binary digits, percent-encoding.
//!
//! These formats carry bytes through a text box rather than structure; the
//! parse side decodes them to a string and the serialize side encodes a
//! string. The structural layering (nested JSON attempt on decode, JSON
//! flattening on encode) lives in the `parse` and `ser` modules; this
//! module is only the byte-level plumbing.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters `encodeURIComponent` leaves unescaped, beyond alphanumerics.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Decodes base64 text, ignoring ASCII whitespace the way `atob` does.
pub(crate) fn base64_decode(text: &str) -> Result<Vec<u8>, String> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD.decode(compact.as_bytes()).map_err(|e| e.to_string())
}

pub(crate) fn base64_encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Round-trip check used by the detector: the text is base64 only if
/// re-encoding the decoded bytes reproduces it exactly, not merely if it
/// decodes without error.
pub(crate) fn base64_round_trips(text: &str) -> bool {
    match base64_decode(text) {
        Ok(bytes) => base64_encode(&bytes) == text,
        Err(_) => false,
    }
}

/// True if the trimmed text is drawn entirely from the base64 alphabet
/// (with optional trailing padding).
pub(crate) fn looks_like_base64(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return false;
    }
    let body = trimmed.trim_end_matches('=');
    !body.is_empty()
        && body
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '/')
}

/// Decodes hex digits to bytes, tolerating interior whitespace.
pub(crate) fn hex_decode(text: &str) -> Result<Vec<u8>, String> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    hex::decode(compact).map_err(|e| e.to_string())
}

pub(crate) fn hex_encode(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Decodes a string of binary digits (whitespace-separated or continuous)
/// as 8-bit groups.
pub(crate) fn binary_decode(text: &str) -> Result<Vec<u8>, String> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Err("empty binary input".to_string());
    }
    compact
        .as_bytes()
        .chunks(8)
        .map(|chunk| {
            let octet = std::str::from_utf8(chunk).map_err(|e| e.to_string())?;
            u8::from_str_radix(octet, 2).map_err(|e| e.to_string())
        })
        .collect()
}

/// Encodes bytes as space-separated 8-bit groups.
pub(crate) fn binary_encode(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:08b}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Percent-decodes text, requiring the result to be valid UTF-8.
pub(crate) fn uri_decode(text: &str) -> Result<String, String> {
    percent_decode_str(text)
        .decode_utf8()
        .map(|cow| cow.into_owned())
        .map_err(|e| e.to_string())
}

/// Percent-encodes text with the `encodeURIComponent` character set.
pub(crate) fn uri_encode(text: &str) -> String {
    utf8_percent_encode(text, URI_COMPONENT).to_string()
}
