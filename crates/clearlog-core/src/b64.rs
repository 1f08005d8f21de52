//! Base64url helpers.
//!
//! Every JOSE layer on this wire carries its fields base64url-encoded
//! without padding.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use crate::error::CoreError;

/// Encode bytes as base64url without padding.
pub fn encode(data: impl AsRef<[u8]>) -> String {
    URL_SAFE_NO_PAD.encode(data)
}

/// Decode a base64url string without padding.
pub fn decode(s: &str) -> Result<Vec<u8>, CoreError> {
    URL_SAFE_NO_PAD
        .decode(s)
        .map_err(|e| CoreError::InvalidBase64(e.to_string()))
}

/// Decode a base64url string into UTF-8 text.
pub fn decode_utf8(s: &str) -> Result<String, CoreError> {
    let bytes = decode(s)?;
    String::from_utf8(bytes).map_err(|e| CoreError::InvalidBase64(e.to_string()))
}
