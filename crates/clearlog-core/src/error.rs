//! Error types for the clearlog core.

use thiserror::Error;

/// Errors from parsing wire structures and from primitive crypto operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("malformed log: {0}")]
    MalformedLog(String),

    #[error("malformed JWS: {0}")]
    MalformedJws(String),

    #[error("malformed JWE: {0}")]
    MalformedJwe(String),

    #[error("invalid base64url data: {0}")]
    InvalidBase64(String),

    #[error("invalid signature")]
    InvalidSignature,

    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("invalid key material: {0}")]
    InvalidKey(String),

    #[error("invalid certificate: {0}")]
    InvalidCertificate(String),

    #[error("encryption error: {0}")]
    EncryptionError(String),

    #[error("decryption error: {0}")]
    DecryptionError(String),
}
