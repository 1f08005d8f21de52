//! The protocol error taxonomy.
//!
//! Every failure is final for its call. Kinds and messages are stable
//! so downstream suites can assert on them.

use thiserror::Error;

/// Errors surfaced by encryption, decryption and user import.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The outer envelope failed structural parsing.
    #[error("malformed JWE: {0}")]
    MalformedJwe(String),

    /// No wrapped key could be unwrapped, or the AEAD tag did not verify.
    #[error("decryption failed: no recipient key opened the envelope")]
    DecryptionFailed,

    /// The decrypted plaintext is not a signed shared log.
    #[error("malformed SharedLog: {0}")]
    MalformedSharedLog(String),

    /// The embedded payload is not an access log.
    #[error("malformed AccessLog: {0}")]
    MalformedAccessLog(String),

    /// The resolver does not know a claimed principal.
    #[error("unknown user: {0}")]
    UnknownUser(String),

    /// The access log signer does not carry monitor authority.
    #[error("unauthorised monitor: {0} is not flagged as a monitor")]
    UnauthorisedMonitor(String),

    /// The sharing signature did not verify under the creator's certificate.
    #[error("invalid signature over SharedLog")]
    SharedLogSignatureInvalid,

    /// The access log signature did not verify under the monitor's certificate.
    #[error("invalid signature over AccessLog")]
    AccessLogSignatureInvalid,

    /// A cross-layer binding between envelope metadata and signed claims
    /// failed; the message names the binding.
    #[error("malformed data: {0}")]
    MalformedData(String),

    /// Encryption was requested without any receiver.
    #[error("no recipients specified")]
    NoRecipients,

    /// A receiver's certificate does not carry a usable encryption key.
    #[error("no usable encryption key for user {0}")]
    KeyUnavailable(String),

    /// Producing a signature or serializing claims failed.
    #[error("signing failed: {0}")]
    SigningFailed(String),

    /// Key or certificate material could not be imported.
    #[error("bad key material: {0}")]
    BadKey(String),

    /// A crypto primitive failed outside the kinds above.
    #[error("crypto primitive failure: {0}")]
    Primitive(#[from] clearlog_core::CoreError),
}
