//! # clearlog core
//!
//! Pure data model and crypto primitives for the clearlog protocol:
//! access log events, sharing claims, JOSE containers and the P-256 /
//! AES-GCM primitive layer.
//!
//! This crate contains no I/O and no identity semantics. It is pure
//! computation over wire structures; who may sign, share or decrypt is
//! decided one layer up.
//!
//! ## Key Types
//!
//! - [`AccessLog`] - a monitor's record of one data access
//! - [`SignedLog`] - an access log paired with its monitor JWS
//! - [`SharedLogClaims`] - the claims signed for one sharing act
//! - [`FlattenedJws`] / [`JweEnvelope`] - the JOSE containers on the wire

pub mod accesslog;
pub mod b64;
pub mod cert;
pub mod crypto;
pub mod error;
pub mod jwe;
pub mod jws;
pub mod sharedlog;

pub use accesslog::{AccessLog, SignedLog};
pub use cert::{generate_self_signed, Certificate, SelfSignedIdentity};
pub use crypto::{
    ContentKey, EcDecryptionKey, EcEncryptionKey, EcSigningKey, EcVerifyingKey, EphemeralKeyPair,
    Iv, KeyWrapKey, SharedSecret,
};
pub use error::CoreError;
pub use jwe::{
    EphemeralPublicJwk, JweBuilder, JweEnvelope, JweRecipient, ProtectedHeader, RecipientHeader,
    CONTENT_ALG, KEY_WRAP_ALG,
};
pub use jws::{FlattenedJws, SIGNATURE_ALG};
pub use sharedlog::{SharedHeaderClaims, SharedLogClaims};
