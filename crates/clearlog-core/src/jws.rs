//! Flattened JWS containers (RFC 7515 JSON serialization).
//!
//! Every signed layer on this wire is a flattened JWS with an ES256
//! protected header. The signing input is the ASCII concatenation
//! `protected || '.' || payload`.

use serde::{Deserialize, Serialize};

use crate::b64;
use crate::crypto::{EcSigningKey, EcVerifyingKey};
use crate::error::CoreError;

/// The only signature algorithm on this wire.
pub const SIGNATURE_ALG: &str = "ES256";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct JwsHeader {
    alg: String,
}

/// A flattened JWS: payload, protected header and signature, all base64url.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlattenedJws {
    pub payload: String,
    pub protected: String,
    pub signature: String,
}

impl FlattenedJws {
    /// Sign raw claims bytes with ES256.
    pub fn sign(claims: &[u8], key: &EcSigningKey) -> Self {
        let header = JwsHeader {
            alg: SIGNATURE_ALG.to_string(),
        };
        let protected = b64::encode(serde_json::to_vec(&header).expect("header serializes"));
        let payload = b64::encode(claims);
        let signing_input = format!("{protected}.{payload}");
        let signature = b64::encode(key.sign_es256(signing_input.as_bytes()));
        Self {
            payload,
            protected,
            signature,
        }
    }

    /// Verify the signature with `key`, checking the declared algorithm.
    pub fn verify(&self, key: &EcVerifyingKey) -> Result<(), CoreError> {
        let header: JwsHeader = serde_json::from_slice(&b64::decode(&self.protected)?)
            .map_err(|e| CoreError::MalformedJws(e.to_string()))?;
        if header.alg != SIGNATURE_ALG {
            return Err(CoreError::UnsupportedAlgorithm(header.alg));
        }
        let signing_input = format!("{}.{}", self.protected, self.payload);
        let signature = b64::decode(&self.signature)?;
        key.verify_es256(signing_input.as_bytes(), &signature)
    }

    /// Decode the payload bytes without verifying.
    pub fn decode_payload(&self) -> Result<Vec<u8>, CoreError> {
        b64::decode(&self.payload)
    }
}
