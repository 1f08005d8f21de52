//! Sharing acts: the claims signed by whoever shares an access log.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::jws::FlattenedJws;

/// Claims recording who shares a signed access log with whom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedLogClaims {
    /// The embedded signed access log.
    pub log: FlattenedJws,
    /// User id of the party performing this share.
    pub creator: String,
    /// User id copied from the access log.
    pub owner: String,
    /// User ids designated to decrypt, in share order.
    pub recipients: Vec<String>,
    /// Unique identifier of this sharing act.
    pub id: String,
}

impl SharedLogClaims {
    /// Parse from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        serde_json::from_str(json).map_err(|e| CoreError::MalformedLog(e.to_string()))
    }

    /// Parse from UTF-8 JSON bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CoreError> {
        let text =
            std::str::from_utf8(bytes).map_err(|e| CoreError::MalformedLog(e.to_string()))?;
        Self::from_json(text)
    }

    /// Serialize to JSON with stable field order.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("shared log serializes")
    }
}

/// The shared-header claims duplicated into the JWE protected header.
///
/// Signed separately from the shared log so the recipient list is bound
/// to the envelope independently of the encrypted payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedHeaderClaims {
    /// Identifier of the sharing act this header belongs to.
    pub id: String,
    /// User id of the data subject.
    pub owner: String,
    /// User ids designated to decrypt, in share order.
    pub recipients: Vec<String>,
}
