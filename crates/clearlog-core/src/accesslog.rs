//! Access log events and their signed form.
//!
//! An access log is created by a monitor, signed once, then immutable.
//! Changes are never made in place; a new event is recorded instead.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;
use crate::jws::FlattenedJws;

/// A monitor's record that a tool accessed an owner's data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessLog {
    /// User id of the tool operator that logged the access.
    pub monitor: String,
    /// User id of the data subject whose data was accessed.
    pub owner: String,
    /// Identifier of the accessing application.
    pub tool: String,
    /// Legal or operational reason for the access.
    pub justification: String,
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
    /// How the data was accessed ("direct", "aggregated", ...).
    pub access_kind: String,
    /// The kinds of data that were accessed.
    pub data_types: Vec<String>,
    /// Unique identifier of this event.
    pub id: String,
}

impl AccessLog {
    /// Create a new event with a fresh id.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        monitor: impl Into<String>,
        owner: impl Into<String>,
        tool: impl Into<String>,
        justification: impl Into<String>,
        timestamp: i64,
        access_kind: impl Into<String>,
        data_types: Vec<String>,
    ) -> Self {
        Self {
            monitor: monitor.into(),
            owner: owner.into(),
            tool: tool.into(),
            justification: justification.into(),
            timestamp,
            access_kind: access_kind.into(),
            data_types,
            id: Uuid::new_v4().to_string(),
        }
    }

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
        serde_json::to_string(self).expect("access log serializes")
    }
}

/// A signed access log: the monitor's JWS paired with the extracted event.
///
/// Construction sites guarantee the pair is consistent, so extraction
/// never re-verifies or re-parses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedLog {
    jws: FlattenedJws,
    access_log: AccessLog,
}

impl SignedLog {
    /// Pair a freshly signed or verified JWS with its parsed event.
    pub fn new(jws: FlattenedJws, access_log: AccessLog) -> Self {
        Self { jws, access_log }
    }

    /// The signed container as it travels on the wire.
    pub fn jws(&self) -> &FlattenedJws {
        &self.jws
    }

    /// The access log carried in the payload.
    pub fn extract(&self) -> AccessLog {
        self.access_log.clone()
    }
}
