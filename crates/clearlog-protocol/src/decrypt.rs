//! Parsing and verifying received tokens.
//!
//! Decryption is a strict pipeline: parse, AEAD-decrypt, verify the
//! sharing signature, verify the monitor signature, then enforce the
//! cross-layer bindings between envelope metadata and signed claims.
//! The steps are strictly sequential: the monitor identity is read from
//! already-verified sharing content, so lookups cannot be reordered.
//! Every failure is final and carries a distinct kind.

use clearlog_core::{AccessLog, FlattenedJws, JweEnvelope, SharedLogClaims, SignedLog};

use crate::error::ProtocolError;
use crate::resolver::UserResolver;
use crate::user::AuthenticatedUser;

/// Decrypt a token addressed to `receiver` and verify every layer.
pub async fn decrypt(
    token: &str,
    receiver: &AuthenticatedUser,
    resolver: &dyn UserResolver,
) -> Result<SignedLog, ProtocolError> {
    // 1. Parse the envelope. The sibling single-recipient shape is
    //    normalised inside the parser.
    let envelope =
        JweEnvelope::from_json(token).map_err(|e| ProtocolError::MalformedJwe(e.to_string()))?;

    // 2. AEAD-decrypt with the receiver's static key.
    let plaintext = envelope
        .open(receiver.decryption_key())
        .map_err(|_| ProtocolError::DecryptionFailed)?;

    // 3. The plaintext is the signed shared log.
    let shared_log_jws: FlattenedJws = serde_json::from_slice(&plaintext)
        .map_err(|e| ProtocolError::MalformedSharedLog(e.to_string()))?;
    let shared_log_bytes = shared_log_jws
        .decode_payload()
        .map_err(|e| ProtocolError::MalformedSharedLog(e.to_string()))?;
    let shared_log = SharedLogClaims::from_bytes(&shared_log_bytes)
        .map_err(|e| ProtocolError::MalformedSharedLog(e.to_string()))?;

    // 4. Resolve the claimed creator before trusting anything further.
    let creator = resolver.resolve(&shared_log.creator).await?;

    // 5. The creator's certificate must verify the sharing signature.
    let creator_key = creator
        .verification_certificate
        .verifying_key()
        .map_err(|_| ProtocolError::SharedLogSignatureInvalid)?;
    shared_log_jws
        .verify(&creator_key)
        .map_err(|_| ProtocolError::SharedLogSignatureInvalid)?;

    // 6. The embedded access log is itself a signed container.
    let access_log_jws = shared_log.log.clone();
    let access_log_bytes = access_log_jws
        .decode_payload()
        .map_err(|e| ProtocolError::MalformedAccessLog(e.to_string()))?;
    let access_log = AccessLog::from_bytes(&access_log_bytes)
        .map_err(|e| ProtocolError::MalformedAccessLog(e.to_string()))?;

    // 7. Resolve the claimed monitor.
    let monitor = resolver.resolve(&access_log.monitor).await?;

    // 8. Only flagged monitors may originate access logs.
    if !monitor.is_monitor {
        return Err(ProtocolError::UnauthorisedMonitor(monitor.id));
    }

    // 9. The monitor's certificate must verify the access log signature.
    let monitor_key = monitor
        .verification_certificate
        .verifying_key()
        .map_err(|_| ProtocolError::AccessLogSignatureInvalid)?;
    access_log_jws
        .verify(&monitor_key)
        .map_err(|_| ProtocolError::AccessLogSignatureInvalid)?;

    // 10. Cross-layer bindings between envelope metadata and signed claims.
    enforce_bindings(&envelope, &shared_log, &access_log, receiver.id())?;

    // 11. Hand back the verified inner pair.
    Ok(SignedLog::new(access_log_jws, access_log))
}

/// The four bindings between the cleartext envelope metadata and the
/// verified claims, plus the sharing-authority rules.
fn enforce_bindings(
    envelope: &JweEnvelope,
    shared_log: &SharedLogClaims,
    access_log: &AccessLog,
    receiver_id: &str,
) -> Result<(), ProtocolError> {
    let header = envelope
        .protected_header()
        .map_err(|e| ProtocolError::MalformedJwe(e.to_string()))?
        .ok_or_else(|| rejected("protected header is missing"))?;

    // Sequence equality, order-sensitive: sibling implementations
    // compare the serialized arrays.
    if shared_log.recipients != header.recipients {
        return Err(rejected(
            "recipients in protected header do not match recipients of the SharedLog",
        ));
    }
    if !shared_log.recipients.iter().any(|r| r == receiver_id) {
        return Err(rejected(
            "decrypting user is not among the SharedLog recipients",
        ));
    }
    if access_log.owner != header.owner {
        return Err(rejected(
            "owner in protected header does not match owner of the AccessLog",
        ));
    }
    if shared_log.creator != access_log.owner && shared_log.creator != access_log.monitor {
        return Err(rejected(
            "creator of the SharedLog is neither owner nor monitor of the AccessLog",
        ));
    }
    if shared_log.creator == access_log.monitor
        && (shared_log.recipients.len() != 1 || shared_log.recipients[0] != access_log.owner)
    {
        return Err(rejected("monitors may only share with the data owner"));
    }
    Ok(())
}

fn rejected(binding: &str) -> ProtocolError {
    tracing::warn!("rejecting token: {binding}");
    ProtocolError::MalformedData(binding.to_string())
}
