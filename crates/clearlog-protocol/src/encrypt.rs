//! Building the nested sign-then-encrypt token.

use clearlog_core::{
    FlattenedJws, JweBuilder, ProtectedHeader, SharedHeaderClaims, SharedLogClaims, SignedLog,
    CONTENT_ALG,
};
use uuid::Uuid;

use crate::error::ProtocolError;
use crate::user::{AuthenticatedUser, RemoteUser};

/// Encrypt a signed log for `receivers`, with `sender` as the sharing party.
///
/// Wraps the signed access log in freshly signed sharing claims, signs
/// the shared header separately and seals both into a general-JSON JWE
/// whose protected header duplicates the shared header, binding the
/// recipient list into the AEAD tag.
pub async fn encrypt(
    signed_log: &SignedLog,
    sender: &AuthenticatedUser,
    receivers: &[RemoteUser],
) -> Result<String, ProtocolError> {
    if receivers.is_empty() {
        return Err(ProtocolError::NoRecipients);
    }

    let access_log = signed_log.extract();
    let recipient_ids: Vec<String> = receivers.iter().map(|r| r.id.clone()).collect();

    // 1. The sharing claims, pointing at the already-signed access log.
    let shared_log = SharedLogClaims {
        log: signed_log.jws().clone(),
        creator: sender.id().to_string(),
        owner: access_log.owner.clone(),
        recipients: recipient_ids.clone(),
        id: Uuid::new_v4().to_string(),
    };
    let shared_log_jws = FlattenedJws::sign(shared_log.to_json().as_bytes(), sender.signing_key());

    // 2. The shared header, signed on its own so the recipient list can
    //    be verified independently of the encrypted payload.
    let shared_header = SharedHeaderClaims {
        id: shared_log.id.clone(),
        owner: shared_log.owner.clone(),
        recipients: recipient_ids.clone(),
    };
    let header_json = serde_json::to_vec(&shared_header)
        .map_err(|e| ProtocolError::SigningFailed(e.to_string()))?;
    let shared_header_jws = FlattenedJws::sign(&header_json, sender.signing_key());

    // 3. The envelope. Owner and recipients are duplicated in clear for
    //    routing; the AEAD covers them through the protected header.
    let protected = ProtectedHeader {
        enc: CONTENT_ALG.to_string(),
        shared_header: shared_header_jws,
        owner: shared_log.owner.clone(),
        recipients: recipient_ids,
    };
    let plaintext = serde_json::to_vec(&shared_log_jws)
        .map_err(|e| ProtocolError::SigningFailed(e.to_string()))?;

    let mut builder = JweBuilder::new(protected, plaintext);
    for receiver in receivers {
        let key = receiver
            .encryption_certificate
            .encryption_key()
            .map_err(|_| ProtocolError::KeyUnavailable(receiver.id.clone()))?;
        builder = builder.add_recipient(key);
    }
    let envelope = builder.build()?;

    tracing::debug!(
        share_id = %shared_log.id,
        recipients = envelope.recipients.len(),
        "sealed shared log"
    );
    Ok(envelope.to_json())
}
