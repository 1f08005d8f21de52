//! General-JSON JWE envelopes (RFC 7516).
//!
//! One content key encrypts the payload under AES-256-GCM; the key is
//! wrapped for every recipient via ECDH-ES+A256KW. The base64url form
//! of the protected header is the AEAD associated data, so everything
//! it carries is covered by the GCM tag.
//!
//! Sibling encoders emit a flattened shape when there is exactly one
//! recipient (`encrypted_key` and `header` at the top level, no
//! `recipients` array). [`JweEnvelope::from_json`] is the single place
//! that shape is accepted; it is normalised unconditionally so the rest
//! of the pipeline sees one form.

use serde::{Deserialize, Serialize};

use crate::b64;
use crate::crypto::{ContentKey, EcDecryptionKey, EcEncryptionKey, EphemeralKeyPair, Iv};
use crate::error::CoreError;
use crate::jws::FlattenedJws;

/// Content-encryption algorithm on this wire.
pub const CONTENT_ALG: &str = "A256GCM";

/// Per-recipient key-management algorithm on this wire.
pub const KEY_WRAP_ALG: &str = "ECDH-ES+A256KW";

/// Ephemeral public key carried in a recipient header (EC JWK).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EphemeralPublicJwk {
    pub kty: String,
    pub crv: String,
    pub x: String,
    pub y: String,
}

impl EphemeralPublicJwk {
    fn from_key(key: &EcEncryptionKey) -> Self {
        let (x, y) = key.coordinates();
        Self {
            kty: "EC".into(),
            crv: "P-256".into(),
            x: b64::encode(x),
            y: b64::encode(y),
        }
    }

    fn to_key(&self) -> Result<EcEncryptionKey, CoreError> {
        if self.kty != "EC" || self.crv != "P-256" {
            return Err(CoreError::UnsupportedAlgorithm(format!(
                "epk {} {}",
                self.kty, self.crv
            )));
        }
        let x: [u8; 32] = b64::decode(&self.x)?
            .try_into()
            .map_err(|_| CoreError::InvalidKey("epk x must be 32 bytes".into()))?;
        let y: [u8; 32] = b64::decode(&self.y)?
            .try_into()
            .map_err(|_| CoreError::InvalidKey("epk y must be 32 bytes".into()))?;
        EcEncryptionKey::from_coordinates(&x, &y)
    }
}

/// Per-recipient unprotected header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientHeader {
    pub alg: String,
    pub epk: EphemeralPublicJwk,
}

/// One wrapped content key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JweRecipient {
    pub encrypted_key: String,
    pub header: RecipientHeader,
}

/// The protected header duplicating the signed shared header in clear.
///
/// `owner` and `recipients` let parties route a token before decrypting;
/// both copies are AEAD-authenticated through the protected header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectedHeader {
    pub enc: String,
    #[serde(rename = "sharedHeader")]
    pub shared_header: FlattenedJws,
    pub owner: String,
    pub recipients: Vec<String>,
}

/// On-wire shape covering both the general and the flattened form.
#[derive(Deserialize)]
struct JweWire {
    protected: Option<String>,
    recipients: Option<Vec<JweRecipient>>,
    encrypted_key: Option<String>,
    header: Option<RecipientHeader>,
    iv: String,
    ciphertext: String,
    tag: String,
}

/// A parsed multi-recipient JWE envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JweEnvelope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protected: Option<String>,
    pub recipients: Vec<JweRecipient>,
    pub iv: String,
    pub ciphertext: String,
    pub tag: String,
}

impl JweEnvelope {
    /// Parse a JWE from its JSON serialisation.
    ///
    /// Accepts both the general shape and the sibling single-recipient
    /// flattened shape; the latter is normalised here and nowhere else.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let wire: JweWire =
            serde_json::from_str(json).map_err(|e| CoreError::MalformedJwe(e.to_string()))?;
        let recipients = match wire.recipients {
            Some(recipients) => recipients,
            None => {
                let encrypted_key = wire.encrypted_key.ok_or_else(|| {
                    CoreError::MalformedJwe("missing recipients and encrypted_key".into())
                })?;
                let header = wire.header.ok_or_else(|| {
                    CoreError::MalformedJwe("missing recipients and header".into())
                })?;
                vec![JweRecipient {
                    encrypted_key,
                    header,
                }]
            }
        };
        if recipients.is_empty() {
            return Err(CoreError::MalformedJwe("empty recipients array".into()));
        }
        Ok(Self {
            protected: wire.protected,
            recipients,
            iv: wire.iv,
            ciphertext: wire.ciphertext,
            tag: wire.tag,
        })
    }

    /// Serialise to the general JSON shape.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("envelope serializes")
    }

    /// Decode the protected header, if present.
    pub fn protected_header(&self) -> Result<Option<ProtectedHeader>, CoreError> {
        let Some(protected) = &self.protected else {
            return Ok(None);
        };
        let bytes = b64::decode(protected)?;
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| CoreError::MalformedJwe(e.to_string()))
    }

    /// AEAD-decrypt with the receiver's static key.
    ///
    /// Tries every recipient entry in order; succeeds if any wrapped key
    /// unwraps and the GCM tag verifies under the protected-header AAD.
    pub fn open(&self, key: &EcDecryptionKey) -> Result<Vec<u8>, CoreError> {
        let aad = self.protected.as_deref().unwrap_or("");
        let iv = Iv::from_slice(&b64::decode(&self.iv)?)?;
        let ciphertext = b64::decode(&self.ciphertext)?;
        let tag = b64::decode(&self.tag)?;

        for recipient in &self.recipients {
            if recipient.header.alg != KEY_WRAP_ALG {
                continue;
            }
            let Ok(ephemeral_public) = recipient.header.epk.to_key() else {
                continue;
            };
            let Ok(wrapped) = b64::decode(&recipient.encrypted_key) else {
                continue;
            };
            let kek = key
                .diffie_hellman(&ephemeral_public)
                .derive_key_wrap_key(KEY_WRAP_ALG);
            let Ok(cek) = kek.unwrap(&wrapped) else {
                continue;
            };
            if let Ok(plaintext) = cek.open(&iv, aad.as_bytes(), &ciphertext, &tag) {
                return Ok(plaintext);
            }
        }
        Err(CoreError::DecryptionError(
            "no recipient entry could be opened".into(),
        ))
    }
}

/// Builder assembling a multi-recipient envelope.
///
/// Generates one content key, wraps it for every added recipient and
/// seals the payload under the serialized protected header.
pub struct JweBuilder {
    protected: ProtectedHeader,
    plaintext: Vec<u8>,
    recipients: Vec<EcEncryptionKey>,
}

impl JweBuilder {
    /// Start building an envelope around `plaintext`.
    pub fn new(protected: ProtectedHeader, plaintext: impl Into<Vec<u8>>) -> Self {
        Self {
            protected,
            plaintext: plaintext.into(),
            recipients: Vec::new(),
        }
    }

    /// Address one more recipient by its static public key.
    pub fn add_recipient(mut self, key: EcEncryptionKey) -> Self {
        self.recipients.push(key);
        self
    }

    /// Build the envelope.
    pub fn build(self) -> Result<JweEnvelope, CoreError> {
        if self.recipients.is_empty() {
            return Err(CoreError::EncryptionError("no recipients added".into()));
        }
        let protected_json = serde_json::to_vec(&self.protected)
            .map_err(|e| CoreError::EncryptionError(e.to_string()))?;
        let protected = b64::encode(protected_json);

        let cek = ContentKey::generate();
        let iv = Iv::generate();
        let (ciphertext, tag) = cek.seal(&iv, protected.as_bytes(), &self.plaintext)?;

        let mut recipients = Vec::with_capacity(self.recipients.len());
        for key in &self.recipients {
            let ephemeral = EphemeralKeyPair::generate();
            let epk = EphemeralPublicJwk::from_key(&ephemeral.public_key());
            let wrapped = ephemeral
                .diffie_hellman(key)
                .derive_key_wrap_key(KEY_WRAP_ALG)
                .wrap(&cek);
            recipients.push(JweRecipient {
                encrypted_key: b64::encode(wrapped),
                header: RecipientHeader {
                    alg: KEY_WRAP_ALG.to_string(),
                    epk,
                },
            });
        }

        Ok(JweEnvelope {
            protected: Some(protected),
            recipients,
            iv: b64::encode(iv.as_bytes()),
            ciphertext: b64::encode(&ciphertext),
            tag: b64::encode(tag),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::EcSigningKey;
    use serde_json::Value;

    fn test_header(recipients: Vec<String>) -> ProtectedHeader {
        let key = EcSigningKey::generate();
        ProtectedHeader {
            enc: CONTENT_ALG.to_string(),
            shared_header: FlattenedJws::sign(b"{\"id\":\"h\"}", &key),
            owner: "owner".into(),
            recipients,
        }
    }

    #[test]
    fn test_build_open_roundtrip() {
        let receiver = EcDecryptionKey::generate();
        let envelope = JweBuilder::new(test_header(vec!["bob".into()]), b"payload".to_vec())
            .add_recipient(receiver.public_key())
            .build()
            .unwrap();

        assert_eq!(envelope.open(&receiver).unwrap(), b"payload");
    }

    #[test]
    fn test_every_recipient_can_open() {
        let first = EcDecryptionKey::generate();
        let second = EcDecryptionKey::generate();
        let envelope = JweBuilder::new(
            test_header(vec!["a".into(), "b".into()]),
            b"payload".to_vec(),
        )
        .add_recipient(first.public_key())
        .add_recipient(second.public_key())
        .build()
        .unwrap();

        assert_eq!(envelope.open(&first).unwrap(), b"payload");
        assert_eq!(envelope.open(&second).unwrap(), b"payload");
    }

    #[test]
    fn test_open_wrong_key_fails() {
        let receiver = EcDecryptionKey::generate();
        let outsider = EcDecryptionKey::generate();
        let envelope = JweBuilder::new(test_header(vec!["bob".into()]), b"payload".to_vec())
            .add_recipient(receiver.public_key())
            .build()
            .unwrap();

        assert!(envelope.open(&outsider).is_err());
    }

    #[test]
    fn test_build_requires_recipients() {
        let result = JweBuilder::new(test_header(vec![]), b"payload".to_vec()).build();
        assert!(matches!(result, Err(CoreError::EncryptionError(_))));
    }

    #[test]
    fn test_json_roundtrip_keeps_protected_bytes() {
        let receiver = EcDecryptionKey::generate();
        let envelope = JweBuilder::new(test_header(vec!["bob".into()]), b"payload".to_vec())
            .add_recipient(receiver.public_key())
            .build()
            .unwrap();

        // The protected string must survive byte-for-byte; it is the AAD.
        let parsed = JweEnvelope::from_json(&envelope.to_json()).unwrap();
        assert_eq!(parsed.protected, envelope.protected);
        assert_eq!(parsed.open(&receiver).unwrap(), b"payload");
    }

    #[test]
    fn test_flattened_single_recipient_shape_is_normalised() {
        let receiver = EcDecryptionKey::generate();
        let envelope = JweBuilder::new(test_header(vec!["bob".into()]), b"payload".to_vec())
            .add_recipient(receiver.public_key())
            .build()
            .unwrap();

        // Reshape into the sibling single-recipient form: encrypted_key
        // and header move to the top level, recipients disappears.
        let mut value: Value = serde_json::from_str(&envelope.to_json()).unwrap();
        let recipient = value["recipients"][0].clone();
        let object = value.as_object_mut().unwrap();
        object.remove("recipients");
        object.insert("encrypted_key".into(), recipient["encrypted_key"].clone());
        object.insert("header".into(), recipient["header"].clone());
        let flattened = serde_json::to_string(&value).unwrap();

        let parsed = JweEnvelope::from_json(&flattened).unwrap();
        assert_eq!(parsed.recipients.len(), 1);
        assert_eq!(parsed.open(&receiver).unwrap(), b"payload");
    }

    #[test]
    fn test_rejects_shape_without_any_recipient() {
        let result = JweEnvelope::from_json(
            "{\"protected\":\"e30\",\"iv\":\"AAAA\",\"ciphertext\":\"AAAA\",\"tag\":\"AAAA\"}",
        );
        assert!(matches!(result, Err(CoreError::MalformedJwe(_))));
    }

    #[test]
    fn test_tampered_protected_header_fails_aead() {
        let receiver = EcDecryptionKey::generate();
        let mut envelope = JweBuilder::new(test_header(vec!["bob".into()]), b"payload".to_vec())
            .add_recipient(receiver.public_key())
            .build()
            .unwrap();

        let mut protected = envelope.protected.take().unwrap();
        // Swap one base64url character for a different valid one.
        let first = if protected.starts_with('A') { "B" } else { "A" };
        protected.replace_range(0..1, first);
        envelope.protected = Some(protected);

        assert!(envelope.open(&receiver).is_err());
    }
}
