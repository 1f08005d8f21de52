//! User identities: remote parties and the locally authenticated user.
//!
//! A RemoteUser is what a directory lookup returns: id, certificates
//! and the monitor flag. An AuthenticatedUser additionally holds the
//! private keys and is the entry point for signing, sharing and
//! decrypting.

use clearlog_core::{
    generate_self_signed, AccessLog, Certificate, EcDecryptionKey, EcSigningKey, FlattenedJws,
    SignedLog,
};
use uuid::Uuid;

use crate::error::ProtocolError;
use crate::resolver::UserResolver;

/// A party known by id, certificates and monitor authority.
#[derive(Debug, Clone)]
pub struct RemoteUser {
    /// Directory-wide user id.
    pub id: String,
    /// X.509 certificate carrying the ES256 verification key.
    pub verification_certificate: Certificate,
    /// X.509 certificate carrying the ECDH-P256 encryption key.
    pub encryption_certificate: Certificate,
    /// Whether this user may originate access logs.
    pub is_monitor: bool,
}

impl RemoteUser {
    /// Import a remote user from PEM-encoded certificates.
    pub fn import(
        id: impl Into<String>,
        verification_pem: &str,
        is_monitor: bool,
        encryption_pem: &str,
    ) -> Result<Self, ProtocolError> {
        Ok(Self {
            id: id.into(),
            verification_certificate: Certificate::from_pem(verification_pem)
                .map_err(|e| ProtocolError::BadKey(e.to_string()))?,
            encryption_certificate: Certificate::from_pem(encryption_pem)
                .map_err(|e| ProtocolError::BadKey(e.to_string()))?,
            is_monitor,
        })
    }
}

/// A user that also holds private keys and may sign, share and decrypt.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    remote: RemoteUser,
    signing_key: EcSigningKey,
    decryption_key: EcDecryptionKey,
}

impl AuthenticatedUser {
    /// Import from PEM certificates and PKCS#8 PEM private keys.
    ///
    /// The user starts without monitor authority; use
    /// [`AuthenticatedUser::with_monitor`] to grant it.
    pub fn import(
        id: impl Into<String>,
        verification_pem: &str,
        encryption_pem: &str,
        signing_key_pem: &str,
        decryption_key_pem: &str,
    ) -> Result<Self, ProtocolError> {
        let remote = RemoteUser::import(id, verification_pem, false, encryption_pem)?;
        Ok(Self {
            remote,
            signing_key: EcSigningKey::from_pkcs8_pem(signing_key_pem)
                .map_err(|e| ProtocolError::BadKey(e.to_string()))?,
            decryption_key: EcDecryptionKey::from_pkcs8_pem(decryption_key_pem)
                .map_err(|e| ProtocolError::BadKey(e.to_string()))?,
        })
    }

    /// Generate a fresh user with self-signed certificates and a random id.
    ///
    /// For tests and bootstrap; production identities come from the
    /// directory.
    pub fn generate() -> Result<Self, ProtocolError> {
        Self::generate_with_id(Uuid::new_v4().to_string())
    }

    /// Generate a fresh user with self-signed certificates and `id`.
    pub fn generate_with_id(id: impl Into<String>) -> Result<Self, ProtocolError> {
        let id = id.into();
        let signing = generate_self_signed(&id)?;
        let encryption = generate_self_signed(&id)?;
        Self::import(
            id,
            &signing.certificate_pem,
            &encryption.certificate_pem,
            &signing.private_key_pem,
            &encryption.private_key_pem,
        )
    }

    /// Grant or withdraw monitor authority.
    pub fn with_monitor(mut self, is_monitor: bool) -> Self {
        self.remote.is_monitor = is_monitor;
        self
    }

    /// The user id.
    pub fn id(&self) -> &str {
        &self.remote.id
    }

    /// This user's public view, as a resolver would return it.
    pub fn as_remote(&self) -> &RemoteUser {
        &self.remote
    }

    pub(crate) fn signing_key(&self) -> &EcSigningKey {
        &self.signing_key
    }

    pub(crate) fn decryption_key(&self) -> &EcDecryptionKey {
        &self.decryption_key
    }

    /// Sign an access log, producing the monitor JWS paired with the event.
    pub fn sign_access_log(&self, access_log: &AccessLog) -> Result<SignedLog, ProtocolError> {
        let jws = FlattenedJws::sign(access_log.to_json().as_bytes(), &self.signing_key);
        Ok(SignedLog::new(jws, access_log.clone()))
    }

    /// Encrypt a signed log for `receivers`. See [`crate::encrypt::encrypt`].
    pub async fn encrypt_log(
        &self,
        signed_log: &SignedLog,
        receivers: &[RemoteUser],
    ) -> Result<String, ProtocolError> {
        crate::encrypt::encrypt(signed_log, self, receivers).await
    }

    /// Decrypt a token addressed to this user. See [`crate::decrypt::decrypt`].
    pub async fn decrypt_log(
        &self,
        token: &str,
        resolver: &dyn UserResolver,
    ) -> Result<SignedLog, ProtocolError> {
        crate::decrypt::decrypt(token, self, resolver).await
    }
}
