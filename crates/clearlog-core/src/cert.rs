//! X.509 certificate handling.
//!
//! Certificates travel as PEM strings inside user records. Only the
//! subject public key is consumed here; chain, expiry and name checks
//! are the resolver's concern.

use rcgen::{CertificateParams, DnType, KeyPair, PKCS_ECDSA_P256_SHA256};
use x509_cert::der::DecodePem;

use crate::crypto::{EcEncryptionKey, EcVerifyingKey};
use crate::error::CoreError;

/// A parsed leaf certificate: the original PEM plus its subject public key.
///
/// The subject key is kept as raw SEC1 bytes so that a certificate with
/// an unusable key type still imports; the typed accessors fail instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    pem: String,
    subject_key: Vec<u8>,
}

impl Certificate {
    /// Parse a PEM-encoded X.509 certificate.
    pub fn from_pem(pem: &str) -> Result<Self, CoreError> {
        let certificate = x509_cert::Certificate::from_pem(pem.as_bytes())
            .map_err(|e| CoreError::InvalidCertificate(e.to_string()))?;
        let subject_key = certificate
            .tbs_certificate
            .subject_public_key_info
            .subject_public_key
            .raw_bytes()
            .to_vec();
        Ok(Self {
            pem: pem.to_string(),
            subject_key,
        })
    }

    /// The certificate as it was imported.
    pub fn pem(&self) -> &str {
        &self.pem
    }

    /// The subject key as an ES256 verifying key.
    pub fn verifying_key(&self) -> Result<EcVerifyingKey, CoreError> {
        EcVerifyingKey::from_sec1_bytes(&self.subject_key)
    }

    /// The subject key as an ECDH-P256 public key.
    pub fn encryption_key(&self) -> Result<EcEncryptionKey, CoreError> {
        EcEncryptionKey::from_sec1_bytes(&self.subject_key)
    }
}

/// A freshly generated P-256 keypair with a matching self-signed certificate.
pub struct SelfSignedIdentity {
    /// The certificate, PEM-encoded.
    pub certificate_pem: String,
    /// The private key, PKCS#8 PEM-encoded.
    pub private_key_pem: String,
}

/// Generate a P-256 keypair and a self-signed certificate for `common_name`.
pub fn generate_self_signed(common_name: &str) -> Result<SelfSignedIdentity, CoreError> {
    let key_pair = KeyPair::generate_for(&PKCS_ECDSA_P256_SHA256)
        .map_err(|e| CoreError::InvalidKey(e.to_string()))?;
    let mut params = CertificateParams::new(Vec::<String>::new())
        .map_err(|e| CoreError::InvalidCertificate(e.to_string()))?;
    params
        .distinguished_name
        .push(DnType::CommonName, common_name);
    let certificate = params
        .self_signed(&key_pair)
        .map_err(|e| CoreError::InvalidCertificate(e.to_string()))?;
    Ok(SelfSignedIdentity {
        certificate_pem: certificate.pem(),
        private_key_pem: key_pair.serialize_pem(),
    })
}
