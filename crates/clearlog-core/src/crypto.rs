//! Cryptographic primitives for the clearlog protocol.
//!
//! Wraps P-256 ECDSA (ES256), P-256 ECDH key agreement, AES-256-GCM
//! content encryption and AES key wrap with strong types.

use std::fmt;

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Nonce};
use aes_kw::KekAes256;
use p256::ecdh::EphemeralSecret;
use p256::ecdsa::signature::{Signer, Verifier};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use p256::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use p256::pkcs8::DecodePrivateKey;
use p256::{EncodedPoint, PublicKey, SecretKey};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::error::CoreError;

/// Length of the GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// An ECDSA-P256 signing key (ES256).
#[derive(Clone)]
pub struct EcSigningKey(SigningKey);

impl EcSigningKey {
    /// Generate a new random signing key.
    pub fn generate() -> Self {
        Self(SigningKey::from(SecretKey::random(&mut OsRng)))
    }

    /// Import from a PKCS#8 PEM document.
    pub fn from_pkcs8_pem(pem: &str) -> Result<Self, CoreError> {
        SigningKey::from_pkcs8_pem(pem)
            .map(Self)
            .map_err(|e| CoreError::InvalidKey(e.to_string()))
    }

    /// Derive the matching verifying key.
    pub fn verifying_key(&self) -> EcVerifyingKey {
        EcVerifyingKey(*self.0.verifying_key())
    }

    /// Sign a message, returning the raw 64-byte `r || s` signature.
    pub fn sign_es256(&self, message: &[u8]) -> [u8; 64] {
        let signature: Signature = self.0.sign(message);
        signature
            .to_bytes()
            .as_slice()
            .try_into()
            .expect("64-byte ES256 signature")
    }
}

impl fmt::Debug for EcSigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EcSigningKey({:?})", self.verifying_key())
    }
}

/// An ECDSA-P256 verifying key.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct EcVerifyingKey(VerifyingKey);

impl EcVerifyingKey {
    /// Import from an uncompressed or compressed SEC1 curve point.
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self, CoreError> {
        VerifyingKey::from_sec1_bytes(bytes)
            .map(Self)
            .map_err(|e| CoreError::InvalidKey(e.to_string()))
    }

    /// Verify a raw 64-byte `r || s` ES256 signature over a message.
    pub fn verify_es256(&self, message: &[u8], signature: &[u8]) -> Result<(), CoreError> {
        let signature =
            Signature::from_slice(signature).map_err(|_| CoreError::InvalidSignature)?;
        self.0
            .verify(message, &signature)
            .map_err(|_| CoreError::InvalidSignature)
    }
}

impl fmt::Debug for EcVerifyingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let point = self.0.to_encoded_point(true);
        write!(f, "EcVerifyingKey({})", &hex::encode(point.as_bytes())[..16])
    }
}

/// A static ECDH-P256 secret used to unwrap content keys.
#[derive(Clone)]
pub struct EcDecryptionKey(SecretKey);

impl EcDecryptionKey {
    /// Generate a new random key.
    pub fn generate() -> Self {
        Self(SecretKey::random(&mut OsRng))
    }

    /// Import from a PKCS#8 PEM document.
    pub fn from_pkcs8_pem(pem: &str) -> Result<Self, CoreError> {
        SecretKey::from_pkcs8_pem(pem)
            .map(Self)
            .map_err(|e| CoreError::InvalidKey(e.to_string()))
    }

    /// Derive the matching public key.
    pub fn public_key(&self) -> EcEncryptionKey {
        EcEncryptionKey(self.0.public_key())
    }

    /// Key agreement with the sender's ephemeral public key.
    pub fn diffie_hellman(&self, peer: &EcEncryptionKey) -> SharedSecret {
        let shared = p256::ecdh::diffie_hellman(self.0.to_nonzero_scalar(), peer.0.as_affine());
        SharedSecret((*shared.raw_secret_bytes()).into())
    }
}

impl fmt::Debug for EcDecryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EcDecryptionKey({:?})", self.public_key())
    }
}

/// An ECDH-P256 public key addressing a recipient.
#[derive(Clone, PartialEq, Eq)]
pub struct EcEncryptionKey(PublicKey);

impl EcEncryptionKey {
    /// Import from an uncompressed or compressed SEC1 curve point.
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self, CoreError> {
        PublicKey::from_sec1_bytes(bytes)
            .map(Self)
            .map_err(|e| CoreError::InvalidKey(e.to_string()))
    }

    /// Reconstruct from affine coordinates, 32 bytes each, big endian.
    pub fn from_coordinates(x: &[u8; 32], y: &[u8; 32]) -> Result<Self, CoreError> {
        let point = EncodedPoint::from_affine_coordinates(x.into(), y.into(), false);
        Option::from(PublicKey::from_encoded_point(&point))
            .map(Self)
            .ok_or_else(|| CoreError::InvalidKey("point is not on curve P-256".into()))
    }

    /// Affine coordinates (x, y) of the uncompressed point, 32 bytes each.
    pub fn coordinates(&self) -> ([u8; 32], [u8; 32]) {
        let point = self.0.to_encoded_point(false);
        let mut x = [0u8; 32];
        let mut y = [0u8; 32];
        x.copy_from_slice(point.x().expect("uncompressed point has x"));
        y.copy_from_slice(point.y().expect("uncompressed point has y"));
        (x, y)
    }
}

impl fmt::Debug for EcEncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let point = self.0.to_encoded_point(true);
        write!(f, "EcEncryptionKey({})", &hex::encode(point.as_bytes())[..16])
    }
}

/// An ephemeral ECDH-P256 key pair, used once per recipient.
pub struct EphemeralKeyPair {
    secret: EphemeralSecret,
    public: EcEncryptionKey,
}

impl EphemeralKeyPair {
    /// Generate a new ephemeral key pair.
    pub fn generate() -> Self {
        let secret = EphemeralSecret::random(&mut OsRng);
        let public = EcEncryptionKey(secret.public_key());
        Self { secret, public }
    }

    /// The public half, carried in the recipient header.
    pub fn public_key(&self) -> EcEncryptionKey {
        self.public.clone()
    }

    /// Key agreement with the recipient's static public key.
    ///
    /// Consumes the ephemeral secret; it must not be reused.
    pub fn diffie_hellman(self, peer: &EcEncryptionKey) -> SharedSecret {
        let shared = self.secret.diffie_hellman(&peer.0);
        SharedSecret((*shared.raw_secret_bytes()).into())
    }
}

/// A shared secret from ECDH key agreement.
#[derive(Clone)]
pub struct SharedSecret([u8; 32]);

impl SharedSecret {
    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Derive a 256-bit key-wrapping key via the Concat KDF.
    ///
    /// `algorithm` feeds the AlgorithmID field; both party infos are
    /// empty on this wire.
    pub fn derive_key_wrap_key(&self, algorithm: &str) -> KeyWrapKey {
        let derived = concat_kdf(&self.0, algorithm, &[], &[], 256);
        KeyWrapKey(derived.try_into().expect("256-bit derivation"))
    }
}

/// Concat KDF (NIST SP 800-56A, SHA-256), as specified for ECDH-ES in JOSE.
///
/// OtherInfo is `AlgorithmID || PartyUInfo || PartyVInfo || SuppPubInfo`,
/// each variable-length field prefixed with its 32-bit big-endian length.
pub fn concat_kdf(z: &[u8], algorithm: &str, apu: &[u8], apv: &[u8], key_bits: u32) -> Vec<u8> {
    let mut other_info = Vec::new();
    for field in [algorithm.as_bytes(), apu, apv] {
        other_info.extend_from_slice(&(field.len() as u32).to_be_bytes());
        other_info.extend_from_slice(field);
    }
    other_info.extend_from_slice(&key_bits.to_be_bytes());

    let key_len = key_bits as usize / 8;
    let mut derived = Vec::with_capacity(key_len);
    let mut round: u32 = 1;
    while derived.len() < key_len {
        let mut hasher = Sha256::new();
        hasher.update(round.to_be_bytes());
        hasher.update(z);
        hasher.update(&other_info);
        derived.extend_from_slice(&hasher.finalize());
        round += 1;
    }
    derived.truncate(key_len);
    derived
}

/// A 256-bit AES key-wrapping key derived from ECDH agreement.
pub struct KeyWrapKey([u8; 32]);

impl KeyWrapKey {
    /// Wrap a content key (RFC 3394 AES-KW), producing 40 bytes.
    pub fn wrap(&self, cek: &ContentKey) -> Vec<u8> {
        let kek = KekAes256::from(self.0);
        let mut wrapped = [0u8; 40];
        kek.wrap(cek.as_bytes(), &mut wrapped)
            .expect("wrapping a 256-bit key cannot fail");
        wrapped.to_vec()
    }

    /// Unwrap a content key, verifying the key-wrap integrity check.
    pub fn unwrap(&self, wrapped: &[u8]) -> Result<ContentKey, CoreError> {
        if wrapped.len() != 40 {
            return Err(CoreError::DecryptionError(format!(
                "wrapped key must be 40 bytes, got {}",
                wrapped.len()
            )));
        }
        let kek = KekAes256::from(self.0);
        let mut cek = [0u8; 32];
        kek.unwrap(wrapped, &mut cek)
            .map_err(|e| CoreError::DecryptionError(e.to_string()))?;
        Ok(ContentKey(cek))
    }
}

/// A 256-bit content encryption key for AES-256-GCM.
#[derive(Clone)]
pub struct ContentKey([u8; 32]);

impl ContentKey {
    /// Generate a new random key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// AEAD-encrypt, returning the ciphertext and the 16-byte tag.
    pub fn seal(
        &self,
        iv: &Iv,
        aad: &[u8],
        plaintext: &[u8],
    ) -> Result<(Vec<u8>, [u8; TAG_LEN]), CoreError> {
        let cipher = Aes256Gcm::new_from_slice(&self.0)
            .map_err(|e| CoreError::EncryptionError(e.to_string()))?;
        let mut combined = cipher
            .encrypt(
                Nonce::from_slice(&iv.0),
                Payload {
                    msg: plaintext,
                    aad,
                },
            )
            .map_err(|e| CoreError::EncryptionError(e.to_string()))?;
        let tag_offset = combined.len() - TAG_LEN;
        let tag: [u8; TAG_LEN] = combined[tag_offset..].try_into().expect("16-byte GCM tag");
        combined.truncate(tag_offset);
        Ok((combined, tag))
    }

    /// AEAD-decrypt a ciphertext and tag.
    pub fn open(
        &self,
        iv: &Iv,
        aad: &[u8],
        ciphertext: &[u8],
        tag: &[u8],
    ) -> Result<Vec<u8>, CoreError> {
        let cipher = Aes256Gcm::new_from_slice(&self.0)
            .map_err(|e| CoreError::DecryptionError(e.to_string()))?;
        let mut combined = Vec::with_capacity(ciphertext.len() + tag.len());
        combined.extend_from_slice(ciphertext);
        combined.extend_from_slice(tag);
        cipher
            .decrypt(
                Nonce::from_slice(&iv.0),
                Payload {
                    msg: &combined,
                    aad,
                },
            )
            .map_err(|_| CoreError::DecryptionError("AEAD tag verification failed".into()))
    }
}

/// A 96-bit GCM initialization vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Iv(pub [u8; 12]);

impl Iv {
    /// Generate a new random IV.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 12];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 12]) -> Self {
        Self(bytes)
    }

    /// Create from a slice, checking the length.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CoreError> {
        let bytes: [u8; 12] = bytes
            .try_into()
            .map_err(|_| CoreError::DecryptionError("IV must be 12 bytes".into()))?;
        Ok(Self(bytes))
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 12] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_verify() {
        let key = EcSigningKey::generate();
        let message = b"hello world";
        let signature = key.sign_es256(message);

        key.verifying_key()
            .verify_es256(message, &signature)
            .expect("valid signature should verify");

        let tampered = b"hello worlD";
        assert!(key
            .verifying_key()
            .verify_es256(tampered, &signature)
            .is_err());
    }

    #[test]
    fn test_verify_wrong_key_fails() {
        let key = EcSigningKey::generate();
        let other = EcSigningKey::generate();
        let signature = key.sign_es256(b"message");

        assert!(other
            .verifying_key()
            .verify_es256(b"message", &signature)
            .is_err());
    }

    #[test]
    fn test_ephemeral_key_agreement() {
        // Receiver has a static key.
        let receiver = EcDecryptionKey::generate();
        let receiver_public = receiver.public_key();

        // Sender creates an ephemeral key.
        let ephemeral = EphemeralKeyPair::generate();
        let ephemeral_public = ephemeral.public_key();

        // Both derive the same shared secret.
        let sender_shared = ephemeral.diffie_hellman(&receiver_public);
        let receiver_shared = receiver.diffie_hellman(&ephemeral_public);

        assert_eq!(sender_shared.as_bytes(), receiver_shared.as_bytes());
    }

    #[test]
    fn test_coordinates_roundtrip() {
        let key = EcDecryptionKey::generate().public_key();
        let (x, y) = key.coordinates();
        let recovered = EcEncryptionKey::from_coordinates(&x, &y).unwrap();
        assert_eq!(key, recovered);
    }

    #[test]
    fn test_concat_kdf_rfc7518_vector() {
        // RFC 7518 Appendix C: ECDH-ES direct agreement for A128GCM
        // between Alice and Bob.
        let z: [u8; 32] = [
            158, 86, 217, 29, 129, 113, 53, 211, 114, 131, 66, 131, 191, 132, 38, 156, 251, 49,
            110, 163, 218, 128, 106, 72, 246, 218, 167, 121, 140, 254, 144, 196,
        ];
        let derived = concat_kdf(&z, "A128GCM", b"Alice", b"Bob", 128);
        assert_eq!(
            derived,
            vec![86, 170, 141, 234, 248, 35, 109, 32, 92, 34, 40, 205, 113, 167, 16, 26]
        );
    }

    #[test]
    fn test_key_wrap_roundtrip() {
        let receiver = EcDecryptionKey::generate();
        let ephemeral = EphemeralKeyPair::generate();
        let ephemeral_public = ephemeral.public_key();

        let cek = ContentKey::generate();
        let wrapped = ephemeral
            .diffie_hellman(&receiver.public_key())
            .derive_key_wrap_key("ECDH-ES+A256KW")
            .wrap(&cek);
        assert_eq!(wrapped.len(), 40);

        let unwrapped = receiver
            .diffie_hellman(&ephemeral_public)
            .derive_key_wrap_key("ECDH-ES+A256KW")
            .unwrap(&wrapped)
            .unwrap();
        assert_eq!(cek.as_bytes(), unwrapped.as_bytes());
    }

    #[test]
    fn test_key_unwrap_wrong_key_fails() {
        let receiver = EcDecryptionKey::generate();
        let wrong = EcDecryptionKey::generate();
        let ephemeral = EphemeralKeyPair::generate();
        let ephemeral_public = ephemeral.public_key();

        let cek = ContentKey::generate();
        let wrapped = ephemeral
            .diffie_hellman(&receiver.public_key())
            .derive_key_wrap_key("ECDH-ES+A256KW")
            .wrap(&cek);

        assert!(wrong
            .diffie_hellman(&ephemeral_public)
            .derive_key_wrap_key("ECDH-ES+A256KW")
            .unwrap(&wrapped)
            .is_err());
    }

    #[test]
    fn test_seal_open_roundtrip() {
        let key = ContentKey::generate();
        let iv = Iv::generate();
        let aad = b"protected header";
        let plaintext = b"hello, encrypted world!";

        let (ciphertext, tag) = key.seal(&iv, aad, plaintext).unwrap();
        assert_ne!(ciphertext.as_slice(), plaintext.as_slice());

        let opened = key.open(&iv, aad, &ciphertext, &tag).unwrap();
        assert_eq!(opened, plaintext);
    }

    #[test]
    fn test_open_rejects_tampered_ciphertext() {
        let key = ContentKey::generate();
        let iv = Iv::generate();
        let (mut ciphertext, tag) = key.seal(&iv, b"aad", b"secret").unwrap();

        ciphertext[0] ^= 0x01;
        assert!(key.open(&iv, b"aad", &ciphertext, &tag).is_err());
    }

    #[test]
    fn test_open_rejects_wrong_aad() {
        let key = ContentKey::generate();
        let iv = Iv::generate();
        let (ciphertext, tag) = key.seal(&iv, b"aad", b"secret").unwrap();

        assert!(key.open(&iv, b"other aad", &ciphertext, &tag).is_err());
    }

    #[test]
    fn test_iv_from_slice_checks_length() {
        assert!(Iv::from_slice(&[0u8; 12]).is_ok());
        assert!(Iv::from_slice(&[0u8; 16]).is_err());
    }
}
