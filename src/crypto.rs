//! Password-based authenticated encryption and content hashing.
//!
//! The engine only talks to these primitives through [`CryptoProvider`], so the
//! codec can be exercised with a substitute implementation. [`NativeCrypto`] is
//! the production implementation:
//!
//! - PBKDF2-HMAC-SHA256, 100,000 iterations, 256-bit output
//! - AES-256-GCM, 96-bit nonce, 128-bit tag appended to the ciphertext, no AAD
//! - SHA-256 rendered as lowercase hex for the integrity hash

use aes_gcm::{
    aead::{generic_array::GenericArray, Aead, KeyInit},
    Aes256Gcm,
};
use rand::RngCore;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::error::{Result, StegoError};

/// AES-GCM nonce length in bytes.
pub const NONCE_LEN: usize = 12;
/// PBKDF2 salt length in bytes.
pub const SALT_LEN: usize = 16;
/// GCM authentication tag length in bytes.
pub const TAG_LEN: usize = 16;
/// PBKDF2 iteration count. Not stored in the payload, so it must never change.
pub const PBKDF2_ITERATIONS: u32 = 100_000;
/// Length of the hex-encoded SHA-256 integrity hash.
pub const HASH_HEX_LEN: usize = 64;

/// A 256-bit AES-GCM key. Zeroed on drop; the bytes never leave this crate.
pub struct AeadKey(Zeroizing<[u8; 32]>);

impl AeadKey {
    /// Wrap raw key bytes. Used by [`CryptoProvider`] implementations.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(Zeroizing::new(bytes))
    }

    pub(crate) fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Debug for AeadKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AeadKey(..)")
    }
}

/// The capability set the steganography engine needs from a crypto backend.
pub trait CryptoProvider: Send + Sync {
    /// Derive an encryption key from a password and a per-envelope salt.
    fn derive_key(&self, password: &str, salt: &[u8; SALT_LEN]) -> Result<AeadKey>;

    /// Encrypt `plaintext`; the returned buffer carries the authentication tag.
    fn encrypt(&self, key: &AeadKey, nonce: &[u8; NONCE_LEN], plaintext: &[u8]) -> Result<Vec<u8>>;

    /// Decrypt and authenticate. Any mismatch is [`StegoError::AuthenticationFailure`].
    fn decrypt(&self, key: &AeadKey, nonce: &[u8; NONCE_LEN], ciphertext: &[u8]) -> Result<Vec<u8>>;

    /// Lowercase hex content hash of `data`.
    fn sha256_hex(&self, data: &[u8]) -> String;

    /// Fill `out` with fresh random bytes (nonces and salts).
    fn fill_random(&self, out: &mut [u8]);
}

/// RustCrypto-backed provider using the OS random number generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeCrypto;

impl CryptoProvider for NativeCrypto {
    fn derive_key(&self, password: &str, salt: &[u8; SALT_LEN]) -> Result<AeadKey> {
        let mut okm = Zeroizing::new([0u8; 32]);
        pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ITERATIONS, &mut *okm);
        Ok(AeadKey(okm))
    }

    fn encrypt(&self, key: &AeadKey, nonce: &[u8; NONCE_LEN], plaintext: &[u8]) -> Result<Vec<u8>> {
        let cipher = Aes256Gcm::new(GenericArray::from_slice(key.as_bytes()));
        cipher
            .encrypt(GenericArray::from_slice(nonce), plaintext)
            .map_err(|_| StegoError::Crypto("AES-GCM encryption failed"))
    }

    fn decrypt(&self, key: &AeadKey, nonce: &[u8; NONCE_LEN], ciphertext: &[u8]) -> Result<Vec<u8>> {
        let cipher = Aes256Gcm::new(GenericArray::from_slice(key.as_bytes()));
        cipher
            .decrypt(GenericArray::from_slice(nonce), ciphertext)
            .map_err(|_| StegoError::AuthenticationFailure)
    }

    fn sha256_hex(&self, data: &[u8]) -> String {
        hex::encode(Sha256::digest(data))
    }

    fn fill_random(&self, out: &mut [u8]) {
        rand::rngs::OsRng.fill_bytes(out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_key_deterministic() {
        let salt = [7u8; SALT_LEN];
        let k1 = NativeCrypto.derive_key("Str0ngPass!", &salt).unwrap();
        let k2 = NativeCrypto.derive_key("Str0ngPass!", &salt).unwrap();
        assert_eq!(k1.as_bytes(), k2.as_bytes());

        let k3 = NativeCrypto.derive_key("Str0ngPass?", &salt).unwrap();
        assert_ne!(k1.as_bytes(), k3.as_bytes());

        let k4 = NativeCrypto.derive_key("Str0ngPass!", &[8u8; SALT_LEN]).unwrap();
        assert_ne!(k1.as_bytes(), k4.as_bytes());
    }

    #[test]
    fn test_pbkdf2_reference_vector() {
        // RFC 7914 section 11: PBKDF2-HMAC-SHA256("passwd", "salt", c=1, dkLen=64)
        let mut out = [0u8; 64];
        pbkdf2::pbkdf2_hmac::<Sha256>(b"passwd", b"salt", 1, &mut out);
        assert_eq!(
            hex::encode(&out[..16]),
            "55ac046e56e3089fec1691c22544b605"
        );
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let key = NativeCrypto.derive_key("pw", &[1u8; SALT_LEN]).unwrap();
        let nonce = [2u8; NONCE_LEN];
        let ct = NativeCrypto.encrypt(&key, &nonce, b"hello").unwrap();
        assert_eq!(ct.len(), 5 + TAG_LEN);
        let pt = NativeCrypto.decrypt(&key, &nonce, &ct).unwrap();
        assert_eq!(pt, b"hello");
    }

    #[test]
    fn test_decrypt_rejects_tampering() {
        let key = NativeCrypto.derive_key("pw", &[1u8; SALT_LEN]).unwrap();
        let nonce = [2u8; NONCE_LEN];
        let mut ct = NativeCrypto.encrypt(&key, &nonce, b"hello").unwrap();
        ct[0] ^= 0x01;
        assert!(matches!(
            NativeCrypto.decrypt(&key, &nonce, &ct),
            Err(StegoError::AuthenticationFailure)
        ));

        ct[0] ^= 0x01;
        let other_nonce = [3u8; NONCE_LEN];
        assert!(matches!(
            NativeCrypto.decrypt(&key, &other_nonce, &ct),
            Err(StegoError::AuthenticationFailure)
        ));

        let wrong = NativeCrypto.derive_key("pw2", &[1u8; SALT_LEN]).unwrap();
        assert!(matches!(
            NativeCrypto.decrypt(&wrong, &nonce, &ct),
            Err(StegoError::AuthenticationFailure)
        ));
    }

    #[test]
    fn test_sha256_hex() {
        assert_eq!(
            NativeCrypto.sha256_hex(b"hello"),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
        assert_eq!(NativeCrypto.sha256_hex(b"").len(), HASH_HEX_LEN);
    }

    #[test]
    fn test_fill_random_varies() {
        let mut a = [0u8; SALT_LEN];
        let mut b = [0u8; SALT_LEN];
        NativeCrypto.fill_random(&mut a);
        NativeCrypto.fill_random(&mut b);
        assert_ne!(a, b);
    }
}
