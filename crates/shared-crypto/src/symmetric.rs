//! # Payload Cipher
//!
//! AES-256-GCM framing for sealed record payloads: `nonce (12) || ciphertext`.
//! A fresh random nonce is drawn per payload.

use crate::hashing::sha256;
use crate::CryptoError;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// AES-GCM nonce length in bytes.
pub const NONCE_LEN: usize = 12;

/// GCM authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

/// Per-payload content key. Zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct PayloadKey([u8; 32]);

impl PayloadKey {
    /// Key for the payload sealed under an ECDH shared secret.
    pub fn derive(shared_secret: &[u8]) -> Self {
        Self(sha256(shared_secret))
    }

    fn cipher(&self) -> Aes256Gcm {
        Aes256Gcm::new((&self.0).into())
    }
}

impl std::fmt::Debug for PayloadKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PayloadKey(<redacted>)")
    }
}

/// Encrypt `plaintext`, returning the framed `nonce || ciphertext`.
pub fn seal_payload(key: &PayloadKey, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let mut nonce = [0u8; NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut nonce);

    let ciphertext = key
        .cipher()
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

    let mut framed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    framed.extend_from_slice(&nonce);
    framed.extend_from_slice(&ciphertext);
    Ok(framed)
}

/// Decrypt a framed payload. Fails when the tag does not verify.
pub fn open_payload(key: &PayloadKey, framed: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if framed.len() < NONCE_LEN + TAG_LEN {
        return Err(CryptoError::BlobTooShort {
            minimum: NONCE_LEN + TAG_LEN,
            actual: framed.len(),
        });
    }
    let (nonce, ciphertext) = framed.split_at(NONCE_LEN);
    key.cipher()
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|e| CryptoError::DecryptionFailed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_framed_payload_opens() {
        let key = PayloadKey::derive(b"shared");
        let framed = seal_payload(&key, b"allergy list").unwrap();

        assert_eq!(framed.len(), NONCE_LEN + 12 + TAG_LEN);
        assert_eq!(open_payload(&key, &framed).unwrap(), b"allergy list");
    }

    #[test]
    fn test_other_key_cannot_open() {
        let framed = seal_payload(&PayloadKey::derive(b"a"), b"x").unwrap();
        assert!(open_payload(&PayloadKey::derive(b"b"), &framed).is_err());
    }

    #[test]
    fn test_flipped_bit_fails_tag() {
        let key = PayloadKey::derive(b"shared");
        let mut framed = seal_payload(&key, b"x").unwrap();
        let last = framed.len() - 1;
        framed[last] ^= 0x01;

        assert!(matches!(open_payload(&key, &framed), Err(CryptoError::DecryptionFailed(_))));
    }

    #[test]
    fn test_nonce_differs_per_payload() {
        let key = PayloadKey::derive(b"shared");
        let a = seal_payload(&key, b"same").unwrap();
        let b = seal_payload(&key, b"same").unwrap();
        assert_ne!(a[..NONCE_LEN], b[..NONCE_LEN]);
    }
}
