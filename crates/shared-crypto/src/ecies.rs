//! # ECIES Sealing
//!
//! Seals a payload to a compressed secp256k1 public key:
//!
//! ```text
//! eph = random scalar
//! key = SHA-256(x(eph * P))
//! blob = compress(eph * G) (33) || nonce (12) || AES-256-GCM(key, nonce, plaintext)
//! ```
//!
//! Only the holder of the matching secret scalar can open the blob.

use crate::symmetric::{open_payload, seal_payload, PayloadKey, NONCE_LEN};
use crate::CryptoError;
use k256::ecdh::diffie_hellman;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::PublicKey;

/// Compressed ephemeral key length.
pub const EPHEMERAL_KEY_LEN: usize = 33;

/// Fixed header length (ephemeral key + nonce).
pub const HEADER_LEN: usize = EPHEMERAL_KEY_LEN + NONCE_LEN;

/// Encrypt `plaintext` so that only the owner of `recipient` can read it.
pub fn seal(recipient: &[u8; 33], plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let recipient =
        PublicKey::from_sec1_bytes(recipient).map_err(|_| CryptoError::InvalidPublicKey)?;

    let ephemeral = k256::SecretKey::random(&mut rand::thread_rng());
    let shared = diffie_hellman(ephemeral.to_nonzero_scalar(), recipient.as_affine());
    let key = PayloadKey::derive(shared.raw_secret_bytes().as_slice());
    let framed = seal_payload(&key, plaintext)?;

    let ephemeral_public = ephemeral.public_key().to_encoded_point(true);
    let mut blob = Vec::with_capacity(EPHEMERAL_KEY_LEN + framed.len());
    blob.extend_from_slice(ephemeral_public.as_bytes());
    blob.extend_from_slice(&framed);
    Ok(blob)
}

/// Open a blob produced by [`seal`] with the recipient's secret scalar.
pub fn open(secret: &[u8; 32], blob: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if blob.len() < HEADER_LEN {
        return Err(CryptoError::BlobTooShort {
            minimum: HEADER_LEN,
            actual: blob.len(),
        });
    }
    let (ephemeral, framed) = blob.split_at(EPHEMERAL_KEY_LEN);

    let secret = k256::SecretKey::from_slice(secret).map_err(|_| CryptoError::InvalidPrivateKey)?;
    let ephemeral =
        PublicKey::from_sec1_bytes(ephemeral).map_err(|_| CryptoError::InvalidPublicKey)?;
    let shared = diffie_hellman(secret.to_nonzero_scalar(), ephemeral.as_affine());
    open_payload(&PayloadKey::derive(shared.raw_secret_bytes().as_slice()), framed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecdsa::Secp256k1KeyPair;

    #[test]
    fn test_seal_open_roundtrip() {
        let owner = Secp256k1KeyPair::generate();
        let blob = seal(&owner.public_key(), b"discharge summary").unwrap();

        assert_eq!(open(&owner.to_bytes(), &blob).unwrap(), b"discharge summary");
    }

    #[test]
    fn test_other_key_cannot_open() {
        let owner = Secp256k1KeyPair::generate();
        let stranger = Secp256k1KeyPair::generate();
        let blob = seal(&owner.public_key(), b"x-ray").unwrap();

        assert!(open(&stranger.to_bytes(), &blob).is_err());
    }

    #[test]
    fn test_blob_layout() {
        let owner = Secp256k1KeyPair::generate();
        let blob = seal(&owner.public_key(), b"abc").unwrap();
        // 3 bytes of plaintext plus a 16-byte tag
        assert_eq!(blob.len(), HEADER_LEN + 3 + 16);
        assert!(blob[0] == 0x02 || blob[0] == 0x03);
    }

    #[test]
    fn test_short_blob_rejected() {
        let err = open(&[1; 32], &[0u8; 10]).unwrap_err();
        assert_eq!(
            err,
            CryptoError::BlobTooShort {
                minimum: HEADER_LEN,
                actual: 10
            }
        );
    }

    #[test]
    fn test_invalid_recipient_rejected() {
        assert_eq!(seal(&[0u8; 33], b"x").unwrap_err(), CryptoError::InvalidPublicKey);
    }
}
