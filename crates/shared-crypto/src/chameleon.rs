//! # Chameleon Hash (secp256k1)
//!
//! A discrete-log chameleon hash. With public key `P = x·G`:
//!
//! ```text
//! h(m)     = SHA-256(m) mod n, with 0 mapped to 1
//! CH(m, r) = Keccak-256(compress(r·G + h(m)·P))
//! ```
//!
//! Anyone can compute and check `CH`. Only the holder of `x` can find `r'`
//! with `CH(m', r') = CH(m, r)`:
//!
//! ```text
//! r' = r + x·(h(m) − h(m')) mod n
//! ```
//!
//! Messages bind the content address to the owner's key, so a witness for
//! one owner's record is useless for another's.

use crate::hashing::{keccak256, sha256, Hash};
use crate::CryptoError;
use k256::elliptic_curve::ops::Reduce;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::elliptic_curve::{Field, PrimeField};
use k256::{FieldBytes, NonZeroScalar, ProjectivePoint, PublicKey, Scalar, U256};

/// Domain tag prefixed to every chameleon message.
pub const MESSAGE_TAG: &[u8] = b"EHR_CH_v1";

/// Published chameleon hash value.
pub type ChameleonHash = Hash;

/// Chameleon randomness `r` (canonical big-endian scalar).
pub type ChameleonWitness = [u8; 32];

/// `MESSAGE_TAG || keccak256(cid) || owner_public_key`.
pub fn encode_message(content_address: &str, owner_public_key: &[u8; 33]) -> Vec<u8> {
    let mut message = Vec::with_capacity(MESSAGE_TAG.len() + 32 + 33);
    message.extend_from_slice(MESSAGE_TAG);
    message.extend_from_slice(&keccak256(content_address.as_bytes()));
    message.extend_from_slice(owner_public_key);
    message
}

/// Fresh random witness.
pub fn random_witness() -> ChameleonWitness {
    let scalar = NonZeroScalar::random(&mut rand::thread_rng());
    (*scalar).to_bytes().into()
}

/// `CH(m, r)` under public key `public_key`.
pub fn hash(
    message: &[u8],
    witness: &ChameleonWitness,
    public_key: &[u8; 33],
) -> Result<ChameleonHash, CryptoError> {
    let p = PublicKey::from_sec1_bytes(public_key)
        .map_err(|_| CryptoError::InvalidPublicKey)?
        .to_projective();
    let r = scalar_from_witness(witness)?;
    let hm = hash_to_scalar(message);

    let point = (ProjectivePoint::GENERATOR * r + p * hm).to_affine();
    Ok(keccak256(point.to_encoded_point(true).as_bytes()))
}

/// Whether `(message, witness)` opens `expected` under `public_key`.
pub fn verify(
    message: &[u8],
    witness: &ChameleonWitness,
    public_key: &[u8; 33],
    expected: &ChameleonHash,
) -> bool {
    match hash(message, witness, public_key) {
        Ok(actual) => subtle::ConstantTimeEq::ct_eq(&actual[..], &expected[..]).into(),
        Err(_) => false,
    }
}

/// Compute the witness that makes `new_message` collide with
/// `(old_message, old_witness)`.
pub fn forge_witness(
    trapdoor: &[u8; 32],
    old_message: &[u8],
    old_witness: &ChameleonWitness,
    new_message: &[u8],
) -> Result<ChameleonWitness, CryptoError> {
    let x: Scalar = Option::from(Scalar::from_repr(FieldBytes::from(*trapdoor)))
        .ok_or(CryptoError::InvalidPrivateKey)?;
    if bool::from(x.is_zero()) {
        return Err(CryptoError::InvalidPrivateKey);
    }
    let r = scalar_from_witness(old_witness)?;
    let delta = hash_to_scalar(old_message) - hash_to_scalar(new_message);
    let forged = r + x * delta;
    Ok(forged.to_bytes().into())
}

fn hash_to_scalar(message: &[u8]) -> Scalar {
    let digest = FieldBytes::from(sha256(message));
    let scalar = <Scalar as Reduce<U256>>::reduce_bytes(&digest);
    if bool::from(scalar.is_zero()) {
        Scalar::ONE
    } else {
        scalar
    }
}

fn scalar_from_witness(witness: &ChameleonWitness) -> Result<Scalar, CryptoError> {
    Option::from(Scalar::from_repr(FieldBytes::from(*witness)))
        .ok_or_else(|| CryptoError::InvalidInput("witness is not a canonical scalar".into()))
}
