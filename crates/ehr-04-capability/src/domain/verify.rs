//! # Signature Verification
//!
//! The verifier never trusts a carried digest: it recomputes the typed-data
//! encoding from the request fields and recovers the signer from that.

use super::entities::{RequestId, SignedAccessRequest};
use super::errors::CapabilityError;
use super::typed_data::TypedDataDomain;
use shared_crypto::recover_address;

/// Verify that `signed` was produced by its requester under `domain`.
///
/// Returns the request id on success.
pub fn verify_signed(
    domain: &TypedDataDomain,
    signed: &SignedAccessRequest,
) -> Result<RequestId, CapabilityError> {
    let digest = domain.digest(&signed.request);
    let signer = recover_address(&digest, &signed.signature)
        .map_err(|e| CapabilityError::InvalidSignature(e.to_string()))?;
    if signer != signed.request.requester {
        return Err(CapabilityError::InvalidSignature(
            "signer is not the requester".into(),
        ));
    }
    Ok(RequestId(digest))
}
