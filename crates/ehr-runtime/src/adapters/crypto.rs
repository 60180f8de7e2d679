//! Encryption and commitment adapters over `shared-crypto`.

use ehr_03_commitment::{CollaboratorError, CommitmentScheme, EncryptedBlob, Encryptor};
use shared_crypto::{chameleon, ecies};
use shared_types::{CommitmentHash, ContentAddress, PublicKeyBytes, TrapdoorKey, Witness};

/// ECIES sealing to the owner's record key.
#[derive(Debug, Default, Clone, Copy)]
pub struct EciesEncryptor;

#[async_trait::async_trait]
impl Encryptor for EciesEncryptor {
    async fn encrypt(
        &self,
        plaintext: &[u8],
        recipient: &PublicKeyBytes,
    ) -> Result<EncryptedBlob, CollaboratorError> {
        ecies::seal(recipient.as_bytes(), plaintext)
            .map(EncryptedBlob::new)
            .map_err(|e| CollaboratorError::Rejected(e.to_string()))
    }
}

/// Chameleon commitments over `(content address, owner key)`.
///
/// `collide` only computes a candidate witness. Whether it really collides is
/// for the registry to check.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChameleonCommitter;

#[async_trait::async_trait]
impl CommitmentScheme for ChameleonCommitter {
    async fn commit(
        &self,
        content_address: &ContentAddress,
        public_key: &PublicKeyBytes,
    ) -> Result<(CommitmentHash, Witness), CollaboratorError> {
        let message = chameleon::encode_message(content_address.as_str(), public_key.as_bytes());
        let witness = chameleon::random_witness();
        let hash = chameleon::hash(&message, &witness, public_key.as_bytes())
            .map_err(|e| CollaboratorError::Rejected(e.to_string()))?;
        Ok((CommitmentHash(hash), Witness(witness)))
    }

    async fn collide(
        &self,
        old_content_address: &ContentAddress,
        old_witness: &Witness,
        new_content_address: &ContentAddress,
        public_key: &PublicKeyBytes,
        trapdoor: &TrapdoorKey,
    ) -> Result<Witness, CollaboratorError> {
        let old_message = chameleon::encode_message(old_content_address.as_str(), public_key.as_bytes());
        let new_message = chameleon::encode_message(new_content_address.as_str(), public_key.as_bytes());
        chameleon::forge_witness(trapdoor.expose_secret(), &old_message, &old_witness.0, &new_message)
            .map(Witness)
            .map_err(|e| CollaboratorError::Rejected(e.to_string()))
    }
}
