//! # Record Lifecycle
//!
//! Explicit state machine for one record. It is the source of truth for
//! "which step comes next"; presentation reads `phase()` and never infers
//! the step from which fields happen to be populated.
//!
//! Transitions take the collaborator's result and are applied only after
//! the collaborator call succeeded. Each `ensure_*` guard is checked before
//! the call is made.

use super::entities::{EncryptedBlob, RecordDescriptor};
use super::errors::{CommitmentError, Stage};
use shared_types::{
    Address, CommitmentHash, ContentAddress, PublicKeyBytes, RawTransaction, RecordId, Witness,
};

/// Observable phase of a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Nothing staged and nothing anchored yet.
    New,
    Draft,
    Uploaded,
    Committed,
    /// Registry call made; awaiting ledger confirmation.
    Persisted,
    /// Durable; nothing staged.
    Anchored,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::New => "new",
            Phase::Draft => "draft",
            Phase::Uploaded => "uploaded",
            Phase::Committed => "committed",
            Phase::Persisted => "persisted",
            Phase::Anchored => "anchored",
        }
    }
}

#[derive(Clone, Debug)]
enum Staging {
    Idle,
    Draft {
        blob: EncryptedBlob,
    },
    Uploaded {
        content_address: ContentAddress,
    },
    Committed {
        content_address: ContentAddress,
        commitment_hash: CommitmentHash,
        witness: Witness,
    },
    Persisted {
        descriptor: RecordDescriptor,
        transaction: RawTransaction,
    },
}

/// One record's lifecycle: the anchored state plus any staged work.
#[derive(Clone, Debug)]
pub struct RecordLifecycle {
    owner: Address,
    owner_public_key: PublicKeyBytes,
    anchored: Option<RecordDescriptor>,
    staging: Staging,
}

impl RecordLifecycle {
    /// A record that does not exist yet.
    pub fn new(owner: Address, owner_public_key: PublicKeyBytes) -> Self {
        Self {
            owner,
            owner_public_key,
            anchored: None,
            staging: Staging::Idle,
        }
    }

    /// Resume from a record already on the ledger.
    pub fn from_anchored(descriptor: RecordDescriptor, owner_public_key: PublicKeyBytes) -> Self {
        Self {
            owner: descriptor.owner,
            owner_public_key,
            anchored: Some(descriptor),
            staging: Staging::Idle,
        }
    }

    pub fn phase(&self) -> Phase {
        match (&self.staging, &self.anchored) {
            (Staging::Idle, None) => Phase::New,
            (Staging::Idle, Some(_)) => Phase::Anchored,
            (Staging::Draft { .. }, _) => Phase::Draft,
            (Staging::Uploaded { .. }, _) => Phase::Uploaded,
            (Staging::Committed { .. }, _) => Phase::Committed,
            (Staging::Persisted { .. }, _) => Phase::Persisted,
        }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn owner_public_key(&self) -> &PublicKeyBytes {
        &self.owner_public_key
    }

    /// The durable record, if anchored.
    pub fn anchored(&self) -> Option<&RecordDescriptor> {
        self.anchored.as_ref()
    }

    pub fn record_id(&self) -> Option<RecordId> {
        self.anchored.as_ref().map(|d| d.record_id)
    }

    /// Whether staged work is a redaction of an anchored record.
    pub fn is_redaction(&self) -> bool {
        self.anchored.is_some()
    }

    /// The staged blob, while in `Draft`.
    pub fn draft_blob(&self) -> Option<&EncryptedBlob> {
        match &self.staging {
            Staging::Draft { blob } => Some(blob),
            _ => None,
        }
    }

    /// Content address staged for upload, commit or persist.
    pub fn staged_content_address(&self) -> Option<&ContentAddress> {
        match &self.staging {
            Staging::Uploaded { content_address } | Staging::Committed { content_address, .. } => {
                Some(content_address)
            }
            Staging::Persisted { descriptor, .. } => Some(&descriptor.content_address),
            _ => None,
        }
    }

    /// Commitment staged for persist.
    pub fn staged_commitment(&self) -> Option<(&ContentAddress, &CommitmentHash, &Witness)> {
        match &self.staging {
            Staging::Committed {
                content_address,
                commitment_hash,
                witness,
            } => Some((content_address, commitment_hash, witness)),
            _ => None,
        }
    }

    /// Descriptor and transaction awaiting confirmation.
    pub fn pending(&self) -> Option<(&RecordDescriptor, &RawTransaction)> {
        match &self.staging {
            Staging::Persisted {
                descriptor,
                transaction,
            } => Some((descriptor, transaction)),
            _ => None,
        }
    }

    // =========================================================================
    // Guards
    // =========================================================================

    fn ensure(&self, attempted: Stage, allowed: &[Phase]) -> Result<(), CommitmentError> {
        let current = self.phase();
        if allowed.contains(&current) {
            Ok(())
        } else {
            Err(CommitmentError::OutOfOrder {
                attempted,
                current: current.as_str(),
            })
        }
    }

    pub fn ensure_can_encrypt(&self) -> Result<(), CommitmentError> {
        self.ensure(Stage::Encrypt, &[Phase::New, Phase::Anchored])
    }

    pub fn ensure_can_upload(&self) -> Result<(), CommitmentError> {
        self.ensure(Stage::Upload, &[Phase::Draft])
    }

    pub fn ensure_can_commit(&self) -> Result<(), CommitmentError> {
        self.ensure(Stage::Commit, &[Phase::Uploaded])
    }

    pub fn ensure_can_persist(&self) -> Result<(), CommitmentError> {
        self.ensure(Stage::Persist, &[Phase::Committed])
    }

    pub fn ensure_can_confirm(&self) -> Result<(), CommitmentError> {
        self.ensure(Stage::Confirm, &[Phase::Persisted])
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    pub fn drafted(&mut self, blob: EncryptedBlob) -> Result<(), CommitmentError> {
        self.ensure_can_encrypt()?;
        self.staging = Staging::Draft { blob };
        Ok(())
    }

    pub fn uploaded(&mut self, content_address: ContentAddress) -> Result<(), CommitmentError> {
        self.ensure_can_upload()?;
        self.staging = Staging::Uploaded { content_address };
        Ok(())
    }

    pub fn committed(
        &mut self,
        commitment_hash: CommitmentHash,
        witness: Witness,
    ) -> Result<(), CommitmentError> {
        self.ensure_can_commit()?;
        let content_address = match &self.staging {
            Staging::Uploaded { content_address } => content_address.clone(),
            _ => return Err(self.out_of_order(Stage::Commit)),
        };
        self.staging = Staging::Committed {
            content_address,
            commitment_hash,
            witness,
        };
        Ok(())
    }

    pub fn persisted(
        &mut self,
        descriptor: RecordDescriptor,
        transaction: RawTransaction,
    ) -> Result<(), CommitmentError> {
        self.ensure_can_persist()?;
        self.staging = Staging::Persisted {
            descriptor,
            transaction,
        };
        Ok(())
    }

    /// Promote the persisted descriptor to the anchored record.
    pub fn confirmed(&mut self) -> Result<&RecordDescriptor, CommitmentError> {
        self.ensure_can_confirm()?;
        let staging = std::mem::replace(&mut self.staging, Staging::Idle);
        match staging {
            Staging::Persisted { descriptor, .. } => Ok(self.anchored.insert(descriptor)),
            other => {
                self.staging = other;
                Err(self.out_of_order(Stage::Confirm))
            }
        }
    }

    /// The registry refused the staged redaction proof.
    ///
    /// Falls back to `Uploaded` with the same content address, so only the
    /// trapdoor commit has to be redone.
    pub fn proof_refused(&mut self) -> Result<(), CommitmentError> {
        if !self.is_redaction() {
            return Err(self.out_of_order(Stage::Persist));
        }
        let content_address = match &self.staging {
            Staging::Committed { content_address, .. } => content_address.clone(),
            _ => return Err(self.out_of_order(Stage::Persist)),
        };
        self.staging = Staging::Uploaded { content_address };
        Ok(())
    }

    fn out_of_order(&self, attempted: Stage) -> CommitmentError {
        CommitmentError::OutOfOrder {
            attempted,
            current: self.phase().as_str(),
        }
    }
}
