//! # Commitment Manager Service
//!
//! Wires the record lifecycle to its collaborators. Every public step:
//!
//! 1. checks its inputs and the lifecycle phase (no collaborator call on failure),
//! 2. makes exactly one collaborator call,
//! 3. applies the transition only if that call succeeded.

use crate::domain::entities::RecordDescriptor;
use crate::domain::errors::CommitmentError;
use crate::domain::lifecycle::RecordLifecycle;
use crate::ports::outbound::{
    CollaboratorError, CommitmentScheme, ContentStore, Encryptor, RecordRegistry, StoreRecord,
    UpdateRecord,
};
use ehr_02_consent_gate::ConsentGateApi;
use ehr_telemetry::{log_event, log_record_event};
use shared_types::{
    Address, ContentAddress, PublicKeyBytes, RawTransaction, RecordId, Session, SessionRole,
    TrapdoorKey,
};
use std::sync::Arc;

const COMPONENT: &str = "commitment";

/// Collaborators the manager drives.
#[derive(Clone)]
pub struct CommitmentPorts {
    pub encryptor: Arc<dyn Encryptor>,
    pub store: Arc<dyn ContentStore>,
    pub scheme: Arc<dyn CommitmentScheme>,
    pub registry: Arc<dyn RecordRegistry>,
    pub consent: Arc<dyn ConsentGateApi>,
}

/// Commitment Manager.
///
/// Bound to one session: it acts for the session's identity and only ever
/// releases that identity's trapdoor, and only for that identity's records.
pub struct CommitmentManager {
    session: Arc<Session>,
    ports: CommitmentPorts,
}

impl CommitmentManager {
    pub fn new(session: Arc<Session>, ports: CommitmentPorts) -> Self {
        Self { session, ports }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    // =========================================================================
    // Identity
    // =========================================================================

    /// Unsigned transaction registering the session's record public key.
    #[tracing::instrument(skip_all)]
    pub async fn register_identity(&self) -> Result<RawTransaction, CommitmentError> {
        let public_key = self
            .session
            .public_key()
            .ok_or(CommitmentError::MissingInput("public_key"))?;
        let tx = self
            .ports
            .registry
            .register_identity(self.session.identity(), &public_key)
            .await
            .map_err(|e| CommitmentError::IdentityError(e.reason()))?;
        log_event!(info, COMPONENT, "Identity registration prepared");
        Ok(tx)
    }

    // =========================================================================
    // Record creation
    // =========================================================================

    /// Start a new record for `owner`.
    ///
    /// Patients may only start records for themselves; a custodian may
    /// originate one for any patient, who co-signs by broadcasting the
    /// anchoring transaction.
    pub fn start_record(
        &self,
        owner: Address,
        owner_public_key: PublicKeyBytes,
    ) -> Result<RecordLifecycle, CommitmentError> {
        if owner != self.session.identity() && self.session.role() != SessionRole::Admin {
            return Err(CommitmentError::ForeignOwner);
        }
        Ok(RecordLifecycle::new(owner, owner_public_key))
    }

    /// Resume work on an anchored record from the ledger's view.
    pub async fn open_record(
        &self,
        record_id: &RecordId,
        owner_public_key: PublicKeyBytes,
    ) -> Result<RecordLifecycle, CommitmentError> {
        if record_id.is_zero() {
            return Err(CommitmentError::MissingInput("record_id"));
        }
        let descriptor = self
            .ports
            .registry
            .record(record_id)
            .await
            .map_err(|e| CommitmentError::AnchorError(e.reason()))?;
        Ok(RecordLifecycle::from_anchored(descriptor, owner_public_key))
    }

    /// Encrypt `file` for the record's owner. No plaintext is retained.
    #[tracing::instrument(skip_all, fields(owner = %hex_address(&lifecycle.owner())))]
    pub async fn encrypt(
        &self,
        lifecycle: &mut RecordLifecycle,
        file: &[u8],
    ) -> Result<(), CommitmentError> {
        if file.is_empty() {
            return Err(CommitmentError::MissingInput("file"));
        }
        lifecycle.ensure_can_encrypt()?;

        let blob = self
            .ports
            .encryptor
            .encrypt(file, lifecycle.owner_public_key())
            .await
            .map_err(|e| CommitmentError::EncryptionError(e.reason()))?;

        log_event!(debug, COMPONENT, "Payload encrypted", blob_len = blob.len());
        lifecycle.drafted(blob)
    }

    /// Upload the draft blob; returns its content address.
    #[tracing::instrument(skip_all)]
    pub async fn anchor(&self, lifecycle: &mut RecordLifecycle) -> Result<ContentAddress, CommitmentError> {
        lifecycle.ensure_can_upload()?;
        let blob = lifecycle
            .draft_blob()
            .ok_or(CommitmentError::MissingInput("blob"))?;

        let content_address = self
            .ports
            .store
            .upload(blob)
            .await
            .map_err(|e| CommitmentError::StoreUnavailable(e.reason()))?;

        log_event!(info, COMPONENT, "Blob uploaded", content_address = %content_address);
        lifecycle.uploaded(content_address.clone())?;
        Ok(content_address)
    }

    /// Compute a fresh commitment for a new record.
    #[tracing::instrument(skip_all)]
    pub async fn commit(&self, lifecycle: &mut RecordLifecycle) -> Result<(), CommitmentError> {
        lifecycle.ensure_can_commit()?;
        if lifecycle.is_redaction() {
            // Anchored records keep their hash; a new one needs the trapdoor
            return Err(CommitmentError::MissingInput("trapdoor"));
        }
        let content_address = lifecycle
            .staged_content_address()
            .ok_or(CommitmentError::MissingInput("content_address"))?;

        let (hash, witness) = self
            .ports
            .scheme
            .commit(content_address, lifecycle.owner_public_key())
            .await
            .map_err(|e| CommitmentError::CommitmentFailed(e.reason()))?;

        log_event!(debug, COMPONENT, "Commitment computed", commitment = %hash.to_hex());
        lifecycle.committed(hash, witness)
    }

    /// Compute the colliding witness for a redaction of an anchored record.
    #[tracing::instrument(skip_all)]
    pub async fn commit_redaction(
        &self,
        lifecycle: &mut RecordLifecycle,
        trapdoor: &TrapdoorKey,
    ) -> Result<(), CommitmentError> {
        lifecycle.ensure_can_commit()?;
        let anchored = lifecycle
            .anchored()
            .cloned()
            .ok_or(CommitmentError::MissingInput("record_id"))?;
        self.ensure_own(&anchored)?;
        let new_content_address = lifecycle
            .staged_content_address()
            .ok_or(CommitmentError::MissingInput("content_address"))?;

        let witness = self
            .ports
            .scheme
            .collide(
                &anchored.content_address,
                &anchored.witness,
                new_content_address,
                lifecycle.owner_public_key(),
                trapdoor,
            )
            .await
            .map_err(|e| CommitmentError::CommitmentFailed(e.reason()))?;

        lifecycle.committed(anchored.commitment_hash, witness)
    }

    /// Hand the staged commitment to the registry.
    ///
    /// Creates the record when none is anchored, otherwise submits the
    /// redaction proof (old opening plus new opening of the same hash).
    #[tracing::instrument(skip_all)]
    pub async fn persist(
        &self,
        lifecycle: &mut RecordLifecycle,
    ) -> Result<(RecordDescriptor, RawTransaction), CommitmentError> {
        lifecycle.ensure_can_persist()?;
        let (content_address, commitment_hash, witness) = lifecycle
            .staged_commitment()
            .map(|(c, h, w)| (c.clone(), *h, *w))
            .ok_or(CommitmentError::MissingInput("commitment"))?;

        let (descriptor, tx) = match lifecycle.anchored().cloned() {
            None => {
                let request = StoreRecord {
                    content_address: content_address.clone(),
                    commitment_hash,
                    witness,
                    owner: lifecycle.owner(),
                };
                let (record_id, tx) = self
                    .ports
                    .registry
                    .store_record(&request)
                    .await
                    .map_err(|e| CommitmentError::AnchorError(e.reason()))?;
                if record_id.is_zero() {
                    return Err(CommitmentError::AnchorError("registry assigned a zero record id".into()));
                }
                let descriptor = RecordDescriptor {
                    record_id,
                    content_address,
                    commitment_hash,
                    witness,
                    owner: lifecycle.owner(),
                };
                (descriptor, tx)
            }
            Some(anchored) => {
                let request = UpdateRecord {
                    record_id: anchored.record_id,
                    new_content_address: content_address.clone(),
                    new_witness: witness,
                    commitment_hash: anchored.commitment_hash,
                    old_content_address: anchored.content_address.clone(),
                    old_witness: anchored.witness,
                    owner: anchored.owner,
                };
                let tx = match self.ports.registry.update_record(&request).await {
                    Ok(tx) => tx,
                    Err(error) => {
                        let error = redaction_error(error, &anchored.record_id);
                        if matches!(error, CommitmentError::RedactionError(_)) {
                            lifecycle.proof_refused()?;
                        }
                        return Err(error);
                    }
                };
                let descriptor = RecordDescriptor {
                    content_address,
                    witness,
                    ..anchored
                };
                (descriptor, tx)
            }
        };

        log_record_event!(info, COMPONENT, "Record persisted, awaiting confirmation", descriptor.record_id);
        lifecycle.persisted(descriptor.clone(), tx.clone())?;
        Ok((descriptor, tx))
    }

    /// Promote the persisted record once its transaction is on the ledger.
    ///
    /// The ledger's view must match what was persisted; otherwise the
    /// lifecycle stays `Persisted`.
    #[tracing::instrument(skip_all)]
    pub async fn confirm(&self, lifecycle: &mut RecordLifecycle) -> Result<RecordDescriptor, CommitmentError> {
        lifecycle.ensure_can_confirm()?;
        let expected = lifecycle
            .pending()
            .map(|(d, _)| d.clone())
            .ok_or(CommitmentError::MissingInput("pending"))?;

        let on_ledger = self
            .ports
            .registry
            .record(&expected.record_id)
            .await
            .map_err(|e| CommitmentError::NotConfirmed(e.reason()))?;
        if on_ledger != expected {
            return Err(CommitmentError::NotConfirmed(format!(
                "ledger shows {} for record {}",
                on_ledger.content_address, expected.record_id
            )));
        }

        let anchored = lifecycle.confirmed()?.clone();
        log_record_event!(info, COMPONENT, "Record anchored", anchored.record_id, content_address = %anchored.content_address);
        Ok(anchored)
    }

    // =========================================================================
    // Redaction
    // =========================================================================

    /// Replace the record's payload using the session's own trapdoor.
    pub async fn redact(
        &self,
        lifecycle: &mut RecordLifecycle,
        new_file: &[u8],
    ) -> Result<(RecordDescriptor, RawTransaction), CommitmentError> {
        let owner = lifecycle.owner();
        let trapdoor = self
            .session
            .trapdoor_for(&owner)
            .ok_or_else(|| match lifecycle.record_id() {
                Some(record_id) if owner != self.session.identity() => {
                    CommitmentError::ForeignRecord { record_id }
                }
                _ => CommitmentError::MissingInput("trapdoor"),
            })?
            .clone();
        self.redact_with_key(lifecycle, new_file, &trapdoor).await
    }

    /// encrypt → anchor → commit (trapdoor) → persist, on an anchored record.
    ///
    /// The commitment hash and record id are carried over unchanged. On
    /// failure the lifecycle stays at the last completed step.
    #[tracing::instrument(skip_all)]
    pub async fn redact_with_key(
        &self,
        lifecycle: &mut RecordLifecycle,
        new_file: &[u8],
        trapdoor: &TrapdoorKey,
    ) -> Result<(RecordDescriptor, RawTransaction), CommitmentError> {
        let anchored = lifecycle
            .anchored()
            .cloned()
            .ok_or(CommitmentError::MissingInput("record_id"))?;
        self.ensure_own(&anchored)?;

        log_record_event!(info, COMPONENT, "Redaction started", anchored.record_id);
        self.encrypt(lifecycle, new_file).await?;
        self.anchor(lifecycle).await?;
        self.commit_redaction(lifecycle, trapdoor).await?;
        self.persist(lifecycle).await
    }

    // =========================================================================
    // Consent
    // =========================================================================

    /// Unsigned transaction setting the record's consent flag.
    pub async fn toggle_consent(
        &self,
        record_id: &RecordId,
        owner: Address,
        active: bool,
    ) -> Result<RawTransaction, CommitmentError> {
        if record_id.is_zero() {
            return Err(CommitmentError::MissingInput("record_id"));
        }
        Ok(self.ports.consent.set(record_id, owner, active).await?)
    }

    fn ensure_own(&self, descriptor: &RecordDescriptor) -> Result<(), CommitmentError> {
        if descriptor.owner != self.session.identity() {
            log_record_event!(warn, COMPONENT, "Refusing to act on another identity's record", descriptor.record_id);
            return Err(CommitmentError::ForeignRecord {
                record_id: descriptor.record_id,
            });
        }
        Ok(())
    }
}

fn redaction_error(error: CollaboratorError, record_id: &RecordId) -> CommitmentError {
    match error {
        CollaboratorError::Unavailable(reason) => CommitmentError::AnchorError(reason),
        other => CommitmentError::RedactionError(format!("{record_id}: {}", other.reason())),
    }
}

fn hex_address(address: &Address) -> String {
    shared_types::address_to_hex(address)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::EncryptedBlob;
    use crate::domain::errors::Stage;
    use crate::domain::lifecycle::Phase;
    use ehr_02_consent_gate::ConsentError;
    use parking_lot::Mutex;
    use shared_types::{CommitmentHash, NetworkContext, RecordKeys, Witness};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    const PATIENT: Address = [0xAA; 20];
    const TRAPDOOR: [u8; 32] = [7; 32];
    const BAD_WITNESS: Witness = Witness([0xEE; 32]);

    // =========================================================================
    // Fakes
    // =========================================================================

    #[derive(Default)]
    struct CountingEncryptor {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl Encryptor for CountingEncryptor {
        async fn encrypt(
            &self,
            plaintext: &[u8],
            _recipient: &PublicKeyBytes,
        ) -> Result<EncryptedBlob, CollaboratorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(EncryptedBlob::new(plaintext.iter().rev().copied().collect()))
        }
    }

    struct FlakyStore {
        up: AtomicBool,
        blobs: Mutex<HashMap<ContentAddress, EncryptedBlob>>,
    }

    #[async_trait::async_trait]
    impl ContentStore for FlakyStore {
        async fn upload(&self, blob: &EncryptedBlob) -> Result<ContentAddress, CollaboratorError> {
            if !self.up.load(Ordering::SeqCst) {
                return Err(CollaboratorError::Unavailable("gateway timeout".into()));
            }
            let name: String = blob.as_bytes().iter().map(|b| format!("{b:02x}")).collect();
            let cid = ContentAddress::parse(format!("bafy{name}")).unwrap();
            self.blobs.lock().insert(cid.clone(), blob.clone());
            Ok(cid)
        }

        async fn fetch(&self, cid: &ContentAddress) -> Result<EncryptedBlob, CollaboratorError> {
            self.blobs.lock().get(cid).cloned().ok_or(CollaboratorError::NotFound)
        }
    }

    #[derive(Default)]
    struct FakeScheme {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl CommitmentScheme for FakeScheme {
        async fn commit(
            &self,
            _cid: &ContentAddress,
            _pk: &PublicKeyBytes,
        ) -> Result<(CommitmentHash, Witness), CollaboratorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok((CommitmentHash([0x44; 32]), Witness([1; 32])))
        }

        async fn collide(
            &self,
            _old_cid: &ContentAddress,
            old_witness: &Witness,
            _new_cid: &ContentAddress,
            _pk: &PublicKeyBytes,
            trapdoor: &TrapdoorKey,
        ) -> Result<Witness, CollaboratorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if *trapdoor.expose_secret() == TRAPDOOR {
                Ok(Witness([old_witness.0[0].wrapping_add(1); 32]))
            } else {
                Ok(BAD_WITNESS)
            }
        }
    }

    /// Registry that applies prepared writes only on `mine()`.
    #[derive(Default)]
    struct FakeRegistry {
        records: Mutex<HashMap<RecordId, RecordDescriptor>>,
        pending: Mutex<Vec<RecordDescriptor>>,
    }

    impl FakeRegistry {
        fn mine(&self) {
            let pending: Vec<_> = self.pending.lock().drain(..).collect();
            let mut records = self.records.lock();
            for descriptor in pending {
                records.insert(descriptor.record_id, descriptor);
            }
        }
    }

    #[async_trait::async_trait]
    impl RecordRegistry for FakeRegistry {
        async fn register_identity(
            &self,
            identity: Address,
            _pk: &PublicKeyBytes,
        ) -> Result<RawTransaction, CollaboratorError> {
            Ok(RawTransaction::call(identity, [0x11; 20], b"register".to_vec()))
        }

        async fn store_record(
            &self,
            request: &StoreRecord,
        ) -> Result<(RecordId, RawTransaction), CollaboratorError> {
            let record_id = RecordId([0x42; 32]);
            self.pending.lock().push(RecordDescriptor {
                record_id,
                content_address: request.content_address.clone(),
                commitment_hash: request.commitment_hash,
                witness: request.witness,
                owner: request.owner,
            });
            Ok((record_id, RawTransaction::call(request.owner, [0x11; 20], b"store".to_vec())))
        }

        async fn update_record(&self, request: &UpdateRecord) -> Result<RawTransaction, CollaboratorError> {
            let current = self
                .records
                .lock()
                .get(&request.record_id)
                .cloned()
                .ok_or(CollaboratorError::NotFound)?;
            if current.content_address != request.old_content_address
                || current.witness != request.old_witness
            {
                return Err(CollaboratorError::Rejected("stale opening".into()));
            }
            if request.new_witness == BAD_WITNESS {
                return Err(CollaboratorError::Rejected("collision check failed".into()));
            }
            self.pending.lock().push(RecordDescriptor {
                content_address: request.new_content_address.clone(),
                witness: request.new_witness,
                ..current
            });
            Ok(RawTransaction::call(request.owner, [0x11; 20], b"update".to_vec()))
        }

        async fn record(&self, record_id: &RecordId) -> Result<RecordDescriptor, CollaboratorError> {
            self.records.lock().get(record_id).cloned().ok_or(CollaboratorError::NotFound)
        }
    }

    struct OwnerOnlyConsent;

    #[async_trait::async_trait]
    impl ConsentGateApi for OwnerOnlyConsent {
        async fn is_active(&self, _record_id: &RecordId) -> Result<bool, ConsentError> {
            Ok(true)
        }

        async fn set(
            &self,
            record_id: &RecordId,
            owner: Address,
            active: bool,
        ) -> Result<RawTransaction, ConsentError> {
            if owner != PATIENT {
                return Err(ConsentError::NotOwner { record_id: *record_id });
            }
            Ok(RawTransaction::call(owner, [0x11; 20], vec![active as u8]))
        }
    }

    struct Fixture {
        encryptor: Arc<CountingEncryptor>,
        store: Arc<FlakyStore>,
        scheme: Arc<FakeScheme>,
        registry: Arc<FakeRegistry>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                encryptor: Arc::new(CountingEncryptor::default()),
                store: Arc::new(FlakyStore {
                    up: AtomicBool::new(true),
                    blobs: Mutex::new(HashMap::new()),
                }),
                scheme: Arc::new(FakeScheme::default()),
                registry: Arc::new(FakeRegistry::default()),
            }
        }

        fn manager_for(&self, identity: Address, role: SessionRole) -> CommitmentManager {
            let session = Session::login(
                identity,
                role,
                NetworkContext {
                    chain_id: 1337,
                    verifying_authority: [0x11; 20],
                    protocol_name: "AccessRegistry".into(),
                    protocol_version: "1".into(),
                },
                0,
            )
            .with_record_keys(RecordKeys {
                public_key: PublicKeyBytes([2; 33]),
                trapdoor: TrapdoorKey::from_bytes(TRAPDOOR),
            });
            CommitmentManager::new(
                Arc::new(session),
                CommitmentPorts {
                    encryptor: self.encryptor.clone(),
                    store: self.store.clone(),
                    scheme: self.scheme.clone(),
                    registry: self.registry.clone(),
                    consent: Arc::new(OwnerOnlyConsent),
                },
            )
        }

        fn manager(&self) -> CommitmentManager {
            self.manager_for(PATIENT, SessionRole::Patient)
        }
    }

    async fn anchored_record(fx: &Fixture, manager: &CommitmentManager) -> RecordLifecycle {
        let mut lc = manager.start_record(PATIENT, PublicKeyBytes([2; 33])).unwrap();
        manager.encrypt(&mut lc, b"lab results").await.unwrap();
        manager.anchor(&mut lc).await.unwrap();
        manager.commit(&mut lc).await.unwrap();
        manager.persist(&mut lc).await.unwrap();
        fx.registry.mine();
        manager.confirm(&mut lc).await.unwrap();
        lc
    }

    // =========================================================================
    // Tests
    // =========================================================================

    #[tokio::test]
    async fn test_create_reaches_anchored() {
        let fx = Fixture::new();
        let manager = fx.manager();
        let lc = anchored_record(&fx, &manager).await;

        assert_eq!(lc.phase(), Phase::Anchored);
        assert_eq!(lc.record_id(), Some(RecordId([0x42; 32])));
    }

    #[tokio::test]
    async fn test_empty_file_is_input_error_without_collaborator_call() {
        let fx = Fixture::new();
        let manager = fx.manager();
        let mut lc = manager.start_record(PATIENT, PublicKeyBytes([2; 33])).unwrap();

        let err = manager.encrypt(&mut lc, b"").await.unwrap_err();
        assert_eq!(err, CommitmentError::MissingInput("file"));
        assert_eq!(fx.encryptor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_commit_before_upload_is_rejected_not_reordered() {
        let fx = Fixture::new();
        let manager = fx.manager();
        let mut lc = manager.start_record(PATIENT, PublicKeyBytes([2; 33])).unwrap();
        manager.encrypt(&mut lc, b"scan").await.unwrap();

        let err = manager.commit(&mut lc).await.unwrap_err();
        assert_eq!(err.stage(), Stage::Commit);
        assert!(matches!(err, CommitmentError::OutOfOrder { .. }));
        assert_eq!(fx.scheme.calls.load(Ordering::SeqCst), 0);
        assert_eq!(lc.phase(), Phase::Draft);
    }

    #[tokio::test]
    async fn test_store_outage_resumes_from_upload() {
        let fx = Fixture::new();
        let manager = fx.manager();
        let mut lc = manager.start_record(PATIENT, PublicKeyBytes([2; 33])).unwrap();
        manager.encrypt(&mut lc, b"scan").await.unwrap();

        fx.store.up.store(false, Ordering::SeqCst);
        let err = manager.anchor(&mut lc).await.unwrap_err();
        assert_eq!(err.stage(), Stage::Upload);
        assert_eq!(lc.phase(), Phase::Draft);

        fx.store.up.store(true, Ordering::SeqCst);
        manager.anchor(&mut lc).await.unwrap();
        assert_eq!(lc.phase(), Phase::Uploaded);
        assert_eq!(fx.encryptor.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_confirm_requires_ledger_state() {
        let fx = Fixture::new();
        let manager = fx.manager();
        let mut lc = manager.start_record(PATIENT, PublicKeyBytes([2; 33])).unwrap();
        manager.encrypt(&mut lc, b"scan").await.unwrap();
        manager.anchor(&mut lc).await.unwrap();
        manager.commit(&mut lc).await.unwrap();
        manager.persist(&mut lc).await.unwrap();

        let err = manager.confirm(&mut lc).await.unwrap_err();
        assert_eq!(err.stage(), Stage::Confirm);
        assert_eq!(lc.phase(), Phase::Persisted);
    }

    #[tokio::test]
    async fn test_redaction_keeps_hash_and_id() {
        let fx = Fixture::new();
        let manager = fx.manager();
        let mut lc = anchored_record(&fx, &manager).await;
        let before = lc.anchored().unwrap().clone();

        let (descriptor, _tx) = manager.redact(&mut lc, b"corrected lab results").await.unwrap();
        fx.registry.mine();
        let after = manager.confirm(&mut lc).await.unwrap();

        assert_eq!(descriptor, after);
        assert_eq!(after.record_id, before.record_id);
        assert_eq!(after.commitment_hash, before.commitment_hash);
        assert_ne!(after.content_address, before.content_address);
        assert_ne!(after.witness, before.witness);
    }

    #[tokio::test]
    async fn test_wrong_trapdoor_is_redaction_error_and_anchor_unchanged() {
        let fx = Fixture::new();
        let manager = fx.manager();
        let mut lc = anchored_record(&fx, &manager).await;
        let before = lc.anchored().unwrap().clone();

        let err = manager
            .redact_with_key(&mut lc, b"forged", &TrapdoorKey::from_bytes([1; 32]))
            .await
            .unwrap_err();

        assert!(matches!(err, CommitmentError::RedactionError(_)));
        assert_eq!(err.stage(), Stage::Redact);
        assert_eq!(lc.anchored(), Some(&before));
        assert_eq!(fx.registry.records.lock().get(&before.record_id), Some(&before));
    }

    #[tokio::test]
    async fn test_refused_redaction_resumes_at_commit() {
        let fx = Fixture::new();
        let manager = fx.manager();
        let mut lc = anchored_record(&fx, &manager).await;
        let before = lc.anchored().unwrap().clone();

        manager
            .redact_with_key(&mut lc, b"forged", &TrapdoorKey::from_bytes([1; 32]))
            .await
            .unwrap_err();
        assert_eq!(lc.phase(), Phase::Uploaded);
        let staged = lc.staged_content_address().cloned().unwrap();

        manager
            .commit_redaction(&mut lc, &TrapdoorKey::from_bytes(TRAPDOOR))
            .await
            .unwrap();
        let (descriptor, _tx) = manager.persist(&mut lc).await.unwrap();
        fx.registry.mine();
        let after = manager.confirm(&mut lc).await.unwrap();

        assert_eq!(descriptor.content_address, staged);
        assert_eq!(after.commitment_hash, before.commitment_hash);
        assert_eq!(lc.phase(), Phase::Anchored);
    }

    #[tokio::test]
    async fn test_foreign_session_cannot_redact() {
        let fx = Fixture::new();
        let owner_manager = fx.manager();
        let mut lc = anchored_record(&fx, &owner_manager).await;

        let stranger = fx.manager_for([0xBB; 20], SessionRole::Patient);
        let err = stranger.redact(&mut lc, b"tamper").await.unwrap_err();

        assert_eq!(err, CommitmentError::ForeignRecord { record_id: RecordId([0x42; 32]) });
        assert_eq!(lc.phase(), Phase::Anchored);
    }

    #[tokio::test]
    async fn test_only_custodian_originates_for_others() {
        let fx = Fixture::new();
        assert_eq!(
            fx.manager_for([0xBB; 20], SessionRole::Patient)
                .start_record(PATIENT, PublicKeyBytes([2; 33]))
                .unwrap_err(),
            CommitmentError::ForeignOwner
        );
        assert!(fx
            .manager_for([0xCC; 20], SessionRole::Admin)
            .start_record(PATIENT, PublicKeyBytes([2; 33]))
            .is_ok());
    }

    #[tokio::test]
    async fn test_toggle_consent_by_non_owner() {
        let fx = Fixture::new();
        let err = fx
            .manager()
            .toggle_consent(&RecordId([0x42; 32]), [0xBB; 20], false)
            .await
            .unwrap_err();
        assert!(matches!(err, CommitmentError::Consent(ConsentError::NotOwner { .. })));
    }

    #[tokio::test]
    async fn test_register_identity() {
        let fx = Fixture::new();
        let tx = fx.manager().register_identity().await.unwrap();
        assert_eq!(tx.from, Some(PATIENT));
    }
}
