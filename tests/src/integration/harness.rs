//! Shared fixture: one deployment on a manual clock, a registered patient
//! with one anchored record, and a doctor.

use ehr_03_commitment::{RecordDescriptor, RecordLifecycle};
use ehr_runtime::container::{generate_record_keys, Deployment, EhrConfig, Participant};
use shared_types::{ManualClock, PublicKeyBytes, SessionRole};
use std::sync::Arc;

pub const T0: u64 = 1_700_000_000_000;
pub const TTL: u64 = 60_000;

pub struct Harness {
    pub clock: Arc<ManualClock>,
    pub deployment: Deployment,
    pub patient: Participant,
    pub patient_key: PublicKeyBytes,
    pub doctor: Participant,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_config(EhrConfig::default()).await
    }

    pub async fn with_config(config: EhrConfig) -> Self {
        let clock = Arc::new(ManualClock::new(T0));
        let deployment = Deployment::new(config, clock.clone()).unwrap();

        let keys = generate_record_keys();
        let patient_key = keys.public_key;
        let patient = deployment.login(deployment.new_wallet(), SessionRole::Patient, Some(keys));
        let doctor = deployment.login(deployment.new_wallet(), SessionRole::Doctor, None);

        let tx = patient.commitments.register_identity().await.unwrap();
        patient.send(&tx).await.unwrap();

        Self {
            clock,
            deployment,
            patient,
            patient_key,
            doctor,
        }
    }

    /// encrypt → upload → commit → persist → broadcast → confirm.
    pub async fn create_record(&self, file: &[u8]) -> (RecordLifecycle, RecordDescriptor) {
        let commitments = &self.patient.commitments;
        let mut lifecycle = commitments
            .start_record(self.patient.session.identity(), self.patient_key)
            .unwrap();
        commitments.encrypt(&mut lifecycle, file).await.unwrap();
        commitments.anchor(&mut lifecycle).await.unwrap();
        commitments.commit(&mut lifecycle).await.unwrap();
        let (_, tx) = commitments.persist(&mut lifecycle).await.unwrap();
        self.patient.send(&tx).await.unwrap();
        let descriptor = commitments.confirm(&mut lifecycle).await.unwrap();
        (lifecycle, descriptor)
    }

    /// Broadcast a consent change for `record` and wait for it to land.
    pub async fn set_consent(&self, record: &RecordDescriptor, active: bool) {
        let tx = self
            .patient
            .commitments
            .toggle_consent(&record.record_id, record.owner, active)
            .await
            .unwrap();
        self.patient.send(&tx).await.unwrap();
    }
}
