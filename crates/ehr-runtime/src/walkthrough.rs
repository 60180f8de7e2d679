//! End-to-end walkthrough of one record and one access grant.
//!
//! register identity → create & anchor → request → approve → view → redact

use crate::container::{generate_record_keys, Deployment, Participant};
use anyhow::{bail, Context, Result};
use ehr_03_commitment::{RecordDescriptor, RecordLifecycle};
use ehr_04_capability::{CapabilityApi, RequestStatus};
use ehr_05_request_ledger::{RequestLedgerApi, ViewerRole};
use ehr_telemetry::{log_event, log_record_event};
use shared_types::{CommitmentHash, RecordId, SessionRole};

const COMPONENT: &str = "walkthrough";

/// What the walkthrough observed, for the caller to print or assert on.
#[derive(Debug)]
pub struct WalkthroughReport {
    pub record_id: RecordId,
    pub commitment_hash: CommitmentHash,
    pub request_status: RequestStatus,
    pub viewed_bytes: usize,
    pub original: Vec<u8>,
    pub redacted: Vec<u8>,
}

/// Create, share and redact one record between a patient and a doctor.
pub async fn run(deployment: &Deployment, original: &[u8], amended: &[u8]) -> Result<WalkthroughReport> {
    let keys = generate_record_keys();
    let public_key = keys.public_key;
    let patient = deployment.login(deployment.new_wallet(), SessionRole::Patient, Some(keys));
    let doctor = deployment.login(deployment.new_wallet(), SessionRole::Doctor, None);
    let patient_id = patient.session.identity();

    let tx = patient
        .commitments
        .register_identity()
        .await
        .context("prepare identity registration")?;
    patient.send(&tx).await.context("register identity")?;

    let mut lifecycle = patient
        .commitments
        .start_record(patient_id, public_key)
        .context("start record")?;
    let created = create_record(&patient, &mut lifecycle, original).await?;
    log_record_event!(info, COMPONENT, "Record created", created.record_id);

    let ttl = deployment.config().capability.default_ttl_ms;
    let role = deployment.config().default_role()?;
    let (request, _) = doctor
        .capabilities
        .request_access(patient_id, created.record_id, role, ttl)
        .await
        .context("request access")?;

    let inbox = patient
        .requests
        .list(patient_id, ViewerRole::Owner)
        .await
        .context("list patient requests")?;
    log_event!(info, COMPONENT, "Patient inbox loaded", entries = inbox.len());
    if !inbox.iter().any(|entry| entry.id() == request.id) {
        bail!("request {} missing from the owner's ledger", request.id);
    }

    let (token, tx) = patient
        .capabilities
        .approve(&request.id)
        .await
        .context("approve request")?;
    patient.send(&tx).await.context("confirm approval")?;

    let blob = doctor.capabilities.view(&token).await.context("view record")?;
    log_record_event!(info, COMPONENT, "Record viewed with capability", token.record_id, bytes = blob.len());

    let status = doctor
        .requests
        .list(doctor.session.identity(), ViewerRole::Requester)
        .await
        .context("list doctor requests")?
        .into_iter()
        .find(|entry| entry.id() == request.id)
        .map(|entry| entry.status)
        .context("request missing from the requester's ledger")?;

    let (_, tx) = patient
        .commitments
        .redact(&mut lifecycle, amended)
        .await
        .context("prepare redaction")?;
    patient.send(&tx).await.context("confirm redaction")?;
    let redacted = patient.commitments.confirm(&mut lifecycle).await.context("confirm redaction")?;
    if redacted.commitment_hash != created.commitment_hash {
        bail!("commitment hash changed across redaction");
    }

    let current = deployment
        .store()
        .get(&redacted.content_address)
        .context("redacted blob missing from the content store")?;
    let redacted_plain = patient.open_own(&current).context("open redacted blob")?;
    let original_plain = patient.open_own(&blob).context("open original blob")?;

    patient.logout();
    doctor.logout();

    Ok(WalkthroughReport {
        record_id: created.record_id,
        commitment_hash: created.commitment_hash,
        request_status: status,
        viewed_bytes: blob.len(),
        original: original_plain,
        redacted: redacted_plain,
    })
}

async fn create_record(
    patient: &Participant,
    lifecycle: &mut RecordLifecycle,
    file: &[u8],
) -> Result<RecordDescriptor> {
    let commitments = &patient.commitments;
    commitments.encrypt(lifecycle, file).await.context("encrypt")?;
    commitments.anchor(lifecycle).await.context("upload")?;
    commitments.commit(lifecycle).await.context("commit")?;
    let (_, tx) = commitments.persist(lifecycle).await.context("persist")?;
    patient.send(&tx).await.context("broadcast record")?;
    commitments.confirm(lifecycle).await.context("confirm record")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::EhrConfig;
    use shared_types::ManualClock;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_walkthrough_completes() {
        let clock = Arc::new(ManualClock::new(1_700_000_000_000));
        let deployment = Deployment::new(EhrConfig::default(), clock).unwrap();

        let report = run(&deployment, b"blood panel v1", b"blood panel v2").await.unwrap();

        assert_eq!(report.request_status, RequestStatus::Approved);
        assert_eq!(report.original, b"blood panel v1");
        assert_eq!(report.redacted, b"blood panel v2");
        assert!(report.viewed_bytes > 0);
        assert_eq!(deployment.ledger().pending_operations(), 0);
    }
}
