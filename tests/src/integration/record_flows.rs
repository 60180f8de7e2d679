//! # Record Flows
//!
//! Creation, consent and redaction of one record, driven through the
//! commitment component and confirmed by broadcasting through the wallet.
//!
//! - Scenario A: encrypt, upload, commit and anchor; consent gates requests.
//! - Scenario C: redaction keeps the commitment hash and swaps the CID;
//!   a wrong trapdoor is refused and leaves the record untouched.

#[cfg(test)]
mod tests {
    use super::super::harness::{Harness, TTL};
    use ehr_01_transaction_broker::BrokerError;
    use ehr_03_commitment::{CommitmentError, Phase, RecordRegistry};
    use ehr_04_capability::{CapabilityApi, CapabilityError, Role};
    use ehr_runtime::adapters::ledger::derive_record_id;
    use ehr_runtime::container::EhrConfig;
    use shared_types::{SessionRole, TrapdoorKey};

    // =========================================================================
    // SCENARIO A: CREATE AND ANCHOR
    // =========================================================================

    #[tokio::test]
    async fn test_record_is_anchored_under_its_derived_id() {
        let h = Harness::new().await;
        let (lifecycle, record) = h.create_record(b"F").await;

        assert_eq!(lifecycle.phase(), Phase::Anchored);
        assert!(record.content_address.as_str().starts_with("bafy"));
        assert_eq!(
            record.record_id,
            derive_record_id(&record.content_address, &record.owner)
        );
        assert_eq!(h.deployment.ledger().record(&record.record_id).await.unwrap(), record);
        assert_eq!(h.deployment.ledger().pending_operations(), 0);
    }

    #[tokio::test]
    async fn test_consent_defaults_to_active() {
        let h = Harness::new().await;
        let (_, record) = h.create_record(b"F").await;

        let requested = h
            .doctor
            .capabilities
            .request_access(record.owner, record.record_id, Role::Read, TTL)
            .await;
        assert!(requested.is_ok());
    }

    #[tokio::test]
    async fn test_doctor_cannot_request_while_consent_is_off() {
        let h = Harness::new().await;
        let (_, record) = h.create_record(b"F").await;
        h.set_consent(&record, false).await;

        let err = h
            .doctor
            .capabilities
            .request_access(record.owner, record.record_id, Role::Read, TTL)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            CapabilityError::ConsentDenied {
                record_id: record.record_id
            }
        );
        assert!(h.doctor.capabilities.local_requests().is_empty());
    }

    #[tokio::test]
    async fn test_inactive_default_policy_requires_opt_in() {
        let mut config = EhrConfig::default();
        config.consent.default_active = false;
        let h = Harness::with_config(config).await;
        let (_, record) = h.create_record(b"F").await;

        let denied = h
            .doctor
            .capabilities
            .request_access(record.owner, record.record_id, Role::Read, TTL)
            .await;
        assert!(matches!(denied, Err(CapabilityError::ConsentDenied { .. })));

        h.set_consent(&record, true).await;
        let allowed = h
            .doctor
            .capabilities
            .request_access(record.owner, record.record_id, Role::Read, TTL)
            .await;
        assert!(allowed.is_ok());
    }

    #[tokio::test]
    async fn test_consent_toggle_by_someone_else_never_lands() {
        let h = Harness::new().await;
        let (_, record) = h.create_record(b"F").await;

        let refused = h
            .doctor
            .commitments
            .toggle_consent(&record.record_id, h.doctor.session.identity(), false)
            .await;
        assert!(matches!(refused, Err(CommitmentError::Consent(_))));

        // Claiming the owner's identity only yields a transaction the
        // doctor's wallet cannot send.
        let tx = h
            .doctor
            .commitments
            .toggle_consent(&record.record_id, record.owner, false)
            .await
            .unwrap();
        let sent = h.doctor.send(&tx).await;
        assert!(matches!(sent, Err(BrokerError::BroadcastError(_))));

        let requested = h
            .doctor
            .capabilities
            .request_access(record.owner, record.record_id, Role::Read, TTL)
            .await;
        assert!(requested.is_ok());
    }

    #[tokio::test]
    async fn test_rejected_wallet_prompt_leaves_record_unanchored() {
        let h = Harness::new().await;
        let commitments = &h.patient.commitments;
        let mut lifecycle = commitments
            .start_record(h.patient.session.identity(), h.patient_key)
            .unwrap();
        commitments.encrypt(&mut lifecycle, b"F").await.unwrap();
        commitments.anchor(&mut lifecycle).await.unwrap();
        commitments.commit(&mut lifecycle).await.unwrap();
        let (record, tx) = commitments.persist(&mut lifecycle).await.unwrap();

        h.patient.wallet.set_rejecting(true);
        assert_eq!(h.patient.send(&tx).await, Err(BrokerError::UserRejected));
        assert!(matches!(
            commitments.confirm(&mut lifecycle).await,
            Err(CommitmentError::NotConfirmed(_))
        ));
        assert_eq!(lifecycle.phase(), Phase::Persisted);

        h.patient.wallet.set_rejecting(false);
        h.patient.send(&tx).await.unwrap();
        assert_eq!(commitments.confirm(&mut lifecycle).await.unwrap(), record);
    }

    #[tokio::test]
    async fn test_custodian_originates_record_patient_cosigns() {
        let h = Harness::new().await;
        let admin = h
            .deployment
            .login(h.deployment.new_wallet(), SessionRole::Admin, None);
        let patient_id = h.patient.session.identity();

        let commitments = &admin.commitments;
        let mut lifecycle = commitments.start_record(patient_id, h.patient_key).unwrap();
        commitments.encrypt(&mut lifecycle, b"intake form").await.unwrap();
        commitments.anchor(&mut lifecycle).await.unwrap();
        commitments.commit(&mut lifecycle).await.unwrap();
        let (_, tx) = commitments.persist(&mut lifecycle).await.unwrap();

        // Only the patient's wallet can broadcast the anchoring transaction
        assert!(matches!(admin.send(&tx).await, Err(BrokerError::BroadcastError(_))));
        h.patient.send(&tx).await.unwrap();

        let record = commitments.confirm(&mut lifecycle).await.unwrap();
        assert_eq!(lifecycle.phase(), Phase::Anchored);
        assert_eq!(record.owner, patient_id);

        let blob = h.deployment.store().get(&record.content_address).unwrap();
        assert_eq!(h.patient.open_own(&blob).unwrap(), b"intake form");
    }

    // =========================================================================
    // SCENARIO C: REDACTION
    // =========================================================================

    #[tokio::test]
    async fn test_redaction_keeps_hash_and_swaps_content() {
        let h = Harness::new().await;
        let (mut lifecycle, original) = h.create_record(b"F").await;

        let (_, tx) = h.patient.commitments.redact(&mut lifecycle, b"F2").await.unwrap();
        h.patient.send(&tx).await.unwrap();
        let redacted = h.patient.commitments.confirm(&mut lifecycle).await.unwrap();

        assert_eq!(redacted.record_id, original.record_id);
        assert_eq!(redacted.commitment_hash, original.commitment_hash);
        assert_ne!(redacted.content_address, original.content_address);

        let blob = h.deployment.store().get(&redacted.content_address).unwrap();
        assert_eq!(h.patient.open_own(&blob).unwrap(), b"F2");
    }

    #[tokio::test]
    async fn test_redaction_with_wrong_trapdoor_is_refused() {
        let h = Harness::new().await;
        let (mut lifecycle, original) = h.create_record(b"F").await;
        let wrong = TrapdoorKey::from_bytes([0x42; 32]);

        let err = h
            .patient
            .commitments
            .redact_with_key(&mut lifecycle, b"F2", &wrong)
            .await
            .unwrap_err();
        assert!(matches!(err, CommitmentError::RedactionError(_)));

        let on_ledger = h.deployment.ledger().record(&original.record_id).await.unwrap();
        assert_eq!(on_ledger.content_address, original.content_address);
        assert_eq!(on_ledger.commitment_hash, original.commitment_hash);
    }

    #[tokio::test]
    async fn test_refused_redaction_retries_commit_on_same_lifecycle() {
        let h = Harness::new().await;
        let (mut lifecycle, original) = h.create_record(b"F").await;
        let commitments = &h.patient.commitments;
        let wrong = TrapdoorKey::from_bytes([0x42; 32]);
        commitments
            .redact_with_key(&mut lifecycle, b"F2", &wrong)
            .await
            .unwrap_err();

        // The upload survives; only the trapdoor commit is redone
        assert_eq!(lifecycle.phase(), Phase::Uploaded);
        let staged = lifecycle.staged_content_address().cloned().unwrap();

        let trapdoor = h
            .patient
            .session
            .trapdoor_for(&original.owner)
            .cloned()
            .unwrap();
        commitments.commit_redaction(&mut lifecycle, &trapdoor).await.unwrap();
        let (_, tx) = commitments.persist(&mut lifecycle).await.unwrap();
        h.patient.send(&tx).await.unwrap();
        let redacted = commitments.confirm(&mut lifecycle).await.unwrap();

        assert_eq!(redacted.content_address, staged);
        assert_eq!(redacted.commitment_hash, original.commitment_hash);
        assert_eq!(lifecycle.phase(), Phase::Anchored);
    }

    #[tokio::test]
    async fn test_doctor_cannot_redact_patient_record() {
        let h = Harness::new().await;
        let (_, original) = h.create_record(b"F").await;

        let mut lifecycle = h
            .doctor
            .commitments
            .open_record(&original.record_id, h.patient_key)
            .await
            .unwrap();
        let err = h
            .doctor
            .commitments
            .redact(&mut lifecycle, b"F2")
            .await
            .unwrap_err();
        assert_eq!(
            err,
            CommitmentError::ForeignRecord {
                record_id: original.record_id
            }
        );
    }
}
