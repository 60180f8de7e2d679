//! # Access Flows
//!
//! Signed requests, owner decisions and capability tokens across the
//! capability component, the request ledger and the ledger registry.
//!
//! - Scenario B: approval issues a token bounded by `timestamp + ttl`;
//!   past that instant the request reads as expired and the token fails.
//! - Scenario D: a cancelled request can no longer be approved.

#[cfg(test)]
mod tests {
    use super::super::harness::{Harness, T0, TTL};
    use ehr_03_commitment::RecordDescriptor;
    use ehr_04_capability::{
        AccessRequest, CapabilityApi, CapabilityError, RequestStatus, Role,
    };
    use ehr_05_request_ledger::{EntrySource, RequestLedgerApi, ViewerRole};

    async fn requested(h: &Harness) -> (RecordDescriptor, AccessRequest) {
        let (_, record) = h.create_record(b"F").await;
        let (request, tx) = h
            .doctor
            .capabilities
            .request_access(record.owner, record.record_id, Role::Read, TTL)
            .await
            .unwrap();
        assert!(tx.is_none());
        (record, request)
    }

    async fn status_seen_by_doctor(h: &Harness, request: &AccessRequest) -> RequestStatus {
        h.doctor
            .requests
            .list(h.doctor.session.identity(), ViewerRole::Requester)
            .await
            .unwrap()
            .into_iter()
            .find(|entry| entry.id() == request.id)
            .map(|entry| entry.status)
            .unwrap()
    }

    // =========================================================================
    // SCENARIO B: APPROVAL AND EXPIRY
    // =========================================================================

    #[tokio::test]
    async fn test_signed_request_lands_pending_for_both_sides() {
        let h = Harness::new().await;
        let (record, request) = requested(&h).await;

        assert_eq!(request.status, RequestStatus::Pending);
        assert_eq!(request.request.timestamp, T0);
        assert_eq!(request.record_id(), record.record_id);
        assert_eq!(request.id, h.doctor.capabilities.domain().request_id(&request.request));

        let inbox = h
            .patient
            .requests
            .list(record.owner, ViewerRole::Owner)
            .await
            .unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].status, RequestStatus::Pending);
        assert_eq!(inbox[0].source, EntrySource::Registry);
    }

    #[tokio::test]
    async fn test_approval_issues_token_bounded_by_ttl() {
        let h = Harness::new().await;
        let (record, request) = requested(&h).await;

        let (token, tx) = h.patient.capabilities.approve(&request.id).await.unwrap();
        h.patient.send(&tx).await.unwrap();

        assert_eq!(token.request_id, request.id);
        assert_eq!(token.record_id, record.record_id);
        assert_eq!(token.expiry, T0 + TTL);
        assert_eq!(status_seen_by_doctor(&h, &request).await, RequestStatus::Approved);

        let blob = h.doctor.capabilities.view(&token).await.unwrap();
        let stored = h.deployment.store().get(&record.content_address).unwrap();
        assert_eq!(blob, stored);
    }

    #[tokio::test]
    async fn test_token_unusable_until_approval_confirmed() {
        let h = Harness::new().await;
        let (_, request) = requested(&h).await;

        let (token, _unsent) = h.patient.capabilities.approve(&request.id).await.unwrap();

        assert_eq!(
            h.doctor.capabilities.view(&token).await,
            Err(CapabilityError::TokenInvalid)
        );
        assert_eq!(status_seen_by_doctor(&h, &request).await, RequestStatus::Pending);
    }

    #[tokio::test]
    async fn test_approved_request_expires_after_ttl() {
        let h = Harness::new().await;
        let (_, request) = requested(&h).await;
        let (token, tx) = h.patient.capabilities.approve(&request.id).await.unwrap();
        h.patient.send(&tx).await.unwrap();

        // Inclusive bound: still valid at exactly timestamp + ttl
        h.clock.set(T0 + TTL);
        assert!(h.doctor.capabilities.view(&token).await.is_ok());

        h.clock.advance(1);
        assert_eq!(status_seen_by_doctor(&h, &request).await, RequestStatus::Expired);
        assert_eq!(
            h.doctor.capabilities.view(&token).await,
            Err(CapabilityError::TokenExpired)
        );
    }

    #[tokio::test]
    async fn test_pending_request_cannot_be_approved_after_expiry() {
        let h = Harness::new().await;
        let (_, request) = requested(&h).await;
        h.clock.advance(TTL + 1);

        let err = h.patient.capabilities.approve(&request.id).await.unwrap_err();
        assert_eq!(
            err,
            CapabilityError::InvalidState {
                current: RequestStatus::Expired
            }
        );
    }

    #[tokio::test]
    async fn test_resubmitting_a_signed_request_is_refused() {
        let h = Harness::new().await;
        let (_, record) = h.create_record(b"F").await;
        let capabilities = &h.doctor.capabilities;
        let unsigned = capabilities
            .build_request(record.owner, record.record_id, Role::Read, TTL)
            .unwrap();
        let signed = capabilities.sign(unsigned).await.unwrap();

        capabilities.submit(signed.clone()).await.unwrap();
        assert_eq!(
            capabilities.submit(signed).await.unwrap_err(),
            CapabilityError::NonceReused
        );
    }

    #[tokio::test]
    async fn test_reused_nonce_refused_for_otherwise_valid_request() {
        let h = Harness::new().await;
        let (_, record) = h.create_record(b"F").await;
        let capabilities = &h.doctor.capabilities;
        let first = capabilities
            .build_request(record.owner, record.record_id, Role::Read, TTL)
            .unwrap();
        let mut second = first.clone();
        second.ttl = TTL * 2;

        capabilities.submit(capabilities.sign(first).await.unwrap()).await.unwrap();
        let resigned = capabilities.sign(second).await.unwrap();
        assert_eq!(
            capabilities.submit(resigned).await.unwrap_err(),
            CapabilityError::NonceReused
        );
        assert_eq!(capabilities.local_requests().len(), 1);
    }

    #[tokio::test]
    async fn test_only_the_owner_decides() {
        let h = Harness::new().await;
        let (_, request) = requested(&h).await;

        assert!(matches!(
            h.doctor.capabilities.approve(&request.id).await,
            Err(CapabilityError::Forbidden(_))
        ));
        assert!(matches!(
            h.patient.capabilities.cancel(&request.id).await,
            Err(CapabilityError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_rejection_is_terminal() {
        let h = Harness::new().await;
        let (_, request) = requested(&h).await;

        let tx = h.patient.capabilities.reject(&request.id).await.unwrap();
        h.patient.send(&tx).await.unwrap();

        assert_eq!(status_seen_by_doctor(&h, &request).await, RequestStatus::Rejected);
        assert_eq!(
            h.patient.capabilities.approve(&request.id).await.unwrap_err(),
            CapabilityError::InvalidState {
                current: RequestStatus::Rejected
            }
        );
    }

    // =========================================================================
    // SCENARIO D: CANCELLATION
    // =========================================================================

    #[tokio::test]
    async fn test_cancelled_request_cannot_be_approved() {
        let h = Harness::new().await;
        let (_, request) = requested(&h).await;

        let tx = h.doctor.capabilities.cancel(&request.id).await.unwrap();
        h.doctor.send(&tx).await.unwrap();
        assert_eq!(status_seen_by_doctor(&h, &request).await, RequestStatus::Cancelled);

        let err = h.patient.capabilities.approve(&request.id).await.unwrap_err();
        assert_eq!(
            err,
            CapabilityError::InvalidState {
                current: RequestStatus::Cancelled
            }
        );
    }

    #[tokio::test]
    async fn test_approval_queued_before_cancellation_reverts() {
        let h = Harness::new().await;
        let (_, request) = requested(&h).await;

        let (_, approval) = h.patient.capabilities.approve(&request.id).await.unwrap();
        let cancel = h.doctor.capabilities.cancel(&request.id).await.unwrap();
        h.doctor.send(&cancel).await.unwrap();

        assert!(h.patient.send(&approval).await.is_err());
        assert_eq!(status_seen_by_doctor(&h, &request).await, RequestStatus::Cancelled);
    }
}
