//! # Request State Machine
//!
//! Status as stored only ever changes through a counterparty action. Expiry
//! is layered on top at read time by [`effective_status`], so it is
//! re-evaluated on every read and never needs a writer.

use super::entities::{AccessRequest, RequestStatus};
use super::errors::CapabilityError;
use shared_types::{Address, Timestamp};

/// `now > timestamp + ttl`. Monotonic in `now`.
pub fn is_expired(timestamp: Timestamp, ttl: u64, now: Timestamp) -> bool {
    now > timestamp.saturating_add(ttl)
}

/// Stored status with time-based demotion applied.
///
/// Only `Pending` and `Approved` decay; terminal states are returned as-is.
pub fn effective_status(request: &AccessRequest, now: Timestamp) -> RequestStatus {
    match request.status {
        RequestStatus::Pending | RequestStatus::Approved
            if is_expired(request.request.timestamp, request.request.ttl, now) =>
        {
            RequestStatus::Expired
        }
        status => status,
    }
}

/// Guard for `approve` / `reject`: caller is the owner, request still pending.
pub fn ensure_owner_decision(
    request: &AccessRequest,
    caller: Address,
    now: Timestamp,
) -> Result<(), CapabilityError> {
    if caller != request.owner() {
        return Err(CapabilityError::Forbidden("only the record owner may decide"));
    }
    ensure_pending(request, now)
}

/// Guard for `cancel`: caller is the requester, request still pending.
pub fn ensure_requester_cancel(
    request: &AccessRequest,
    caller: Address,
    now: Timestamp,
) -> Result<(), CapabilityError> {
    if caller != request.requester() {
        return Err(CapabilityError::Forbidden("only the requester may cancel"));
    }
    ensure_pending(request, now)
}

fn ensure_pending(request: &AccessRequest, now: Timestamp) -> Result<(), CapabilityError> {
    match effective_status(request, now) {
        RequestStatus::Pending => Ok(()),
        current => Err(CapabilityError::InvalidState { current }),
    }
}
