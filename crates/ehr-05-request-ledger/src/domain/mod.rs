//! # Domain Layer
//!
//! Pure reconciliation of registry-reported and locally known requests.

use ehr_04_capability::{effective_status, AccessRequest, RequestId, RequestStatus};
use shared_types::{Address, Timestamp};
use std::collections::HashSet;
use thiserror::Error;

/// Which side of a request the listing is for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ViewerRole {
    Requester,
    Owner,
}

impl ViewerRole {
    /// Whether `identity` holds this role in `request`.
    pub fn matches(self, request: &AccessRequest, identity: Address) -> bool {
        match self {
            ViewerRole::Requester => request.requester() == identity,
            ViewerRole::Owner => request.owner() == identity,
        }
    }
}

/// Where a listed entry's status comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntrySource {
    /// Reported by the registry.
    Registry,
    /// Submitted from this session, not yet listed by the registry.
    LocalUnconfirmed,
}

/// One row of a listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerEntry {
    pub request: AccessRequest,
    /// Status to display and drive transitions from.
    pub status: RequestStatus,
    pub source: EntrySource,
}

impl LedgerEntry {
    pub fn id(&self) -> RequestId {
        self.request.id
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Request directory failed: {0}")]
    Directory(String),

    /// The registry listed a request the identity is not a party to.
    #[error("Registry listed foreign request {0}")]
    ForeignEntry(RequestId),
}

/// Rank of how much a status grants. Display may only move down this order.
pub fn permissiveness(status: RequestStatus) -> u8 {
    match status {
        RequestStatus::Approved => 2,
        RequestStatus::Pending => 1,
        RequestStatus::Rejected | RequestStatus::Expired | RequestStatus::Cancelled => 0,
    }
}

/// Merge a registry listing with local submissions.
///
/// Registry entries win over local copies with the same id; local stored
/// status is never used to raise a registry status.
pub fn reconcile(
    remote: Vec<AccessRequest>,
    local: Vec<AccessRequest>,
    identity: Address,
    role: ViewerRole,
    now: Timestamp,
) -> Result<Vec<LedgerEntry>, LedgerError> {
    let mut seen = HashSet::with_capacity(remote.len());
    let mut entries = Vec::with_capacity(remote.len() + local.len());

    for request in remote {
        if !role.matches(&request, identity) {
            return Err(LedgerError::ForeignEntry(request.id));
        }
        if !seen.insert(request.id) {
            continue;
        }
        entries.push(LedgerEntry {
            status: effective_status(&request, now),
            request,
            source: EntrySource::Registry,
        });
    }

    for request in local {
        if !role.matches(&request, identity) || seen.contains(&request.id) {
            continue;
        }
        seen.insert(request.id);
        entries.push(LedgerEntry {
            status: effective_status(&request, now),
            request,
            source: EntrySource::LocalUnconfirmed,
        });
    }

    entries.sort_by(|a, b| {
        b.request
            .request
            .timestamp
            .cmp(&a.request.request.timestamp)
            .then_with(|| a.request.id.cmp(&b.request.id))
    });
    Ok(entries)
}
