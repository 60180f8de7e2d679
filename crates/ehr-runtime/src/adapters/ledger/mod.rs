//! # In-Memory Ledger
//!
//! Plays the on-chain registry: identities, records with their consent flag,
//! and access requests. Every state-changing call only *queues* an operation
//! and hands back an unsigned transaction whose `data` is the operation id.
//! The operation is applied when that transaction is broadcast through
//! [`InMemoryLedger::execute`], after its preconditions are checked again.
//!
//! ## Authoritative checks
//!
//! - Record creation: the `(cid, witness)` pair opens the commitment under
//!   the owner's registered key.
//! - Redaction: the caller's old opening is the anchored one, and the new
//!   opening collides with the same commitment.
//! - Access requests: signature, owner, consent, expiry and nonce, evaluated
//!   with the ledger's own clock.

mod access;
mod records;

use crate::adapters::content_store::InMemoryContentStore;
use ehr_01_transaction_broker::CanonicalTransaction;
use ehr_03_commitment::{RecordDescriptor, UpdateRecord};
use ehr_04_capability::{
    effective_status, AccessRequest, BearerToken, ReplayKey, RequestId, RequestStatus,
    TypedDataDomain,
};
use ehr_telemetry::{log_event, log_record_event, log_request_event};
use parking_lot::Mutex;
use shared_crypto::{chameleon, hmac_sha256, CryptoError};
use shared_crypto::hashing::keccak256_concat;
use shared_types::{
    Address, ContentAddress, Hash, NetworkContext, PublicKeyBytes, Quantity, RawTransaction,
    RecordId, ReplayGuard, TimeSource, Witness,
};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

const COMPONENT: &str = "ledger";

/// Why a broadcast transaction did not apply.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerRevert {
    #[error("Transaction is not addressed to the registry")]
    UnknownContract,

    #[error("Unknown or already applied operation")]
    UnknownOperation,

    #[error("Operation must be sent by {expected}")]
    SenderMismatch { expected: String },

    #[error("Reverted: {0}")]
    Reverted(String),
}

#[derive(Debug, Clone)]
struct LedgerRecord {
    descriptor: RecordDescriptor,
    consent_active: bool,
}

#[derive(Debug, Clone)]
enum Operation {
    RegisterIdentity {
        identity: Address,
        public_key: PublicKeyBytes,
    },
    StoreRecord(RecordDescriptor),
    UpdateRecord(UpdateRecord),
    ToggleConsent {
        record_id: RecordId,
        active: bool,
    },
    Approve(RequestId),
    Reject(RequestId),
    Cancel(RequestId),
}

#[derive(Debug, Clone)]
struct PendingOperation {
    sender: Address,
    operation: Operation,
}

#[derive(Debug, Default)]
struct LedgerState {
    identities: HashMap<Address, PublicKeyBytes>,
    records: HashMap<RecordId, LedgerRecord>,
    requests: HashMap<RequestId, AccessRequest>,
    pending: HashMap<Hash, PendingOperation>,
    queued: u64,
    applied: u64,
}

/// Reference ledger registry.
pub struct InMemoryLedger {
    contract: Address,
    chain_id: u64,
    domain: TypedDataDomain,
    default_consent: bool,
    token_secret: [u8; 32],
    clock: Arc<dyn TimeSource>,
    store: Arc<InMemoryContentStore>,
    replay: ReplayGuard<ReplayKey>,
    state: Mutex<LedgerState>,
}

impl InMemoryLedger {
    pub fn new(
        network: &NetworkContext,
        default_consent: bool,
        clock: Arc<dyn TimeSource>,
        store: Arc<InMemoryContentStore>,
    ) -> Self {
        Self {
            contract: network.verifying_authority,
            chain_id: network.chain_id,
            domain: TypedDataDomain::from_network(network),
            default_consent,
            token_secret: rand::random(),
            clock,
            store,
            replay: ReplayGuard::new(),
            state: Mutex::new(LedgerState::default()),
        }
    }

    /// Registry address transactions are sent to.
    pub fn contract(&self) -> Address {
        self.contract
    }

    /// Number of queued operations not yet broadcast.
    pub fn pending_operations(&self) -> usize {
        self.state.lock().pending.len()
    }

    /// Apply the operation named by a broadcast transaction.
    pub fn execute(&self, sender: Address, tx: &CanonicalTransaction) -> Result<Hash, LedgerRevert> {
        if tx.to != self.contract {
            return Err(LedgerRevert::UnknownContract);
        }
        let op_id: Hash = tx
            .data
            .as_slice()
            .try_into()
            .map_err(|_| LedgerRevert::UnknownOperation)?;

        let mut state = self.state.lock();
        let pending = state
            .pending
            .remove(&op_id)
            .ok_or(LedgerRevert::UnknownOperation)?;
        if pending.sender != sender {
            let expected = shared_types::address_to_hex(&pending.sender);
            state.pending.insert(op_id, pending);
            return Err(LedgerRevert::SenderMismatch { expected });
        }

        if let Err(reason) = self.apply(&mut state, &pending.operation) {
            log_event!(warn, COMPONENT, "Operation reverted", reason = %reason);
            state.pending.insert(op_id, pending);
            return Err(LedgerRevert::Reverted(reason));
        }

        state.applied += 1;
        Ok(keccak256_concat(&[&op_id, &state.applied.to_be_bytes()]))
    }

    fn queue(&self, state: &mut LedgerState, sender: Address, operation: Operation) -> RawTransaction {
        state.queued += 1;
        let op_id = keccak256_concat(&[b"ehr-op", &self.contract, &state.queued.to_be_bytes()]);
        state.pending.insert(op_id, PendingOperation { sender, operation });

        let mut tx = RawTransaction::call(sender, self.contract, op_id.to_vec());
        tx.chain_id = Some(Quantity::from(self.chain_id));
        tx
    }

    fn apply(&self, state: &mut LedgerState, operation: &Operation) -> Result<(), String> {
        let now = self.clock.now();
        match operation {
            Operation::RegisterIdentity {
                identity,
                public_key,
            } => {
                state.identities.insert(*identity, *public_key);
            }
            Operation::StoreRecord(descriptor) => {
                self.check_store(state, descriptor)?;
                state.records.insert(
                    descriptor.record_id,
                    LedgerRecord {
                        descriptor: descriptor.clone(),
                        consent_active: self.default_consent,
                    },
                );
                log_record_event!(info, COMPONENT, "Record anchored", descriptor.record_id);
            }
            Operation::UpdateRecord(update) => {
                self.check_update(state, update)?;
                if let Some(record) = state.records.get_mut(&update.record_id) {
                    record.descriptor.content_address = update.new_content_address.clone();
                    record.descriptor.witness = update.new_witness;
                }
                log_record_event!(info, COMPONENT, "Record redacted", update.record_id);
            }
            Operation::ToggleConsent { record_id, active } => {
                let record = state
                    .records
                    .get_mut(record_id)
                    .ok_or_else(|| format!("unknown record {record_id}"))?;
                record.consent_active = *active;
            }
            Operation::Approve(id) => {
                let record_id = pending_request(state, id, now)?.record_id();
                if !state.records.get(&record_id).is_some_and(|r| r.consent_active) {
                    return Err("consent not active".into());
                }
                set_status(state, id, RequestStatus::Approved);
                log_request_event!(info, COMPONENT, "Request approved", id);
            }
            Operation::Reject(id) => {
                pending_request(state, id, now)?;
                set_status(state, id, RequestStatus::Rejected);
            }
            Operation::Cancel(id) => {
                pending_request(state, id, now)?;
                set_status(state, id, RequestStatus::Cancelled);
            }
        }
        Ok(())
    }

    fn check_store(&self, state: &LedgerState, descriptor: &RecordDescriptor) -> Result<(), String> {
        if state.records.contains_key(&descriptor.record_id) {
            return Err("record already anchored".into());
        }
        let public_key = registered_key(state, &descriptor.owner)?;
        if !opens(&public_key, &descriptor.content_address, &descriptor.witness, &descriptor.commitment_hash.0) {
            return Err("commitment does not open under the owner's key".into());
        }
        Ok(())
    }

    fn check_update(&self, state: &LedgerState, update: &UpdateRecord) -> Result<(), String> {
        let record = state
            .records
            .get(&update.record_id)
            .ok_or_else(|| format!("unknown record {}", update.record_id))?;
        let current = &record.descriptor;
        if current.owner != update.owner {
            return Err("caller is not the record owner".into());
        }
        if current.commitment_hash != update.commitment_hash {
            return Err("commitment hash mismatch".into());
        }
        if current.content_address != update.old_content_address || current.witness != update.old_witness {
            return Err("old opening is not the anchored one".into());
        }
        let public_key = registered_key(state, &current.owner)?;
        if !opens(&public_key, &update.new_content_address, &update.new_witness, &current.commitment_hash.0) {
            return Err("redaction proof does not collide".into());
        }
        Ok(())
    }

    fn bearer_for(&self, id: &RequestId) -> Result<BearerToken, CryptoError> {
        hmac_sha256(&self.token_secret, &id.0).map(BearerToken)
    }
}

/// `keccak256(cid || lowercase hex owner)`.
pub fn derive_record_id(content_address: &ContentAddress, owner: &Address) -> RecordId {
    RecordId(keccak256_concat(&[
        content_address.as_str().as_bytes(),
        hex::encode(owner).as_bytes(),
    ]))
}

fn opens(public_key: &PublicKeyBytes, content_address: &ContentAddress, witness: &Witness, hash: &Hash) -> bool {
    let message = chameleon::encode_message(content_address.as_str(), public_key.as_bytes());
    chameleon::verify(&message, &witness.0, public_key.as_bytes(), hash)
}

fn registered_key(state: &LedgerState, identity: &Address) -> Result<PublicKeyBytes, String> {
    state
        .identities
        .get(identity)
        .copied()
        .ok_or_else(|| "owner has no registered public key".to_string())
}

fn pending_request<'a>(state: &'a LedgerState, id: &RequestId, now: u64) -> Result<&'a AccessRequest, String> {
    let request = state
        .requests
        .get(id)
        .ok_or_else(|| format!("unknown request {id}"))?;
    match effective_status(request, now) {
        RequestStatus::Pending => Ok(request),
        other => Err(format!("request is {other}")),
    }
}

fn set_status(state: &mut LedgerState, id: &RequestId, status: RequestStatus) {
    if let Some(request) = state.requests.get_mut(id) {
        request.status = status;
    }
}
