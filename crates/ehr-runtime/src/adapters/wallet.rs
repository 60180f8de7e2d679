//! Local wallet: typed-data signer and transaction broadcaster in one.

use super::ledger::InMemoryLedger;
use ehr_01_transaction_broker::{CanonicalTransaction, WalletBroadcaster, WalletError};
use ehr_04_capability::{SignerError, TypedDataDomain, TypedDataSigner, UnsignedAccessRequest};
use shared_crypto::{RecoverableSignature, Secp256k1KeyPair};
use shared_types::{Address, Hash};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A wallet holding one secp256k1 account and connected to the ledger.
///
/// `set_rejecting(true)` makes every prompt come back declined.
pub struct LocalWallet {
    key: Secp256k1KeyPair,
    ledger: Arc<InMemoryLedger>,
    rejecting: AtomicBool,
}

impl LocalWallet {
    pub fn new(key: Secp256k1KeyPair, ledger: Arc<InMemoryLedger>) -> Self {
        Self {
            key,
            ledger,
            rejecting: AtomicBool::new(false),
        }
    }

    pub fn generate(ledger: Arc<InMemoryLedger>) -> Self {
        Self::new(Secp256k1KeyPair::generate(), ledger)
    }

    pub fn set_rejecting(&self, rejecting: bool) {
        self.rejecting.store(rejecting, Ordering::SeqCst);
    }

    fn declined(&self) -> bool {
        self.rejecting.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl TypedDataSigner for LocalWallet {
    fn address(&self) -> Address {
        self.key.address()
    }

    async fn sign_typed(
        &self,
        domain: &TypedDataDomain,
        request: &UnsignedAccessRequest,
    ) -> Result<RecoverableSignature, SignerError> {
        if self.declined() {
            return Err(SignerError::Rejected);
        }
        self.key
            .sign_prehash(&domain.digest(request))
            .map_err(|e| SignerError::Failed(e.to_string()))
    }
}

#[async_trait::async_trait]
impl WalletBroadcaster for LocalWallet {
    async fn send_transaction(&self, tx: &CanonicalTransaction) -> Result<Hash, WalletError> {
        if self.declined() {
            return Err(WalletError::Rejected);
        }
        if tx.from.is_some_and(|from| from != self.key.address()) {
            return Err(WalletError::Failed("descriptor names another sender".into()));
        }
        self.ledger
            .execute(self.key.address(), tx)
            .map_err(|e| WalletError::Failed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryContentStore;
    use ehr_04_capability::{verify_signed, Role, SignedAccessRequest};
    use shared_types::{ManualClock, NetworkContext, Quantity, RecordId, U256};

    fn ledger() -> Arc<InMemoryLedger> {
        let network = NetworkContext {
            chain_id: 1337,
            verifying_authority: [0x5F; 20],
            protocol_name: "AccessRegistry".into(),
            protocol_version: "1".into(),
        };
        Arc::new(InMemoryLedger::new(
            &network,
            true,
            Arc::new(ManualClock::new(0)),
            Arc::new(InMemoryContentStore::new()),
        ))
    }

    #[tokio::test]
    async fn test_typed_signature_verifies() {
        let wallet = LocalWallet::generate(ledger());
        let domain = TypedDataDomain {
            name: "AccessRegistry".into(),
            version: "1".into(),
            chain_id: 1337,
            verifying_contract: [0x5F; 20],
        };
        let request = UnsignedAccessRequest {
            requester: wallet.address(),
            owner: [0xAA; 20],
            record_id: RecordId([1; 32]),
            role: Role::Read,
            timestamp: 5,
            nonce: U256::from(5u64),
            ttl: 10,
        };
        let signature = wallet.sign_typed(&domain, &request).await.unwrap();
        assert!(verify_signed(&domain, &SignedAccessRequest { request, signature }).is_ok());
    }

    #[tokio::test]
    async fn test_rejecting_wallet_declines_everything() {
        let ledger = ledger();
        let wallet = LocalWallet::generate(ledger.clone());
        wallet.set_rejecting(true);
        let tx = CanonicalTransaction {
            from: None,
            to: ledger.contract(),
            value: Quantity::ZERO,
            gas: None,
            fee: ehr_01_transaction_broker::FeeModel::WalletEstimated,
            nonce: None,
            chain_id: None,
            data: vec![0; 32],
        };
        assert_eq!(wallet.send_transaction(&tx).await, Err(WalletError::Rejected));
    }

    #[tokio::test]
    async fn test_unknown_operation_is_a_broadcast_failure() {
        let ledger = ledger();
        let wallet = LocalWallet::generate(ledger.clone());
        let tx = CanonicalTransaction {
            from: None,
            to: ledger.contract(),
            value: Quantity::ZERO,
            gas: None,
            fee: ehr_01_transaction_broker::FeeModel::WalletEstimated,
            nonce: None,
            chain_id: None,
            data: vec![0xAB; 32],
        };
        assert!(matches!(
            wallet.send_transaction(&tx).await,
            Err(WalletError::Failed(_))
        ));
    }
}
