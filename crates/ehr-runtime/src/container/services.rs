//! Deployment and per-session participant wiring.

use crate::adapters::{ChameleonCommitter, EciesEncryptor, InMemoryContentStore, InMemoryLedger, LocalWallet};
use crate::container::config::{ConfigError, EhrConfig};
use ehr_01_transaction_broker::{BrokerError, TransactionBroker, TransactionBrokerApi};
use ehr_02_consent_gate::ConsentGate;
use ehr_03_commitment::{CommitmentManager, CommitmentPorts};
use ehr_04_capability::{CapabilityPorts, CapabilityProtocol};
use ehr_05_request_ledger::RequestLedger;
use ehr_telemetry::log_event;
use shared_crypto::{ecies, CryptoError, Secp256k1KeyPair};
use shared_types::{
    address_to_hex, Hash, NetworkContext, PublicKeyBytes, RawTransaction, RecordKeys, Session,
    SessionRole, TimeSource, TrapdoorKey,
};
use std::sync::Arc;
use uuid::Uuid;

const COMPONENT: &str = "runtime";

/// Fresh record keypair: the public half encrypts and commits, the secret
/// half is the chameleon trapdoor and opens sealed blobs.
pub fn generate_record_keys() -> RecordKeys {
    let pair = Secp256k1KeyPair::generate();
    RecordKeys {
        public_key: PublicKeyBytes(pair.public_key()),
        trapdoor: TrapdoorKey::from_bytes(pair.to_bytes()),
    }
}

/// Collaborators shared by every session of one deployment.
pub struct Deployment {
    config: EhrConfig,
    network: NetworkContext,
    clock: Arc<dyn TimeSource>,
    store: Arc<InMemoryContentStore>,
    ledger: Arc<InMemoryLedger>,
}

impl Deployment {
    pub fn new(config: EhrConfig, clock: Arc<dyn TimeSource>) -> Result<Self, ConfigError> {
        config.validate()?;
        let network = config.network_context()?;
        let store = Arc::new(InMemoryContentStore::new());
        let ledger = Arc::new(InMemoryLedger::new(
            &network,
            config.consent.default_active,
            clock.clone(),
            store.clone(),
        ));
        log_event!(
            info,
            COMPONENT,
            "Deployment ready",
            chain_id = network.chain_id,
            verifying_contract = %address_to_hex(&network.verifying_authority)
        );
        Ok(Self {
            config,
            network,
            clock,
            store,
            ledger,
        })
    }

    pub fn config(&self) -> &EhrConfig {
        &self.config
    }

    pub fn clock(&self) -> Arc<dyn TimeSource> {
        self.clock.clone()
    }

    pub fn store(&self) -> Arc<InMemoryContentStore> {
        self.store.clone()
    }

    pub fn ledger(&self) -> Arc<InMemoryLedger> {
        self.ledger.clone()
    }

    /// A wallet with a fresh account, connected to this deployment's ledger.
    pub fn new_wallet(&self) -> Arc<LocalWallet> {
        Arc::new(LocalWallet::generate(self.ledger.clone()))
    }

    /// Start a session for the wallet's account and wire its components.
    pub fn login(
        &self,
        wallet: Arc<LocalWallet>,
        role: SessionRole,
        record_keys: Option<RecordKeys>,
    ) -> Participant {
        use ehr_04_capability::TypedDataSigner;

        let mut session = Session::login(wallet.address(), role, self.network.clone(), self.clock.now());
        if let Some(keys) = record_keys {
            session = session.with_record_keys(keys);
        }
        let session = Arc::new(session);

        let consent = Arc::new(ConsentGate::new(self.ledger.clone()));
        let commitments = CommitmentManager::new(
            session.clone(),
            CommitmentPorts {
                encryptor: Arc::new(EciesEncryptor),
                store: self.store.clone(),
                scheme: Arc::new(ChameleonCommitter),
                registry: self.ledger.clone(),
                consent: consent.clone(),
            },
        );
        let capabilities = Arc::new(CapabilityProtocol::new(
            session.clone(),
            CapabilityPorts {
                signer: wallet.clone(),
                registry: self.ledger.clone(),
                consent: consent.clone(),
                clock: self.clock.clone(),
            },
        ));
        let requests = RequestLedger::new(self.ledger.clone(), self.clock.clone())
            .with_local(capabilities.clone());
        let broker = TransactionBroker::new(wallet.clone(), self.config.broker_config());

        log_event!(
            info,
            COMPONENT,
            "Session started",
            session_id = %session.id(),
            identity = %address_to_hex(&session.identity()),
            role = ?role
        );
        Participant {
            session,
            wallet,
            broker,
            consent,
            commitments,
            capabilities,
            requests,
        }
    }
}

/// One logged-in user with their protocol components.
pub struct Participant {
    pub session: Arc<Session>,
    pub wallet: Arc<LocalWallet>,
    pub broker: TransactionBroker<Arc<LocalWallet>>,
    pub consent: Arc<ConsentGate<Arc<InMemoryLedger>>>,
    pub commitments: CommitmentManager,
    pub capabilities: Arc<CapabilityProtocol>,
    pub requests: RequestLedger,
}

impl Participant {
    /// Normalize and broadcast a collaborator transaction through the wallet.
    pub async fn send(&self, tx: &RawTransaction) -> Result<Hash, BrokerError> {
        self.broker.submit_raw(tx).await
    }

    /// Open a blob sealed to this session's record key.
    pub fn open_own(&self, blob: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let trapdoor = self
            .session
            .trapdoor_for(&self.session.identity())
            .ok_or_else(|| CryptoError::InvalidInput("session has no record keys".into()))?;
        ecies::open(trapdoor.expose_secret(), blob)
    }

    /// End the session. Returns its id once no component holds it any more.
    pub fn logout(self) -> Option<Uuid> {
        let Participant {
            session,
            wallet,
            broker,
            consent,
            commitments,
            capabilities,
            requests,
        } = self;
        drop((requests, capabilities, commitments, consent, broker, wallet));
        let id = Arc::try_unwrap(session).ok().map(Session::logout);
        if let Some(id) = id {
            log_event!(info, COMPONENT, "Session ended", session_id = %id);
        }
        id
    }
}
