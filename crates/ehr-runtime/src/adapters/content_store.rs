//! In-memory content-addressed blob store.

use ehr_03_commitment::{CollaboratorError, ContentStore, EncryptedBlob};
use parking_lot::RwLock;
use shared_crypto::sha256;
use shared_types::ContentAddress;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// Content store addressing blobs by `"bafy" + hex(sha256(blob))`.
///
/// Uploading the same bytes twice yields the same address and stores once.
#[derive(Debug)]
pub struct InMemoryContentStore {
    blobs: RwLock<HashMap<ContentAddress, Vec<u8>>>,
    available: AtomicBool,
}

impl Default for InMemoryContentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self {
            blobs: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Simulate a gateway outage.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.blobs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.read().is_empty()
    }

    pub fn address_of(bytes: &[u8]) -> Result<ContentAddress, CollaboratorError> {
        ContentAddress::parse(format!("bafy{}", hex::encode(sha256(bytes))))
            .map_err(|e| CollaboratorError::Malformed(e.to_string()))
    }

    /// Raw bytes by address.
    pub fn get(&self, content_address: &ContentAddress) -> Option<Vec<u8>> {
        self.blobs.read().get(content_address).cloned()
    }

    fn ensure_available(&self) -> Result<(), CollaboratorError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(CollaboratorError::Unavailable("content store unreachable".into()))
        }
    }
}

#[async_trait::async_trait]
impl ContentStore for InMemoryContentStore {
    async fn upload(&self, blob: &EncryptedBlob) -> Result<ContentAddress, CollaboratorError> {
        self.ensure_available()?;
        let address = Self::address_of(blob.as_bytes())?;
        self.blobs
            .write()
            .entry(address.clone())
            .or_insert_with(|| blob.as_bytes().to_vec());
        Ok(address)
    }

    async fn fetch(&self, content_address: &ContentAddress) -> Result<EncryptedBlob, CollaboratorError> {
        self.ensure_available()?;
        self.get(content_address)
            .map(EncryptedBlob::new)
            .ok_or(CollaboratorError::NotFound)
    }
}
