//! # Replay Protection
//!
//! A replay guard remembers every key it has admitted. `check_and_insert`
//! is atomic: of two concurrent callers presenting the same key, exactly one
//! wins.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let guard = ReplayGuard::new();
//!
//! // First attempt - key is fresh
//! assert!(guard.check_and_insert((requester, owner, record_id, nonce)));
//!
//! // Second attempt - replay detected!
//! assert!(!guard.check_and_insert((requester, owner, record_id, nonce)));
//! ```

use parking_lot::RwLock;
use std::collections::HashSet;
use std::hash::Hash;

/// Thread-safe set of admitted replay keys.
///
/// Access-request nonces never expire: a request whose ttl has elapsed is
/// still not re-admissible under the same nonce.
#[derive(Debug)]
pub struct ReplayGuard<K: Eq + Hash> {
    seen: RwLock<HashSet<K>>,
}

impl<K: Eq + Hash> Default for ReplayGuard<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash> ReplayGuard<K> {
    pub fn new() -> Self {
        Self {
            seen: RwLock::new(HashSet::new()),
        }
    }

    /// Returns `true` if the key is fresh (and records it), `false` on replay.
    pub fn check_and_insert(&self, key: K) -> bool {
        self.seen.write().insert(key)
    }

    /// Forget a key whose admission was rolled back.
    pub fn release(&self, key: &K) -> bool {
        self.seen.write().remove(key)
    }

    /// Whether a key has already been admitted, without recording it.
    pub fn contains(&self, key: &K) -> bool {
        self.seen.read().contains(key)
    }

    pub fn len(&self) -> usize {
        self.seen.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.read().is_empty()
    }
}
