//! # Nonce Source
//!
//! Nonces are millisecond timestamps bumped past the last issued value, so
//! two requests built within the same millisecond still differ.

use shared_types::{Timestamp, U256};
use std::sync::atomic::{AtomicU64, Ordering};

/// Strictly increasing nonce generator.
#[derive(Debug, Default)]
pub struct NonceSource {
    last: AtomicU64,
}

impl NonceSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// `max(now, last + 1)`.
    pub fn next(&self, now: Timestamp) -> U256 {
        let mut current = self.last.load(Ordering::SeqCst);
        loop {
            let candidate = now.max(current.saturating_add(1));
            match self
                .last
                .compare_exchange(current, candidate, Ordering::SeqCst, Ordering::SeqCst)
            {
                Ok(_) => return U256::from(candidate),
                Err(observed) => current = observed,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_millisecond_still_unique() {
        let source = NonceSource::new();
        let a = source.next(1_000);
        let b = source.next(1_000);
        let c = source.next(999);
        assert!(a < b && b < c);
    }

    #[test]
    fn test_follows_clock_when_it_advances() {
        let source = NonceSource::new();
        source.next(5);
        assert_eq!(source.next(1_000), U256::from(1_000u64));
    }
}
