//! Tracking of the deployer's next transaction nonce.

use crate::{address::StacksAddress, rpc::LedgerClient};

/// Local belief of the next nonce to use.
///
/// Seeded once from the ledger, then advanced after every accepted submission
/// and overwritten whenever the ledger reports the value it expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceTracker {
    next: u64,
}

impl SequenceTracker {
    pub fn new(start: u64) -> Self {
        Self { next: start }
    }

    /// Seed the tracker from the ledger.
    ///
    /// A failed query is not fatal: the tracker starts at 0 and the first
    /// broadcast's nonce conflict supplies the real value.
    pub async fn initialize<L: LedgerClient>(ledger: &L, address: &StacksAddress) -> Self {
        match ledger.account_nonce(address).await {
            Ok(nonce) => {
                tracing::info!(address = %address, nonce, "Fetched starting nonce");
                Self::new(nonce)
            }
            Err(err) => {
                tracing::warn!(
                    address = %address,
                    error = %err,
                    "Failed to fetch account nonce, starting from 0 and relying on nonce correction"
                );
                Self::new(0)
            }
        }
    }

    pub fn current(&self) -> u64 {
        self.next
    }

    /// Move past a nonce the ledger accepted.
    pub fn advance(&mut self) {
        self.next += 1;
    }

    /// Adopt the nonce the ledger says it expects.
    pub fn correct(&mut self, expected: u64) {
        tracing::debug!(from = self.next, to = expected, "Correcting nonce");
        self.next = expected;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        address::TESTNET_SINGLESIG_VERSION,
        error::{DeployError, Result},
        rpc::BroadcastOutcome,
        transaction::SignedTransaction,
    };

    struct FixedLedger(Option<u64>);

    impl LedgerClient for FixedLedger {
        async fn account_nonce(&self, _address: &StacksAddress) -> Result<u64> {
            self.0
                .ok_or_else(|| DeployError::AccountQueryFailed("connection refused".to_string()))
        }

        async fn broadcast(&self, _tx: &SignedTransaction) -> Result<BroadcastOutcome> {
            unreachable!("the tracker never broadcasts")
        }
    }

    fn address() -> StacksAddress {
        StacksAddress::from_hash160(TESTNET_SINGLESIG_VERSION, &[7u8; 20])
    }

    #[tokio::test]
    async fn test_initialize_from_ledger() {
        let tracker = SequenceTracker::initialize(&FixedLedger(Some(42)), &address()).await;
        assert_eq!(tracker.current(), 42);
    }

    #[tokio::test]
    async fn test_initialize_falls_back_to_zero() {
        let tracker = SequenceTracker::initialize(&FixedLedger(None), &address()).await;
        assert_eq!(tracker.current(), 0);
    }

    #[test]
    fn test_advance_and_correct() {
        let mut tracker = SequenceTracker::new(3);
        tracker.advance();
        assert_eq!(tracker.current(), 4);

        tracker.correct(10);
        assert_eq!(tracker.current(), 10);

        // Corrections are unconditional, even backwards.
        tracker.correct(2);
        assert_eq!(tracker.current(), 2);
    }
}
