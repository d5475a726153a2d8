//! Ledger events
//!
//! Every successful state-changing call produces exactly one [`LedgerEvent`].
//! The ledger journals it as an [`EventRecord`] and hands the record to any
//! subscribed [`LedgerObserver`] once the state change has committed.

use crate::address::Address;
use serde::{Deserialize, Serialize};

/// Auditable record of a committed state change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum LedgerEvent {
    /// Governance ownership moved to a new account
    OwnerTransferred {
        /// Owner before the call
        previous_owner: Address,
        /// Owner after the call
        new_owner: Address,
    },

    /// Purchase rate changed by the owner
    RateChanged {
        /// Rate before the call
        previous_rate: u64,
        /// Rate after the call
        new_rate: u64,
    },

    /// Tokens moved from the pool to a beneficiary
    TokenPurchase {
        /// Account that paid
        purchaser: Address,
        /// Account credited with the tokens
        beneficiary: Address,
        /// Tokens moved out of the pool
        tokens: u64,
        /// Rate in effect at call time
        buy_rate: u64,
    },
}

impl LedgerEvent {
    /// Stable event name
    pub fn name(&self) -> &'static str {
        match self {
            LedgerEvent::OwnerTransferred { .. } => "OwnerTransferred",
            LedgerEvent::RateChanged { .. } => "RateChanged",
            LedgerEvent::TokenPurchase { .. } => "TokenPurchase",
        }
    }
}

/// Journaled event with its position in the ledger history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// 1-based, strictly increasing
    pub sequence: u64,
    /// The event itself
    pub event: LedgerEvent,
}

/// Receives events after they commit.
///
/// Called outside the ledger lock, so implementations may read the ledger.
pub trait LedgerObserver: Send + Sync {
    /// Handle one committed event
    fn on_event(&self, record: &EventRecord);
}

impl<F> LedgerObserver for F
where
    F: Fn(&EventRecord) + Send + Sync,
{
    fn on_event(&self, record: &EventRecord) {
        self(record);
    }
}
