//! CSXS Token Ledger
//!
//! An in-memory, authoritative ledger for a fixed-supply fungible token:
//! - the whole supply is minted to the ledger's own pool account at construction
//! - a single owner may change the purchase rate or hand ownership on
//! - anyone may buy tokens for a beneficiary, moving `rate * payment` tokens
//!   from the pool to that beneficiary
//!
//! Every committed state change yields exactly one [`LedgerEvent`], returned
//! to the caller, journaled, and delivered to subscribed observers.

pub mod address;
pub mod config;
pub mod errors;
pub mod events;
pub mod ledger;
pub mod units;

pub use address::Address;
pub use config::{LedgerConfig, DEFAULT_RATE, DEFAULT_TOTAL_SUPPLY};
pub use errors::{ErrorKind, LedgerError, Result};
pub use events::{EventRecord, LedgerEvent, LedgerObserver};
pub use ledger::{SupplyAudit, TokenLedger, TokenMetadata};
pub use units::{tokens_for_payment, wei_to_whole_units, WEI_PER_ETHER};
