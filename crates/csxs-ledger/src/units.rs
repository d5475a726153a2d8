//! Payment units and token arithmetic
//!
//! Payments handed to the ledger are counted in whole currency units (ether).
//! Transport layers that receive sub-unit amounts (wei) convert them here
//! first; fractional amounts are rejected instead of truncated.

use crate::errors::{LedgerError, Result};

/// Sub-units per whole currency unit
pub const WEI_PER_ETHER: u128 = 1_000_000_000_000_000_000;

/// Convert a sub-unit payment into whole units.
///
/// # Errors
///
/// `InvalidArgument` if `wei` is not an exact multiple of [`WEI_PER_ETHER`]
/// or the whole-unit amount does not fit in `u64`.
pub fn wei_to_whole_units(wei: u128) -> Result<u64> {
    if wei % WEI_PER_ETHER != 0 {
        return Err(LedgerError::invalid(format!(
            "payment of {wei} wei is not a whole number of ether"
        )));
    }
    u64::try_from(wei / WEI_PER_ETHER)
        .map_err(|_| LedgerError::invalid(format!("payment of {wei} wei is too large")))
}

/// Tokens issued for `payment` whole units at `rate`.
pub fn tokens_for_payment(rate: u64, payment: u64) -> Result<u64> {
    rate.checked_mul(payment).ok_or_else(|| {
        LedgerError::invalid(format!("token amount overflows: {rate} * {payment}"))
    })
}
