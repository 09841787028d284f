//! Monetary amount type.
//!
//! A single asset is supported, so amounts are plain unsigned integers in
//! the asset's smallest unit (e.g. wei). Every addition in the ledger goes
//! through [`checked_add`] so an overflow surfaces as an error instead of
//! wrapping.

use crate::{EscrowError, Result};

/// Amount of the ledger's single asset, in base units.
pub type Amount = u128;

/// Add two amounts, failing with `BalanceOverflow` instead of wrapping.
///
/// # Errors
/// Returns [`EscrowError::BalanceOverflow`] if the sum exceeds `Amount::MAX`.
pub fn checked_add(a: Amount, b: Amount) -> Result<Amount> {
    a.checked_add(b).ok_or(EscrowError::BalanceOverflow)
}
