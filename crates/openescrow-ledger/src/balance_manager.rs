//! Account balances of the calling environment.
//!
//! The ledger never creates money. The value attached to `fund` comes out of
//! the payer's wallet here, and `release` pays the recipient's wallet here.
//! All mutations are atomic: either the full operation succeeds or the
//! balance is unchanged.

use std::collections::HashMap;

use openescrow_types::{checked_add, AccountId, Amount, EscrowError, Result};

/// Per-account balances of the single asset.
pub struct BalanceManager {
    balances: HashMap<AccountId, Amount>,
}

impl BalanceManager {
    /// Create a new empty balance manager.
    #[must_use]
    pub fn new() -> Self {
        Self {
            balances: HashMap::new(),
        }
    }

    /// Deposit external funds into an account.
    ///
    /// # Errors
    /// Returns `BalanceOverflow` if the balance would exceed `Amount::MAX`.
    pub fn deposit(&mut self, account: AccountId, amount: Amount) -> Result<()> {
        self.credit(account, amount)
    }

    /// Remove `amount` from an account. Used to take attached value.
    ///
    /// # Errors
    /// Returns `InsufficientBalance` if the account holds less than `amount`.
    pub fn debit(&mut self, account: AccountId, amount: Amount) -> Result<()> {
        let available = self.balance(account);
        if available < amount {
            return Err(EscrowError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        if amount > 0 {
            self.balances.insert(account, available - amount);
        }
        Ok(())
    }

    /// Add `amount` to an account. Used to pay out released value.
    ///
    /// # Errors
    /// Returns `BalanceOverflow` if the balance would exceed `Amount::MAX`.
    pub fn credit(&mut self, account: AccountId, amount: Amount) -> Result<()> {
        let next = checked_add(self.balance(account), amount)?;
        self.balances.insert(account, next);
        Ok(())
    }

    /// Current balance of an account (zero if never seen).
    #[must_use]
    pub fn balance(&self, account: AccountId) -> Amount {
        self.balances.get(&account).copied().unwrap_or(0)
    }

    /// Sum of all account balances.
    ///
    /// # Errors
    /// Returns `BalanceOverflow` if the balances together exceed `Amount::MAX`.
    pub fn total_supply(&self) -> Result<Amount> {
        self.balances
            .values()
            .try_fold(0, |total, &balance| checked_add(total, balance))
    }
}

impl Default for BalanceManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deposit_increases_balance() {
        let mut bm = BalanceManager::new();
        let user = AccountId::new();
        bm.deposit(user, 1000).unwrap();
        assert_eq!(bm.balance(user), 1000);
    }

    #[test]
    fn debit_reduces_balance() {
        let mut bm = BalanceManager::new();
        let user = AccountId::new();
        bm.deposit(user, 1000).unwrap();
        bm.debit(user, 400).unwrap();
        assert_eq!(bm.balance(user), 600);
    }

    #[test]
    fn debit_insufficient_fails() {
        let mut bm = BalanceManager::new();
        let user = AccountId::new();
        bm.deposit(user, 100).unwrap();
        let err = bm.debit(user, 200).unwrap_err();
        assert!(matches!(
            err,
            EscrowError::InsufficientBalance {
                needed: 200,
                available: 100
            }
        ));
        // Balance unchanged
        assert_eq!(bm.balance(user), 100);
    }

    #[test]
    fn zero_debit_on_unknown_account_ok() {
        let mut bm = BalanceManager::new();
        bm.debit(AccountId::new(), 0).unwrap();
        assert_eq!(bm.total_supply().unwrap(), 0);
    }

    #[test]
    fn credit_overflow_leaves_balance() {
        let mut bm = BalanceManager::new();
        let user = AccountId::new();
        bm.credit(user, Amount::MAX).unwrap();
        let err = bm.credit(user, 1).unwrap_err();
        assert!(matches!(err, EscrowError::BalanceOverflow));
        assert_eq!(bm.balance(user), Amount::MAX);
    }

    #[test]
    fn total_supply_overflow_is_error() {
        let mut bm = BalanceManager::new();
        bm.deposit(AccountId::new(), Amount::MAX).unwrap();
        bm.deposit(AccountId::new(), 1).unwrap();
        let err = bm.total_supply().unwrap_err();
        assert!(matches!(err, EscrowError::BalanceOverflow));
    }

    #[test]
    fn total_supply_sums_all_accounts() {
        let mut bm = BalanceManager::new();
        let u1 = AccountId::new();
        let u2 = AccountId::new();
        bm.deposit(u1, 1000).unwrap();
        bm.deposit(u2, 500).unwrap();
        bm.debit(u1, 300).unwrap();
        assert_eq!(bm.total_supply().unwrap(), 1200);
    }

    #[test]
    fn nonexistent_balance_is_zero() {
        let bm = BalanceManager::new();
        assert_eq!(bm.balance(AccountId::new()), 0);
    }
}
