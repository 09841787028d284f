//! Custody conservation invariant checker.
//!
//! The ledger stages every mutation and checks the staged totals with
//! [`SupplyConservation::verify`] before applying them:
//! ```text
//! held == Σ(funded) - Σ(released)
//! ```
//!
//! The full agreement with `Σ(required_amount of ACTIVE plans)` needs a walk
//! over the plan table and runs only in `EscrowLedger::verify_invariants`.

use openescrow_types::{checked_add, Amount, EscrowError, Result};

/// Running totals of value entering and leaving custody.
#[derive(Debug, Clone)]
pub struct SupplyConservation {
    /// Total funded since genesis.
    funded: Amount,
    /// Total released since genesis.
    released: Amount,
}

impl SupplyConservation {
    /// Create a new tracker with nothing in custody.
    #[must_use]
    pub fn new() -> Self {
        Self {
            funded: 0,
            released: 0,
        }
    }

    /// Record value entering custody.
    ///
    /// # Errors
    /// Returns `BalanceOverflow` if the lifetime total overflows.
    pub fn record_funding(&mut self, amount: Amount) -> Result<()> {
        self.funded = checked_add(self.funded, amount)?;
        Ok(())
    }

    /// Record value leaving custody.
    ///
    /// # Errors
    /// Returns `BalanceOverflow` if the lifetime total overflows.
    pub fn record_release(&mut self, amount: Amount) -> Result<()> {
        self.released = checked_add(self.released, amount)?;
        Ok(())
    }

    /// Expected custody: funded - released.
    ///
    /// # Errors
    /// Returns `SupplyInvariantViolation` if more was released than funded.
    pub fn expected_custody(&self) -> Result<Amount> {
        self.funded
            .checked_sub(self.released)
            .ok_or_else(|| EscrowError::SupplyInvariantViolation {
                reason: format!(
                    "released {} exceeds funded {}",
                    self.released, self.funded
                ),
            })
    }

    /// Verify that the actual held value matches funded - released.
    ///
    /// # Errors
    /// Returns [`EscrowError::SupplyInvariantViolation`] if actual ≠ expected.
    pub fn verify(&self, actual_held: Amount) -> Result<()> {
        let expected = self.expected_custody()?;
        if actual_held != expected {
            return Err(EscrowError::SupplyInvariantViolation {
                reason: format!(
                    "held {actual_held} != expected {expected} \
                     (funded={}, released={})",
                    self.funded, self.released,
                ),
            });
        }
        Ok(())
    }

    /// Lifetime funded total.
    #[must_use]
    pub fn total_funded(&self) -> Amount {
        self.funded
    }

    /// Lifetime released total.
    #[must_use]
    pub fn total_released(&self) -> Amount {
        self.released
    }
}

impl Default for SupplyConservation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_custody_is_zero() {
        let sc = SupplyConservation::new();
        assert_eq!(sc.expected_custody().unwrap(), 0);
        assert!(sc.verify(0).is_ok());
    }

    #[test]
    fn funding_increases_expected() {
        let mut sc = SupplyConservation::new();
        sc.record_funding(1000).unwrap();
        sc.record_funding(500).unwrap();
        assert_eq!(sc.expected_custody().unwrap(), 1500);
        assert_eq!(sc.total_funded(), 1500);
    }

    #[test]
    fn release_decreases_expected() {
        let mut sc = SupplyConservation::new();
        sc.record_funding(1000).unwrap();
        sc.record_release(300).unwrap();
        assert_eq!(sc.expected_custody().unwrap(), 700);
        assert_eq!(sc.total_released(), 300);
    }

    #[test]
    fn verify_passes_when_balanced() {
        let mut sc = SupplyConservation::new();
        sc.record_funding(10).unwrap();
        sc.record_release(3).unwrap();
        assert!(sc.verify(7).is_ok());
    }

    #[test]
    fn verify_fails_when_imbalanced() {
        let mut sc = SupplyConservation::new();
        sc.record_funding(10).unwrap();
        let err = sc.verify(11).unwrap_err();
        assert!(matches!(err, EscrowError::SupplyInvariantViolation { .. }));
    }

    #[test]
    fn over_release_is_violation() {
        let mut sc = SupplyConservation::new();
        sc.record_funding(1).unwrap();
        sc.record_release(2).unwrap();
        let err = sc.verify(0).unwrap_err();
        assert!(matches!(err, EscrowError::SupplyInvariantViolation { .. }));
    }
}
