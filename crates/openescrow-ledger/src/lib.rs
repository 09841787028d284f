//! # openescrow-ledger
//!
//! The three-party escrow ledger: an arbiter registers plans, a payer funds
//! them with an exact deposit, and the arbiter releases the held value to
//! the recipient.
//!
//! ## Architecture
//!
//! 1. **EscrowLedger**: plan table + state machine + access control
//! 2. **BalanceManager**: the calling environment's account balances
//! 3. **SupplyConservation**: lifetime funded/released totals for the
//!    custody invariant
//! 4. **EventLog**: append-only, hash-chained notifications
//!
//! ## Plan Flow
//!
//! ```text
//! arbiter: create_plan() → PENDING
//! payer:   fund(exact amount) → wallet debit → ACTIVE  (held += amount)
//! arbiter: release() → recipient credit → COMPLETE    (held -= amount)
//! ```
//!
//! At every observation, `balance_of()` equals the sum of required amounts
//! over ACTIVE plans.

pub mod balance_manager;
pub mod event_log;
pub mod ledger;
pub mod supply_conservation;

pub use balance_manager::BalanceManager;
pub use event_log::EventLog;
pub use ledger::EscrowLedger;
pub use supply_conservation::SupplyConservation;
