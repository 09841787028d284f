//! # openescrow-types
//!
//! Shared types, errors, and configuration for the **OpenEscrow** ledger.
//!
//! This crate is the leaf dependency of the workspace. It defines:
//!
//! - **Identifiers**: [`AccountId`], [`PlanId`]
//! - **Plan model**: [`EscrowPlan`], [`PlanState`]
//! - **Event model**: [`EscrowEvent`], [`EventRecord`]
//! - **Amounts**: [`Amount`], [`checked_add`]
//! - **Configuration**: [`LedgerConfig`]
//! - **Errors**: [`EscrowError`] with `ESC_ERR_` prefix codes, [`Role`]
//! - **Constants**: system-wide limits and defaults

pub mod balance;
pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod ids;
pub mod plan;

pub use balance::*;
pub use config::*;
pub use error::*;
pub use event::*;
pub use ids::*;
pub use plan::*;

// Constants are accessed via `openescrow_types::constants::FOO`
// (not re-exported to avoid name collisions).
