//! Error types for the OpenEscrow ledger.
//!
//! All errors use the `ESC_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Access control errors
//! - 2xx: Plan / state machine errors
//! - 3xx: Value errors
//! - 8xx: Safety invariant errors
//! - 9xx: General / internal errors
//!
//! Every error is returned before any state is touched: a failed call leaves
//! the ledger and all wallets exactly as they were.

use thiserror::Error;

use crate::{AccountId, Amount, PlanId, PlanState};

/// The role a privileged call requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// The ledger's arbiter ("lawyer").
    Arbiter,
    /// The payer recorded on the targeted plan.
    Payer,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Arbiter => write!(f, "arbiter"),
            Self::Payer => write!(f, "payer"),
        }
    }
}

/// Central error enum for all OpenEscrow operations.
#[derive(Debug, Error)]
pub enum EscrowError {
    // =================================================================
    // Access Control Errors (1xx)
    // =================================================================
    /// The caller does not hold the role this call requires.
    #[error("ESC_ERR_100: Unauthorized: only {role} may call, got {caller}")]
    Unauthorized { caller: AccountId, role: Role },

    // =================================================================
    // Plan Errors (2xx)
    // =================================================================
    /// A plan already occupies this id.
    #[error("ESC_ERR_200: Plan already exists: {0}")]
    AlreadyExists(PlanId),

    /// The plan is not in the state the requested transition starts from.
    /// Unknown plans report `actual = NONE`.
    #[error("ESC_ERR_201: Invalid state for plan {id}: expected {expected}, got {actual}")]
    InvalidState {
        id: PlanId,
        expected: PlanState,
        actual: PlanState,
    },

    /// The plan definition failed validation (empty name, bad id, etc.).
    #[error("ESC_ERR_202: Invalid plan: {reason}")]
    InvalidPlan { reason: String },

    // =================================================================
    // Value Errors (3xx)
    // =================================================================
    /// The value supplied does not match the plan's required amount, or the
    /// required amount itself is zero.
    #[error("ESC_ERR_300: Invalid amount: expected {expected}, got {provided}")]
    InvalidAmount { expected: Amount, provided: Amount },

    /// The caller's wallet can't cover the attached value.
    #[error("ESC_ERR_301: Insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: Amount, available: Amount },

    /// A balance addition would exceed the representable range.
    #[error("ESC_ERR_302: Balance overflow")]
    BalanceOverflow,

    // =================================================================
    // Safety Errors (8xx)
    // =================================================================
    /// Held value no longer matches the funded plans. Critical safety alert.
    #[error("ESC_ERR_800: Supply invariant violation: {reason}")]
    SupplyInvariantViolation { reason: String },

    /// A record in the event log doesn't hash to its stored chain hash.
    #[error("ESC_ERR_801: Event chain broken at sequence {sequence}")]
    EventChainBroken { sequence: u64 },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("ESC_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("ESC_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config file, missing fields, etc.).
    #[error("ESC_ERR_902: Configuration error: {0}")]
    Configuration(String),

    /// I/O error (disk, network).
    #[error("ESC_ERR_903: I/O error: {0}")]
    Io(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, EscrowError>;

impl From<std::io::Error> for EscrowError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for EscrowError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
