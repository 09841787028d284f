//! Notifications emitted by the ledger.
//!
//! Exactly one event is emitted per successful mutating call and none on
//! failure. Observers learn about state changes only through these.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountId, Amount, EscrowPlan, PlanId, PlanState};

/// A state-advancing notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EscrowEvent {
    /// The arbiter registered a plan (`NONE → PENDING`).
    PlanCreated {
        id: PlanId,
        name: String,
        payer: AccountId,
        recipient: AccountId,
        required_amount: Amount,
        state: PlanState,
    },
    /// The payer deposited the required amount (`PENDING → ACTIVE`).
    Funded {
        id: PlanId,
        payer: AccountId,
        amount: Amount,
        state: PlanState,
    },
    /// The arbiter released the held amount (`ACTIVE → COMPLETE`).
    Released {
        id: PlanId,
        recipient: AccountId,
        amount: Amount,
        state: PlanState,
    },
}

impl EscrowEvent {
    #[must_use]
    pub fn plan_created(plan: &EscrowPlan) -> Self {
        Self::PlanCreated {
            id: plan.id,
            name: plan.name.clone(),
            payer: plan.payer,
            recipient: plan.recipient,
            required_amount: plan.required_amount,
            state: plan.state,
        }
    }

    #[must_use]
    pub fn funded(plan: &EscrowPlan) -> Self {
        Self::Funded {
            id: plan.id,
            payer: plan.payer,
            amount: plan.required_amount,
            state: plan.state,
        }
    }

    #[must_use]
    pub fn released(plan: &EscrowPlan) -> Self {
        Self::Released {
            id: plan.id,
            recipient: plan.recipient,
            amount: plan.required_amount,
            state: plan.state,
        }
    }

    /// The plan this event refers to.
    #[must_use]
    pub fn plan_id(&self) -> PlanId {
        match self {
            Self::PlanCreated { id, .. } | Self::Funded { id, .. } | Self::Released { id, .. } => {
                *id
            }
        }
    }

    /// The plan state after the transition.
    #[must_use]
    pub fn state(&self) -> PlanState {
        match self {
            Self::PlanCreated { state, .. }
            | Self::Funded { state, .. }
            | Self::Released { state, .. } => *state,
        }
    }

    /// Event name as observers see it.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PlanCreated { .. } => "PlanCreated",
            Self::Funded { .. } => "Funded",
            Self::Released { .. } => "Released",
        }
    }
}

impl std::fmt::Display for EscrowEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({}, {})", self.kind(), self.plan_id(), self.state())
    }
}

/// An event with its position in the ledger's append-only log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    /// Zero-based position in the log.
    pub sequence: u64,
    /// The notification itself.
    pub event: EscrowEvent,
    /// When the event was appended.
    pub emitted_at: DateTime<Utc>,
    /// SHA-256 over the previous record's hash, the sequence, and the event.
    pub chain_hash: [u8; 32],
}
