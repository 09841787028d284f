//! # EscrowPlan: a single three-party escrow agreement
//!
//! ## State Machine
//!
//! ```text
//!   ┌──────┐ create  ┌─────────┐  fund   ┌────────┐ release ┌──────────┐
//!   │ NONE ├────────▶│ PENDING ├────────▶│ ACTIVE ├────────▶│ COMPLETE │
//!   └──────┘ arbiter └─────────┘  payer  └────────┘ arbiter └──────────┘
//! ```
//!
//! Transitions are **monotonic**: each edge is taken at most once and no
//! plan ever moves backwards. `COMPLETE` is terminal.
//!
//! The numeric state codes (0-3) are part of the event format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountId, Amount, EscrowError, PlanId};

/// The lifecycle state of an escrow plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum PlanState {
    /// No plan occupies this id.
    None = 0,
    /// Registered by the arbiter, awaiting the payer's deposit.
    Pending = 1,
    /// Funded. The ledger holds `required_amount` for this plan.
    Active = 2,
    /// Released to the recipient. **Terminal.**
    Complete = 3,
}

impl PlanState {
    /// Numeric code carried in notifications.
    #[must_use]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Can a plan in this state move to `target`?
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::None, Self::Pending)
                | (Self::Pending, Self::Active)
                | (Self::Active, Self::Complete)
        )
    }

    /// Whether no further transitions are possible.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete)
    }
}

impl From<PlanState> for u8 {
    fn from(state: PlanState) -> Self {
        state.code()
    }
}

impl TryFrom<u8> for PlanState {
    type Error = EscrowError;

    fn try_from(code: u8) -> crate::Result<Self> {
        match code {
            0 => Ok(Self::None),
            1 => Ok(Self::Pending),
            2 => Ok(Self::Active),
            3 => Ok(Self::Complete),
            other => Err(EscrowError::Serialization(format!(
                "unknown plan state code {other}"
            ))),
        }
    }
}

impl std::fmt::Display for PlanState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "NONE"),
            Self::Pending => write!(f, "PENDING"),
            Self::Active => write!(f, "ACTIVE"),
            Self::Complete => write!(f, "COMPLETE"),
        }
    }
}

/// One escrow agreement: who pays, who receives, and how much.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscrowPlan {
    /// Arbiter-supplied unique key.
    pub id: PlanId,
    /// Descriptive label. Not unique.
    pub name: String,
    /// The only identity allowed to fund this plan.
    pub payer: AccountId,
    /// The identity credited on release.
    pub recipient: AccountId,
    /// Exact deposit required. Always > 0.
    pub required_amount: Amount,
    /// Current lifecycle state.
    pub state: PlanState,
    /// When the arbiter registered the plan.
    pub created_at: DateTime<Utc>,
    /// When the payer's deposit was accepted.
    pub funded_at: Option<DateTime<Utc>>,
    /// When the funds went to the recipient.
    pub released_at: Option<DateTime<Utc>>,
}

impl EscrowPlan {
    /// A freshly registered plan in `PENDING`.
    #[must_use]
    pub fn new(
        id: PlanId,
        name: impl Into<String>,
        payer: AccountId,
        recipient: AccountId,
        required_amount: Amount,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            payer,
            recipient,
            required_amount,
            state: PlanState::Pending,
            created_at: Utc::now(),
            funded_at: None,
            released_at: None,
        }
    }

    /// Whether this plan's funds are currently held by the ledger.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == PlanState::Active
    }

    /// Amount the ledger currently holds on behalf of this plan.
    #[must_use]
    pub fn held_amount(&self) -> Amount {
        if self.is_active() {
            self.required_amount
        } else {
            0
        }
    }

    /// Attempt to transition to ACTIVE.
    ///
    /// # Errors
    /// Returns `InvalidState` if the plan is not PENDING.
    pub fn mark_funded(&mut self) -> crate::Result<()> {
        self.transition(PlanState::Active)?;
        self.funded_at = Some(Utc::now());
        Ok(())
    }

    /// Attempt to transition to COMPLETE.
    ///
    /// # Errors
    /// Returns `InvalidState` if the plan is not ACTIVE.
    pub fn mark_complete(&mut self) -> crate::Result<()> {
        self.transition(PlanState::Complete)?;
        self.released_at = Some(Utc::now());
        Ok(())
    }

    fn transition(&mut self, target: PlanState) -> crate::Result<()> {
        if !self.state.can_transition_to(target) {
            return Err(EscrowError::InvalidState {
                id: self.id,
                expected: source_state(target),
                actual: self.state,
            });
        }
        self.state = target;
        Ok(())
    }
}

/// The only state from which `target` is reachable.
fn source_state(target: PlanState) -> PlanState {
    match target {
        PlanState::None | PlanState::Pending => PlanState::None,
        PlanState::Active => PlanState::Pending,
        PlanState::Complete => PlanState::Active,
    }
}

/// Dummy plan for testing. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl EscrowPlan {
    /// A PENDING plan with a random id and fresh payer/recipient.
    pub fn dummy(required_amount: Amount) -> Self {
        Self::new(
            PlanId(rand::random::<[u8; 32]>()),
            "dummy plan",
            AccountId::new(),
            AccountId::new(),
            required_amount,
        )
    }
}
