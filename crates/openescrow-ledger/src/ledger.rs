//! Escrow ledger: the plan state machine and its guards.
//!
//! The ledger registers plans on the arbiter's behalf, takes the payer's
//! exact deposit into custody, and pays it out to the recipient when the
//! arbiter releases it.
//!
//! ## Check order
//!
//! | call          | 1st            | 2nd             | 3rd             | 4th                   |
//! |---------------|----------------|-----------------|-----------------|-----------------------|
//! | `create_plan` | caller=arbiter | id unused       | amount > 0      | name valid            |
//! | `fund`        | plan PENDING   | caller=payer    | value == amount | payer wallet covers it |
//! | `release`     | caller=arbiter | plan ACTIVE     |                 |                       |
//!
//! Arbiter-only calls check identity first since the arbiter is known
//! without a lookup. `fund` must look the plan up to learn its payer, so
//! the state check comes first there.
//!
//! Every check, including arithmetic overflow, runs before the first
//! mutation. A call first stages its outcome (new plan record, custody
//! totals, sealed event) and only then debits or credits a wallet and
//! applies the staged state, neither of which can fail at that point.
//! A rejected call moves no value and emits nothing.

use std::collections::HashMap;

use openescrow_types::{
    checked_add, constants, AccountId, Amount, EscrowError, EscrowEvent, EscrowPlan,
    EventRecord, LedgerConfig, PlanId, PlanState, Result, Role,
};

use crate::balance_manager::BalanceManager;
use crate::event_log::EventLog;
use crate::supply_conservation::SupplyConservation;

/// The escrow ledger: plan table, custody counter, and notification log.
pub struct EscrowLedger {
    /// All plans ever created, by id.
    plans: HashMap<PlanId, EscrowPlan>,
    /// Arbiter and limits. Immutable after construction.
    config: LedgerConfig,
    /// Value currently held on behalf of ACTIVE plans.
    held: Amount,
    /// Lifetime funded / released totals.
    supply: SupplyConservation,
    /// Every notification emitted.
    events: EventLog,
}

impl EscrowLedger {
    /// Create a ledger with default limits for the given arbiter.
    #[must_use]
    pub fn new(arbiter: AccountId) -> Self {
        Self::build(LedgerConfig::new(arbiter))
    }

    /// Create a ledger from an explicit configuration.
    ///
    /// # Errors
    /// Returns `Configuration` if the config fails validation.
    pub fn with_config(config: LedgerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: LedgerConfig) -> Self {
        tracing::info!(
            engine = constants::ENGINE_NAME,
            version = constants::VERSION,
            arbiter = %config.arbiter,
            max_name_len = config.max_name_len,
            verify_invariants = config.verify_invariants,
            "Escrow ledger initialised"
        );
        Self {
            plans: HashMap::new(),
            config,
            held: 0,
            supply: SupplyConservation::new(),
            events: EventLog::new(),
        }
    }

    // -----------------------------------------------------------------
    // Mutating entry points
    // -----------------------------------------------------------------

    /// Register a new plan in PENDING. Arbiter only.
    ///
    /// # Errors
    /// - `Unauthorized` if `caller` is not the arbiter
    /// - `AlreadyExists` if a plan already occupies `id`
    /// - `InvalidAmount` if `required_amount` is zero
    /// - `InvalidPlan` if `name` is blank or longer than `max_name_len`
    pub fn create_plan(
        &mut self,
        caller: AccountId,
        name: &str,
        payer: AccountId,
        recipient: AccountId,
        required_amount: Amount,
        id: PlanId,
    ) -> Result<EscrowEvent> {
        self.try_create_plan(caller, name, payer, recipient, required_amount, id)
            .inspect_err(|err| {
                tracing::warn!(plan = %id.short(), caller = %caller, error = %err, "create_plan rejected");
            })
    }

    fn try_create_plan(
        &mut self,
        caller: AccountId,
        name: &str,
        payer: AccountId,
        recipient: AccountId,
        required_amount: Amount,
        id: PlanId,
    ) -> Result<EscrowEvent> {
        self.ensure_arbiter(caller)?;

        if self.plans.contains_key(&id) {
            return Err(EscrowError::AlreadyExists(id));
        }

        if required_amount == 0 {
            return Err(EscrowError::InvalidAmount {
                expected: 1,
                provided: 0,
            });
        }

        self.validate_name(name)?;

        let plan = EscrowPlan::new(id, name, payer, recipient, required_amount);
        let event = EscrowEvent::plan_created(&plan);
        let staged = self.stage(plan, self.held, self.supply.clone(), event)?;
        let event = self.apply(staged);

        tracing::info!(
            plan = %id,
            payer = %payer,
            recipient = %recipient,
            required_amount = %required_amount,
            "Escrow plan created"
        );
        Ok(event)
    }

    /// Deposit `attached_value` from `caller`'s wallet into custody,
    /// moving the plan PENDING → ACTIVE. Payer only, exact amount only.
    ///
    /// # Errors
    /// - `InvalidState` if the plan is missing or not PENDING
    /// - `Unauthorized` if `caller` is not the plan's payer
    /// - `InvalidAmount` if `attached_value` ≠ `required_amount`
    /// - `InsufficientBalance` if the payer's wallet can't cover it
    /// - `BalanceOverflow` if custody totals would overflow
    pub fn fund(
        &mut self,
        wallets: &mut BalanceManager,
        caller: AccountId,
        id: PlanId,
        attached_value: Amount,
    ) -> Result<EscrowEvent> {
        self.try_fund(wallets, caller, id, attached_value)
            .inspect_err(|err| {
                tracing::warn!(
                    plan = %id.short(),
                    caller = %caller,
                    attached_value = %attached_value,
                    error = %err,
                    "fund rejected"
                );
            })
    }

    fn try_fund(
        &mut self,
        wallets: &mut BalanceManager,
        caller: AccountId,
        id: PlanId,
        attached_value: Amount,
    ) -> Result<EscrowEvent> {
        let plan = self.plan_in_state(id, PlanState::Pending)?;

        if caller != plan.payer {
            return Err(EscrowError::Unauthorized {
                caller,
                role: Role::Payer,
            });
        }

        let amount = plan.required_amount;
        if attached_value != amount {
            return Err(EscrowError::InvalidAmount {
                expected: amount,
                provided: attached_value,
            });
        }

        let held = checked_add(self.held, amount)?;
        let mut supply = self.supply.clone();
        supply.record_funding(amount)?;
        let mut next = plan.clone();
        next.mark_funded()?;
        let event = EscrowEvent::funded(&next);
        let staged = self.stage(next, held, supply, event)?;

        // Last fallible step.
        wallets.debit(caller, amount)?;
        let event = self.apply(staged);

        tracing::info!(
            plan = %id,
            payer = %caller,
            amount = %amount,
            held = %held,
            "Escrow plan funded"
        );
        Ok(event)
    }

    /// Pay the held amount out to the recipient, moving the plan
    /// ACTIVE → COMPLETE. Arbiter only.
    ///
    /// # Errors
    /// - `Unauthorized` if `caller` is not the arbiter
    /// - `InvalidState` if the plan is missing or not ACTIVE
    /// - `BalanceOverflow` if the recipient's wallet would overflow
    pub fn release(
        &mut self,
        wallets: &mut BalanceManager,
        caller: AccountId,
        id: PlanId,
    ) -> Result<EscrowEvent> {
        self.try_release(wallets, caller, id).inspect_err(|err| {
            tracing::warn!(plan = %id.short(), caller = %caller, error = %err, "release rejected");
        })
    }

    fn try_release(
        &mut self,
        wallets: &mut BalanceManager,
        caller: AccountId,
        id: PlanId,
    ) -> Result<EscrowEvent> {
        self.ensure_arbiter(caller)?;

        let plan = self.plan_in_state(id, PlanState::Active)?;
        let amount = plan.required_amount;
        let recipient = plan.recipient;

        let held = self
            .held
            .checked_sub(amount)
            .ok_or_else(|| EscrowError::SupplyInvariantViolation {
                reason: format!("held {} below plan {id} amount {amount}", self.held),
            })?;
        let mut supply = self.supply.clone();
        supply.record_release(amount)?;
        checked_add(wallets.balance(recipient), amount)?;
        let mut next = plan.clone();
        next.mark_complete()?;
        let event = EscrowEvent::released(&next);
        let staged = self.stage(next, held, supply, event)?;

        // Last fallible step.
        wallets.credit(recipient, amount)?;
        let event = self.apply(staged);

        tracing::info!(
            plan = %id,
            recipient = %recipient,
            amount = %amount,
            held = %held,
            "Escrow plan released"
        );
        Ok(event)
    }

    // -----------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------

    /// Total value currently held across all ACTIVE plans.
    #[must_use]
    pub fn balance_of(&self) -> Amount {
        self.held
    }

    /// The arbiter fixed at construction.
    #[must_use]
    pub fn arbiter(&self) -> AccountId {
        self.config.arbiter
    }

    /// The configuration this ledger runs with.
    #[must_use]
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Look up a plan by id.
    #[must_use]
    pub fn plan(&self, id: &PlanId) -> Option<&EscrowPlan> {
        self.plans.get(id)
    }

    /// State of a plan; `NONE` if no plan occupies the id.
    #[must_use]
    pub fn state_of(&self, id: &PlanId) -> PlanState {
        self.plans.get(id).map_or(PlanState::None, |p| p.state)
    }

    /// Number of plans ever created.
    #[must_use]
    pub fn plan_count(&self) -> usize {
        self.plans.len()
    }

    /// Number of ACTIVE plans.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.plans.values().filter(|p| p.is_active()).count()
    }

    /// The notification log.
    #[must_use]
    pub fn event_log(&self) -> &EventLog {
        &self.events
    }

    /// Every event emitted, oldest first.
    pub fn events(&self) -> impl Iterator<Item = &EscrowEvent> {
        self.events.records().iter().map(|r| &r.event)
    }

    /// Check that custody agrees with the plan table and lifetime totals,
    /// and that one event exists per transition taken.
    ///
    /// Walks every plan ever created, so it is linear in history. Calls
    /// only check the running totals (`held == funded - released`).
    ///
    /// # Errors
    /// Returns `SupplyInvariantViolation` on any disagreement.
    pub fn verify_invariants(&self) -> Result<()> {
        let mut active_sum: Amount = 0;
        let mut transitions: usize = 0;
        // A plan's state code is the number of transitions it has taken.
        for plan in self.plans.values() {
            active_sum = checked_add(active_sum, plan.held_amount())?;
            transitions += usize::from(plan.state.code());
        }

        if active_sum != self.held {
            return Err(EscrowError::SupplyInvariantViolation {
                reason: format!(
                    "held {} != sum of ACTIVE plans {active_sum}",
                    self.held
                ),
            });
        }

        self.supply.verify(self.held)?;

        if transitions != self.events.len() {
            return Err(EscrowError::SupplyInvariantViolation {
                reason: format!(
                    "{transitions} transitions but {} events",
                    self.events.len()
                ),
            });
        }
        Ok(())
    }

    // -----------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------

    fn ensure_arbiter(&self, caller: AccountId) -> Result<()> {
        if caller != self.config.arbiter {
            return Err(EscrowError::Unauthorized {
                caller,
                role: Role::Arbiter,
            });
        }
        Ok(())
    }

    fn validate_name(&self, name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(EscrowError::InvalidPlan {
                reason: "plan name is empty".into(),
            });
        }
        if name.len() > self.config.max_name_len {
            return Err(EscrowError::InvalidPlan {
                reason: format!(
                    "plan name is {} bytes, limit {}",
                    name.len(),
                    self.config.max_name_len
                ),
            });
        }
        Ok(())
    }

    fn plan_in_state(&self, id: PlanId, expected: PlanState) -> Result<&EscrowPlan> {
        match self.plans.get(&id) {
            Some(plan) if plan.state == expected => Ok(plan),
            other => Err(EscrowError::InvalidState {
                id,
                expected,
                actual: other.map_or(PlanState::None, |p| p.state),
            }),
        }
    }

    /// Seal the event and, if configured, check the post-call custody
    /// totals agree. Touches nothing.
    fn stage(
        &self,
        plan: EscrowPlan,
        held: Amount,
        supply: SupplyConservation,
        event: EscrowEvent,
    ) -> Result<Staged> {
        if self.config.verify_invariants {
            supply.verify(held).inspect_err(|err| {
                tracing::error!(plan = %plan.id, error = %err, "Custody invariant violated");
            })?;
        }
        let record = self.events.seal(event)?;
        Ok(Staged {
            plan,
            held,
            supply,
            record,
        })
    }

    /// Apply a staged call. Infallible.
    fn apply(&mut self, staged: Staged) -> EscrowEvent {
        let Staged {
            plan,
            held,
            supply,
            record,
        } = staged;
        self.held = held;
        self.supply = supply;
        self.plans.insert(plan.id, plan);

        let record = self.events.push(record);
        tracing::debug!(
            sequence = record.sequence,
            chain_hash = hex::encode(record.chain_hash),
            event = %record.event,
            "Event emitted"
        );
        record.event.clone()
    }
}

/// The validated outcome of a mutating call, not yet applied.
struct Staged {
    plan: EscrowPlan,
    held: Amount,
    supply: SupplyConservation,
    record: EventRecord,
}
