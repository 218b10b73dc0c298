//! Transaction Lifecycle
//!
//! Two independent state axes per transaction, both driven only by
//! administrators.
//!
//! # Status axis
//!
//! ```text
//! PENDING → APPROVED → COMPLETED
//!    ↓
//! REJECTED
//! ```
//!
//! # Stage axis
//!
//! ```text
//! MONEY_COLLECTION → ADMIN_APPROVAL → MONEY_COLLECTED → WITH_COMPANY → RECIPIENT_RECEIVED → DONE
//! ```
//!
//! Any stage may be set directly (operator correction); moves other than one
//! step forward are written to the audit log.
//!
//! # Invariants
//!
//! 1. **Idempotent**: re-applying the stored value is a successful no-op
//! 2. **Field-scoped**: a delta touching one axis never rewrites the other
//! 3. **Read-modify-write under lock**: transitions are planned against the
//!    record as stored at apply time, never a stale copy

pub mod machine;
pub mod state;

pub use machine::{
    StageChange, StateDelta, StatusChange, Transition, TransitionPolicy, plan_transition,
};
pub use state::{TransactionStage, TransactionStatus};

use chrono::{DateTime, Utc};

use crate::core_types::UserId;
use crate::error::RemitError;
use crate::models::Transaction;
use crate::store::Mutation;

/// Lifecycle rules bound to a policy
#[derive(Debug, Clone, Copy, Default)]
pub struct TransactionLifecycle {
    policy: TransitionPolicy,
}

impl TransactionLifecycle {
    pub fn new(policy: TransitionPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> TransitionPolicy {
        self.policy
    }

    /// Initial state of every new transaction
    pub fn initial_state() -> (TransactionStatus, TransactionStage) {
        (TransactionStatus::Pending, TransactionStage::MoneyCollection)
    }

    /// Plan `delta` against `current` and build the store mutation
    ///
    /// Returns `Ok(None)` when nothing changes.
    pub fn mutation(
        &self,
        current: &Transaction,
        delta: StateDelta,
        actor: UserId,
        at: DateTime<Utc>,
    ) -> Result<Option<Mutation>, RemitError> {
        let transition = plan_transition(current, delta, self.policy)?;
        if transition.is_noop() {
            return Ok(None);
        }
        machine::log_irregular(&transition, current, actor);
        Ok(Some(Mutation {
            record: transition.apply(current, at),
            audit: transition.audit_entries(current, actor, at),
        }))
    }
}
