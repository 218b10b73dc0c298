//! Transition planning for the status and stage axes
//!
//! Pure functions: given the stored record and a requested delta, decide what
//! changes. The store applies the result under the record's lock.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::state::{TransactionStage, TransactionStatus};
use crate::audit::{AUDIT_TARGET, AuditEntry, Axis};
use crate::core_types::UserId;
use crate::error::RemitError;
use crate::models::Transaction;

/// How strictly the status graph is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionPolicy {
    /// Only graph edges are accepted
    #[default]
    Enforced,
    /// Any status is accepted; off-graph moves are logged
    Permissive,
}

/// Requested change; `None` leaves the axis untouched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateDelta {
    pub status: Option<TransactionStatus>,
    pub stage: Option<TransactionStage>,
}

impl StateDelta {
    pub fn status(status: TransactionStatus) -> Self {
        Self {
            status: Some(status),
            stage: None,
        }
    }

    pub fn stage(stage: TransactionStage) -> Self {
        Self {
            status: None,
            stage: Some(stage),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.stage.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub from: TransactionStatus,
    pub to: TransactionStatus,
    pub on_graph: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageChange {
    pub from: TransactionStage,
    pub to: TransactionStage,
    pub adjacent: bool,
}

/// Effective changes; an axis whose requested value equals the stored one
/// does not appear
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Transition {
    pub status: Option<StatusChange>,
    pub stage: Option<StageChange>,
}

impl Transition {
    #[inline]
    pub fn is_noop(&self) -> bool {
        self.status.is_none() && self.stage.is_none()
    }

    /// Copy of `current` with the changes applied
    pub fn apply(&self, current: &Transaction, at: DateTime<Utc>) -> Transaction {
        let mut next = current.clone();
        if let Some(change) = self.status {
            next.status = change.to;
        }
        if let Some(change) = self.stage {
            next.stage = change.to;
        }
        if !self.is_noop() {
            next.updated_at = at;
        }
        next
    }

    pub fn audit_entries(
        &self,
        tx: &Transaction,
        actor: UserId,
        at: DateTime<Utc>,
    ) -> Vec<AuditEntry> {
        let mut entries = Vec::with_capacity(2);
        if let Some(change) = self.status {
            entries.push(AuditEntry {
                transaction_id: tx.id,
                actor,
                axis: Axis::Status,
                from: change.from.to_string(),
                to: change.to.to_string(),
                adjacent: change.on_graph,
                at,
            });
        }
        if let Some(change) = self.stage {
            entries.push(AuditEntry {
                transaction_id: tx.id,
                actor,
                axis: Axis::Stage,
                from: change.from.to_string(),
                to: change.to.to_string(),
                adjacent: change.adjacent,
                at,
            });
        }
        entries
    }
}

/// Decide what `delta` does to `current` under `policy`
///
/// # Errors
/// - `Validation` if the delta names no axis
/// - `IllegalTransition` if the status move is off the graph and the policy
///   is `Enforced`
pub fn plan_transition(
    current: &Transaction,
    delta: StateDelta,
    policy: TransitionPolicy,
) -> Result<Transition, RemitError> {
    if delta.is_empty() {
        return Err(RemitError::Validation(
            "at least one of status or stage is required".into(),
        ));
    }

    let status = match delta.status {
        Some(to) if to != current.status => {
            let on_graph = current.status.can_transition_to(to);
            if !on_graph && policy == TransitionPolicy::Enforced {
                return Err(RemitError::IllegalTransition(format!(
                    "status {} -> {} is not allowed",
                    current.status, to
                )));
            }
            Some(StatusChange {
                from: current.status,
                to,
                on_graph,
            })
        }
        _ => None,
    };

    let stage = match delta.stage {
        Some(to) if to != current.stage => Some(StageChange {
            from: current.stage,
            to,
            adjacent: current.stage.is_adjacent_step(to),
        }),
        _ => None,
    };

    Ok(Transition { status, stage })
}

/// Emit audit warnings for irregular moves in `transition`
pub fn log_irregular(transition: &Transition, tx: &Transaction, actor: UserId) {
    if let Some(change) = transition.status
        && !change.on_graph
    {
        warn!(
            target: AUDIT_TARGET,
            tx_id = %tx.id,
            actor = %actor,
            from = %change.from,
            to = %change.to,
            "Status moved off the transition graph (permissive policy)"
        );
    }
    if let Some(change) = transition.stage {
        if change.adjacent {
            debug!(tx_id = %tx.id, from = %change.from, to = %change.to, "Stage advanced");
        } else {
            warn!(
                target: AUDIT_TARGET,
                tx_id = %tx.id,
                actor = %actor,
                from = %change.from,
                to = %change.to,
                "Non-adjacent stage jump"
            );
        }
    }
}
