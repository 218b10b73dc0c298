//! Audit - lifecycle change log
//!
//! Every effective status or stage change is recorded once, append-only.
//! Entries are kept by the store next to the transaction they describe.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core_types::{TransactionId, UserId};

/// Tracing target for audit events
pub const AUDIT_TARGET: &str = "audit";

/// Which state axis changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Status,
    Stage,
}

/// One recorded change of one axis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub transaction_id: TransactionId,
    pub actor: UserId,
    pub axis: Axis,
    pub from: String,
    pub to: String,
    /// False for a stage jump other than one step forward, or a status
    /// move off the graph accepted under the permissive policy
    pub adjacent: bool,
    pub at: DateTime<Utc>,
}
