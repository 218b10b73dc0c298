//! Transaction State Definitions
//!
//! Two independent axes: approval status and pipeline stage.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Approval / completion state of a transfer
///
/// Terminal states: COMPLETED, REJECTED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Initial state - created by the sender, awaiting review
    Pending,

    /// Approved by an administrator
    Approved,

    /// Terminal: funds reached the recipient
    Completed,

    /// Terminal: refused by an administrator
    Rejected,
}

impl TransactionStatus {
    /// Check if this is a terminal state (no more transitions possible)
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransactionStatus::Completed | TransactionStatus::Rejected
        )
    }

    /// Whether `self -> to` is an edge of the status graph
    ///
    /// ```text
    /// PENDING → APPROVED → COMPLETED
    ///    ↓
    /// REJECTED
    /// ```
    pub fn can_transition_to(&self, to: TransactionStatus) -> bool {
        matches!(
            (self, to),
            (TransactionStatus::Pending, TransactionStatus::Approved)
                | (TransactionStatus::Pending, TransactionStatus::Rejected)
                | (TransactionStatus::Approved, TransactionStatus::Completed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Approved => "approved",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(TransactionStatus::Pending),
            "approved" => Ok(TransactionStatus::Approved),
            "completed" => Ok(TransactionStatus::Completed),
            "rejected" => Ok(TransactionStatus::Rejected),
            other => Err(format!("Unknown status: {}", other)),
        }
    }
}

/// Operational fulfillment position of a transfer
///
/// ```text
/// MONEY_COLLECTION → ADMIN_APPROVAL → MONEY_COLLECTED → WITH_COMPANY → RECIPIENT_RECEIVED → DONE
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(i16)]
pub enum TransactionStage {
    #[serde(rename = "Money Collection")]
    MoneyCollection = 0,
    #[serde(rename = "Admin Approval")]
    AdminApproval = 1,
    #[serde(rename = "Money Collected")]
    MoneyCollected = 2,
    #[serde(rename = "With Company")]
    WithCompany = 3,
    #[serde(rename = "Recipient Received")]
    RecipientReceived = 4,
    #[serde(rename = "Done")]
    Done = 5,
}

impl TransactionStage {
    pub const ALL: [TransactionStage; 6] = [
        TransactionStage::MoneyCollection,
        TransactionStage::AdminApproval,
        TransactionStage::MoneyCollected,
        TransactionStage::WithCompany,
        TransactionStage::RecipientReceived,
        TransactionStage::Done,
    ];

    /// Position in the pipeline (0-based)
    #[inline]
    pub fn ordinal(&self) -> i16 {
        *self as i16
    }

    pub fn from_ordinal(ordinal: i16) -> Option<Self> {
        usize::try_from(ordinal)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }

    /// The stage one step forward, if any
    pub fn next(&self) -> Option<Self> {
        Self::from_ordinal(self.ordinal() + 1)
    }

    /// True only for a single step forward
    #[inline]
    pub fn is_adjacent_step(&self, to: TransactionStage) -> bool {
        self.next() == Some(to)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStage::MoneyCollection => "Money Collection",
            TransactionStage::AdminApproval => "Admin Approval",
            TransactionStage::MoneyCollected => "Money Collected",
            TransactionStage::WithCompany => "With Company",
            TransactionStage::RecipientReceived => "Recipient Received",
            TransactionStage::Done => "Done",
        }
    }
}

impl fmt::Display for TransactionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransactionStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        Self::ALL
            .into_iter()
            .find(|stage| {
                stage
                    .as_str()
                    .chars()
                    .filter(|c| c.is_ascii_alphanumeric())
                    .collect::<String>()
                    .to_lowercase()
                    == key
            })
            .ok_or_else(|| format!("Unknown stage: {}", s.trim()))
    }
}
