// models.rs - Rate and transaction records

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core_types::{RateId, TransactionId, UserId};
use crate::corridor::{Country, PaymentMethod};
use crate::lifecycle::{TransactionStage, TransactionStatus};

// ============================================================
// RATE ENTRY
// ============================================================

/// Active exchange rate and fee percentage for one destination country
///
/// Replaced as a whole on every update; `version` increases by one each time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateEntry {
    pub id: RateId,
    pub country: Country,
    /// Destination-currency units per 1 source-currency unit
    pub exchange_rate: Decimal,
    /// Percent, in [0, 100)
    pub fee_percentage: Decimal,
    pub version: u64,
    pub updated_at: DateTime<Utc>,
}

impl RateEntry {
    /// Copy of the numeric fields, taken when a transaction is created
    pub fn snapshot(&self) -> RateSnapshot {
        RateSnapshot {
            exchange_rate: self.exchange_rate,
            fee_percentage: self.fee_percentage,
            version: self.version,
        }
    }
}

/// Rate values a transaction was priced with (copied, never linked)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateSnapshot {
    pub exchange_rate: Decimal,
    pub fee_percentage: Decimal,
    pub version: u64,
}

// ============================================================
// TRANSACTION
// ============================================================

/// A transfer from a sender to a recipient
///
/// Everything except `status`, `stage` and `updated_at` is fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub owner_id: UserId,
    pub source_amount: Decimal,
    pub destination_amount: Decimal,
    pub fee: Decimal,
    pub total_charge: Decimal,
    pub rate: RateSnapshot,
    pub recipient_name: String,
    pub recipient_mobile: String,
    pub country: Country,
    pub payment_method: PaymentMethod,
    pub status: TransactionStatus,
    pub stage: TransactionStage,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated creation input, owner already resolved from the caller
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub owner_id: UserId,
    pub source_amount: Decimal,
    pub recipient_name: String,
    pub recipient_mobile: String,
    pub country: Country,
    pub payment_method: PaymentMethod,
}

/// Owner display metadata joined onto admin listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnerDisplay {
    pub full_name: String,
    pub mobile_number: String,
}

/// A transaction as listed to administrators
///
/// `owner` is `None` when the profile lookup failed or timed out; clients
/// fall back to showing `transaction.owner_id`.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionView {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub owner: Option<OwnerDisplay>,
}

impl TransactionView {
    /// Name to show for the owner: full name, or the raw id when unresolved
    pub fn owner_label(&self) -> String {
        match &self.owner {
            Some(owner) => owner.full_name.clone(),
            None => self.transaction.owner_id.to_string(),
        }
    }
}

/// Newest first, ties broken by id (ULIDs sort by creation time)
pub fn sort_newest_first(txs: &mut [Transaction]) {
    txs.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}
