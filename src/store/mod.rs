//! Remittance Store
//!
//! Durable home of rate entries, transactions and the audit trail.
//!
//! # Consistency
//!
//! - Records are replaced whole; readers always receive complete clones
//! - Rate replacement is atomic per country and never blocks other countries
//! - Transaction updates are read-modify-write under the record's own lock,
//!   so edits to disjoint fields by concurrent callers both survive
//!
//! The store knows nothing about roles or the lifecycle graph; callers pass
//! a [`MutateFn`] that decides the new record from the current one.

pub mod memory;
pub mod snapshot;

pub use memory::MemoryStore;
pub use snapshot::{SnapshotError, SnapshotMetadata, StoreSnapshot, StoreSnapshotter};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::audit::AuditEntry;
use crate::core_types::{TransactionId, UserId};
use crate::corridor::Country;
use crate::error::RemitError;
use crate::models::{RateEntry, Transaction};

/// Replacement record plus the audit entries describing it
#[derive(Debug, Clone)]
pub struct Mutation {
    pub record: Transaction,
    pub audit: Vec<AuditEntry>,
}

/// Decides the next record from the stored one; `Ok(None)` leaves it as is
pub type MutateFn<'a> =
    dyn Fn(&Transaction) -> Result<Option<Mutation>, RemitError> + Send + Sync + 'a;

/// Storage backend for the remittance ledger
#[async_trait]
pub trait RemitStore: Send + Sync {
    /// Backend name for logging
    fn name(&self) -> &'static str;

    async fn get_rate(&self, country: Country) -> Result<Option<RateEntry>, RemitError>;

    /// All active entries, ordered by country
    async fn list_rates(&self) -> Result<Vec<RateEntry>, RemitError>;

    /// Replace both numeric fields of a country's entry in one step
    ///
    /// Creates the entry (version 1) if the country has none yet.
    async fn replace_rate(
        &self,
        country: Country,
        exchange_rate: Decimal,
        fee_percentage: Decimal,
        at: DateTime<Utc>,
    ) -> Result<RateEntry, RemitError>;

    /// Install an entry only if the country has none; returns the entry
    /// when one was inserted
    async fn insert_rate_if_absent(
        &self,
        country: Country,
        exchange_rate: Decimal,
        fee_percentage: Decimal,
        at: DateTime<Utc>,
    ) -> Result<Option<RateEntry>, RemitError>;

    /// Persist a new transaction; ids are never reused
    async fn insert_transaction(&self, tx: Transaction) -> Result<(), RemitError>;

    async fn get_transaction(&self, id: TransactionId)
    -> Result<Option<Transaction>, RemitError>;

    /// Transactions of one owner, newest first
    async fn list_transactions_by_owner(
        &self,
        owner: UserId,
    ) -> Result<Vec<Transaction>, RemitError>;

    /// Every transaction, newest first
    async fn list_transactions(&self) -> Result<Vec<Transaction>, RemitError>;

    /// Atomically read-modify-write one transaction
    ///
    /// `mutate` sees the record as currently stored. On `Ok(Some(m))` the
    /// record is replaced and `m.audit` appended; on `Ok(None)` or `Err`
    /// nothing is written. Returns the record as stored afterwards.
    async fn update_transaction(
        &self,
        id: TransactionId,
        mutate: &MutateFn<'_>,
    ) -> Result<Transaction, RemitError>;

    /// Audit entries of one transaction, oldest first
    async fn audit_trail(&self, id: TransactionId) -> Result<Vec<AuditEntry>, RemitError>;
}
