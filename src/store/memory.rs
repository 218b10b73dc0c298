//! In-memory store backed by sharded concurrent maps
//!
//! Each map shard has its own lock, so callers working on different
//! countries or different transactions do not contend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rust_decimal::Decimal;
use tracing::debug;

use super::snapshot::StoreSnapshot;
use super::{MutateFn, RemitStore};
use crate::audit::AuditEntry;
use crate::core_types::{TransactionId, UserId};
use crate::corridor::Country;
use crate::error::RemitError;
use crate::models::{RateEntry, Transaction, sort_newest_first};

#[derive(Debug, Default)]
pub struct MemoryStore {
    rates: DashMap<Country, RateEntry>,
    transactions: DashMap<TransactionId, Transaction>,
    /// Owner partition index
    by_owner: DashMap<UserId, Vec<TransactionId>>,
    audit: DashMap<TransactionId, Vec<AuditEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from a loaded snapshot
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        let store = Self::new();
        for rate in snapshot.rates {
            store.rates.insert(rate.country, rate);
        }
        for tx in snapshot.transactions {
            store.by_owner.entry(tx.owner_id).or_default().push(tx.id);
            store.transactions.insert(tx.id, tx);
        }
        for entry in snapshot.audit {
            store
                .audit
                .entry(entry.transaction_id)
                .or_default()
                .push(entry);
        }
        store
    }

    /// Copy out every record for persistence
    ///
    /// Each record is cloned whole under its shard lock; records written
    /// while the export runs may or may not be included.
    pub fn export(&self) -> StoreSnapshot {
        let mut rates: Vec<RateEntry> = self.rates.iter().map(|r| r.value().clone()).collect();
        rates.sort_by_key(|r| r.country);

        let mut transactions: Vec<Transaction> = self
            .transactions
            .iter()
            .map(|t| t.value().clone())
            .collect();
        transactions.sort_by_key(|t| t.id);

        let mut audit: Vec<AuditEntry> = self
            .audit
            .iter()
            .flat_map(|e| e.value().clone())
            .collect();
        audit.sort_by(|a, b| {
            a.transaction_id
                .cmp(&b.transaction_id)
                .then_with(|| a.at.cmp(&b.at))
        });

        StoreSnapshot {
            rates,
            transactions,
            audit,
        }
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }
}

#[async_trait]
impl RemitStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get_rate(&self, country: Country) -> Result<Option<RateEntry>, RemitError> {
        Ok(self.rates.get(&country).map(|r| r.value().clone()))
    }

    async fn list_rates(&self) -> Result<Vec<RateEntry>, RemitError> {
        let mut rates: Vec<RateEntry> = self.rates.iter().map(|r| r.value().clone()).collect();
        rates.sort_by_key(|r| r.country);
        Ok(rates)
    }

    async fn replace_rate(
        &self,
        country: Country,
        exchange_rate: Decimal,
        fee_percentage: Decimal,
        at: DateTime<Utc>,
    ) -> Result<RateEntry, RemitError> {
        let next = match self.rates.entry(country) {
            Entry::Occupied(mut e) => {
                let current = e.get();
                let next = RateEntry {
                    id: current.id,
                    country,
                    exchange_rate,
                    fee_percentage,
                    version: current.version + 1,
                    updated_at: at,
                };
                e.insert(next.clone());
                next
            }
            Entry::Vacant(e) => {
                let next = RateEntry {
                    id: uuid::Uuid::new_v4(),
                    country,
                    exchange_rate,
                    fee_percentage,
                    version: 1,
                    updated_at: at,
                };
                e.insert(next.clone());
                next
            }
        };
        debug!(country = %country, version = next.version, "Rate entry replaced");
        Ok(next)
    }

    async fn insert_rate_if_absent(
        &self,
        country: Country,
        exchange_rate: Decimal,
        fee_percentage: Decimal,
        at: DateTime<Utc>,
    ) -> Result<Option<RateEntry>, RemitError> {
        match self.rates.entry(country) {
            Entry::Occupied(_) => Ok(None),
            Entry::Vacant(e) => {
                let entry = RateEntry {
                    id: uuid::Uuid::new_v4(),
                    country,
                    exchange_rate,
                    fee_percentage,
                    version: 1,
                    updated_at: at,
                };
                e.insert(entry.clone());
                Ok(Some(entry))
            }
        }
    }

    async fn insert_transaction(&self, tx: Transaction) -> Result<(), RemitError> {
        let id = tx.id;
        let owner = tx.owner_id;
        match self.transactions.entry(id) {
            Entry::Occupied(_) => {
                return Err(RemitError::Storage(format!(
                    "transaction id already exists: {}",
                    id
                )));
            }
            Entry::Vacant(e) => {
                e.insert(tx);
            }
        }
        // Indexed after the record exists, so index readers never see a dangling id
        self.by_owner.entry(owner).or_default().push(id);
        Ok(())
    }

    async fn get_transaction(
        &self,
        id: TransactionId,
    ) -> Result<Option<Transaction>, RemitError> {
        Ok(self.transactions.get(&id).map(|t| t.value().clone()))
    }

    async fn list_transactions_by_owner(
        &self,
        owner: UserId,
    ) -> Result<Vec<Transaction>, RemitError> {
        let ids: Vec<TransactionId> = self
            .by_owner
            .get(&owner)
            .map(|ids| ids.value().clone())
            .unwrap_or_default();
        let mut txs: Vec<Transaction> = ids
            .iter()
            .filter_map(|id| self.transactions.get(id).map(|t| t.value().clone()))
            .collect();
        sort_newest_first(&mut txs);
        Ok(txs)
    }

    async fn list_transactions(&self) -> Result<Vec<Transaction>, RemitError> {
        let mut txs: Vec<Transaction> = self
            .transactions
            .iter()
            .map(|t| t.value().clone())
            .collect();
        sort_newest_first(&mut txs);
        Ok(txs)
    }

    async fn update_transaction(
        &self,
        id: TransactionId,
        mutate: &MutateFn<'_>,
    ) -> Result<Transaction, RemitError> {
        let mut entry = self
            .transactions
            .get_mut(&id)
            .ok_or_else(|| RemitError::TransactionNotFound(id.to_string()))?;

        let Some(mutation) = mutate(entry.value())? else {
            return Ok(entry.value().clone());
        };

        if mutation.record.id != id {
            return Err(RemitError::Storage(format!(
                "mutation changed record id {} -> {}",
                id, mutation.record.id
            )));
        }

        // Appended while the record lock is held: trail order matches write order
        if !mutation.audit.is_empty() {
            self.audit.entry(id).or_default().extend(mutation.audit);
        }
        *entry.value_mut() = mutation.record;
        Ok(entry.value().clone())
    }

    async fn audit_trail(&self, id: TransactionId) -> Result<Vec<AuditEntry>, RemitError> {
        Ok(self
            .audit
            .get(&id)
            .map(|e| e.value().clone())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corridor::PaymentMethod;
    use crate::lifecycle::{TransactionStage, TransactionStatus};
    use crate::models::RateSnapshot;
    use crate::store::Mutation;
    use std::sync::Arc;

    fn tx_for(owner: UserId, created_at: DateTime<Utc>) -> Transaction {
        Transaction {
            id: TransactionId::new(),
            owner_id: owner,
            source_amount: Decimal::new(5000, 2),
            destination_amount: Decimal::new(625950, 2),
            fee: Decimal::new(299, 2),
            total_charge: Decimal::new(5299, 2),
            rate: RateSnapshot {
                exchange_rate: Decimal::new(12519, 2),
                fee_percentage: Decimal::ONE,
                version: 1,
            },
            recipient_name: "Wanjiru".into(),
            recipient_mobile: "+254700000000".into(),
            country: Country::Kenya,
            payment_method: PaymentMethod::MPesa,
            status: TransactionStatus::Pending,
            stage: TransactionStage::MoneyCollection,
            created_at,
            updated_at: created_at,
        }
    }

    #[tokio::test]
    async fn test_replace_rate_bumps_version_and_keeps_id() {
        let store = MemoryStore::new();
        let first = store
            .replace_rate(Country::Kenya, Decimal::new(16500, 2), Decimal::ONE, Utc::now())
            .await
            .unwrap();
        assert_eq!(first.version, 1);

        let second = store
            .replace_rate(Country::Kenya, Decimal::new(17000, 2), Decimal::TWO, Utc::now())
            .await
            .unwrap();
        assert_eq!(second.version, 2);
        assert_eq!(second.id, first.id);
        assert_eq!(second.exchange_rate, Decimal::new(17000, 2));
        assert_eq!(second.fee_percentage, Decimal::TWO);
    }

    #[tokio::test]
    async fn test_insert_rate_if_absent_keeps_existing() {
        let store = MemoryStore::new();
        store
            .replace_rate(Country::Somalia, Decimal::ONE, Decimal::ZERO, Utc::now())
            .await
            .unwrap();
        let inserted = store
            .insert_rate_if_absent(Country::Somalia, Decimal::TEN, Decimal::ZERO, Utc::now())
            .await
            .unwrap();
        assert!(inserted.is_none());
        let rate = store.get_rate(Country::Somalia).await.unwrap().unwrap();
        assert_eq!(rate.exchange_rate, Decimal::ONE);
    }

    #[tokio::test]
    async fn test_duplicate_transaction_id_rejected() {
        let store = MemoryStore::new();
        let tx = tx_for(uuid::Uuid::new_v4(), Utc::now());
        store.insert_transaction(tx.clone()).await.unwrap();
        let err = store.insert_transaction(tx).await.unwrap_err();
        assert_eq!(err.code(), "STORAGE_ERROR");
    }

    #[tokio::test]
    async fn test_owner_partition_and_ordering() {
        let store = MemoryStore::new();
        let alice = uuid::Uuid::new_v4();
        let bob = uuid::Uuid::new_v4();
        let base = Utc::now();

        let older = tx_for(alice, base - chrono::Duration::minutes(5));
        let newer = tx_for(alice, base);
        let bobs = tx_for(bob, base - chrono::Duration::minutes(1));
        store.insert_transaction(older.clone()).await.unwrap();
        store.insert_transaction(bobs.clone()).await.unwrap();
        store.insert_transaction(newer.clone()).await.unwrap();

        let mine = store.list_transactions_by_owner(alice).await.unwrap();
        assert_eq!(
            mine.iter().map(|t| t.id).collect::<Vec<_>>(),
            vec![newer.id, older.id]
        );

        let all = store.list_transactions().await.unwrap();
        assert_eq!(
            all.iter().map(|t| t.id).collect::<Vec<_>>(),
            vec![newer.id, bobs.id, older.id]
        );

        assert!(
            store
                .list_transactions_by_owner(uuid::Uuid::new_v4())
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_update_missing_transaction() {
        let store = MemoryStore::new();
        let err = store
            .update_transaction(TransactionId::new(), &|_: &Transaction| Ok(None))
            .await
            .unwrap_err();
        assert!(matches!(err, RemitError::TransactionNotFound(_)));
    }

    #[tokio::test]
    async fn test_failed_mutation_leaves_record_unchanged() {
        let store = MemoryStore::new();
        let tx = tx_for(uuid::Uuid::new_v4(), Utc::now());
        store.insert_transaction(tx.clone()).await.unwrap();

        let err = store
            .update_transaction(tx.id, &|_: &Transaction| {
                Err(RemitError::IllegalTransition("nope".into()))
            })
            .await
            .unwrap_err();
        assert!(matches!(err, RemitError::IllegalTransition(_)));
        assert_eq!(store.get_transaction(tx.id).await.unwrap().unwrap(), tx);
        assert!(store.audit_trail(tx.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_disjoint_updates_both_survive() {
        let store = Arc::new(MemoryStore::new());
        let tx = tx_for(uuid::Uuid::new_v4(), Utc::now());
        let id = tx.id;
        store.insert_transaction(tx).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .update_transaction(id, &move |cur: &Transaction| {
                        let mut next = cur.clone();
                        if i % 2 == 0 {
                            next.status = TransactionStatus::Approved;
                        } else {
                            next.stage = TransactionStage::AdminApproval;
                        }
                        Ok(Some(Mutation {
                            record: next,
                            audit: Vec::new(),
                        }))
                    })
                    .await
                    .unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        let stored = store.get_transaction(id).await.unwrap().unwrap();
        assert_eq!(stored.status, TransactionStatus::Approved);
        assert_eq!(stored.stage, TransactionStage::AdminApproval);
    }

    #[tokio::test]
    async fn test_export_and_rebuild() {
        let store = MemoryStore::new();
        store
            .replace_rate(Country::Kenya, Decimal::new(16500, 2), Decimal::ONE, Utc::now())
            .await
            .unwrap();
        let tx = tx_for(uuid::Uuid::new_v4(), Utc::now());
        store.insert_transaction(tx.clone()).await.unwrap();

        let rebuilt = MemoryStore::from_snapshot(store.export());
        assert_eq!(rebuilt.transaction_count(), 1);
        assert_eq!(
            rebuilt.list_transactions_by_owner(tx.owner_id).await.unwrap(),
            vec![tx]
        );
        assert_eq!(
            rebuilt.get_rate(Country::Kenya).await.unwrap().unwrap().version,
            1
        );
    }
}
