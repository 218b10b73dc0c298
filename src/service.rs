//! Remittance Service
//!
//! Boundary operations. Each one authorizes the caller through
//! [`access::require`] before reading or writing anything.
//!
//! ```text
//! create_transaction:
//!   require(CreateTransaction) → validate input → read active rate
//!   → convert (snapshot) → insert {Pending, Money Collection}
//!
//! set_transaction_state:
//!   require(SetState) → store.update_transaction(id, |current| lifecycle.mutation(..))
//!                       └── runs under the record's entry lock
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::access::{self, Caller, Operation};
use crate::audit::AuditEntry;
use crate::conversion::{LiveQuote, convert, convert_input};
use crate::core_types::{TransactionId, UserId};
use crate::corridor::{Country, PaymentMethod};
use crate::error::RemitError;
use crate::fee::FeePolicy;
use crate::identity::IdentityProvider;
use crate::lifecycle::{StateDelta, TransactionLifecycle};
use crate::models::{
    NewTransaction, OwnerDisplay, RateEntry, Transaction, TransactionView, sort_newest_first,
};
use crate::rates::RateTable;
use crate::stats::{AdminStats, compute_stats};
use crate::store::RemitStore;

/// Sender's transfer request
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTransaction {
    pub source_amount: Decimal,
    pub recipient_name: String,
    pub recipient_mobile: String,
    pub country: Country,
    /// Country default when omitted
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
}

impl CreateTransaction {
    /// Check recipient fields and payment method; amounts are checked by conversion
    pub fn validate(self, owner_id: UserId) -> Result<NewTransaction, RemitError> {
        let recipient_name = required("recipient_name", &self.recipient_name)?;
        let recipient_mobile = required("recipient_mobile", &self.recipient_mobile)?;

        let payment_method = self
            .payment_method
            .unwrap_or_else(|| self.country.default_payment_method());
        if !self.country.supports(payment_method) {
            return Err(RemitError::Validation(format!(
                "payment method {} is not offered for {}",
                payment_method, self.country
            )));
        }

        Ok(NewTransaction {
            owner_id,
            source_amount: self.source_amount,
            recipient_name,
            recipient_mobile,
            country: self.country,
            payment_method,
        })
    }
}

fn required(field: &str, value: &str) -> Result<String, RemitError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RemitError::Validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

pub struct RemitService {
    rates: RateTable,
    store: Arc<dyn RemitStore>,
    identity: Arc<dyn IdentityProvider>,
    lifecycle: TransactionLifecycle,
    fee_policy: FeePolicy,
    profile_timeout: Duration,
}

impl RemitService {
    pub fn new(
        store: Arc<dyn RemitStore>,
        identity: Arc<dyn IdentityProvider>,
        lifecycle: TransactionLifecycle,
        fee_policy: FeePolicy,
        profile_timeout: Duration,
    ) -> Self {
        Self {
            rates: RateTable::new(store.clone()),
            store,
            identity,
            lifecycle,
            fee_policy,
            profile_timeout,
        }
    }

    pub fn rate_table(&self) -> &RateTable {
        &self.rates
    }

    pub fn identity(&self) -> &Arc<dyn IdentityProvider> {
        &self.identity
    }

    // ========================================================================
    // Rates
    // ========================================================================

    pub async fn get_rate(
        &self,
        caller: Option<&Caller>,
        country: Country,
    ) -> Result<RateEntry, RemitError> {
        access::require(caller, Operation::ReadRate)?;
        self.rates.get_active_rate(country).await
    }

    pub async fn list_rates(&self, caller: Option<&Caller>) -> Result<Vec<RateEntry>, RemitError> {
        access::require(caller, Operation::ReadRate)?;
        self.rates.list_rates().await
    }

    pub async fn update_rate(
        &self,
        caller: Option<&Caller>,
        country: Country,
        exchange_rate: Decimal,
        fee_percentage: Decimal,
    ) -> Result<RateEntry, RemitError> {
        let admin = access::require(caller, Operation::UpdateRate)?;
        let entry = self
            .rates
            .update_rate(country, exchange_rate, fee_percentage)
            .await?;
        info!(admin = %admin.user_id, country = %country, version = entry.version, "Rate replaced by admin");
        Ok(entry)
    }

    /// Live quote for raw amount input against the current rate
    ///
    /// Bad amount input is reported inside the [`LiveQuote`]; only access and
    /// rate lookup failures are errors.
    pub async fn quote(
        &self,
        caller: Option<&Caller>,
        country: Country,
        amount_input: &str,
    ) -> Result<LiveQuote, RemitError> {
        access::require(caller, Operation::ReadRate)?;
        let rate = self.rates.get_active_rate(country).await?;
        Ok(convert_input(
            amount_input,
            country,
            &rate.snapshot(),
            &self.fee_policy,
        ))
    }

    // ========================================================================
    // Transactions
    // ========================================================================

    pub async fn create_transaction(
        &self,
        caller: Option<&Caller>,
        request: CreateTransaction,
    ) -> Result<Transaction, RemitError> {
        let owner = caller.map(|c| c.user_id).ok_or(RemitError::Unauthorized)?;
        let caller = access::require(caller, Operation::CreateTransaction { owner })?;

        let new = request.validate(caller.user_id)?;

        // Copy of the entry active now; later rate updates do not reach it
        let rate = self.rates.get_active_rate(new.country).await?.snapshot();
        let quote = convert(new.source_amount, &rate, &self.fee_policy)?;

        let (status, stage) = TransactionLifecycle::initial_state();
        let now = Utc::now();
        let tx = Transaction {
            id: TransactionId::new(),
            owner_id: new.owner_id,
            source_amount: quote.source_amount,
            destination_amount: quote.destination_amount,
            fee: quote.fee,
            total_charge: quote.total_charge,
            rate,
            recipient_name: new.recipient_name,
            recipient_mobile: new.recipient_mobile,
            country: new.country,
            payment_method: new.payment_method,
            status,
            stage,
            created_at: now,
            updated_at: now,
        };

        self.store.insert_transaction(tx.clone()).await?;
        info!(
            tx_id = %tx.id,
            owner = %tx.owner_id,
            country = %tx.country,
            source_amount = %tx.source_amount,
            destination_amount = %tx.destination_amount,
            rate_version = tx.rate.version,
            "Transaction created"
        );
        Ok(tx)
    }

    /// The caller's own transactions, newest first
    pub async fn list_my_transactions(
        &self,
        caller: Option<&Caller>,
    ) -> Result<Vec<Transaction>, RemitError> {
        let owner = caller.map(|c| c.user_id).ok_or(RemitError::Unauthorized)?;
        access::require(caller, Operation::ReadOwn { owner })?;
        self.store.list_transactions_by_owner(owner).await
    }

    /// One transaction, for its owner or an admin
    ///
    /// Non-owners see `TransactionNotFound` for records that exist, the same
    /// as for ids that do not.
    pub async fn get_transaction(
        &self,
        caller: Option<&Caller>,
        id: TransactionId,
    ) -> Result<Transaction, RemitError> {
        let Some(who) = caller else {
            return Err(RemitError::Unauthorized);
        };
        let tx = self
            .store
            .get_transaction(id)
            .await?
            .ok_or_else(|| RemitError::TransactionNotFound(id.to_string()))?;

        match access::require(caller, Operation::ReadOwn { owner: tx.owner_id }) {
            Ok(_) => Ok(tx),
            Err(RemitError::Forbidden) => {
                debug!(tx_id = %id, user_id = %who.user_id, "Hidden transaction requested");
                Err(RemitError::TransactionNotFound(id.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    /// Every transaction, newest first, with owner display data
    ///
    /// Profile lookups run concurrently, each bounded by the configured
    /// timeout. A failed or slow lookup leaves `owner` empty for that row.
    pub async fn list_all_transactions(
        &self,
        caller: Option<&Caller>,
    ) -> Result<Vec<TransactionView>, RemitError> {
        access::require(caller, Operation::ReadAll)?;

        let mut txs = self.store.list_transactions().await?;
        sort_newest_first(&mut txs);

        let mut owners: Vec<UserId> = txs.iter().map(|t| t.owner_id).collect();
        owners.sort_unstable();
        owners.dedup();

        let lookups = owners.iter().map(|&owner| self.owner_display(owner));
        let resolved: HashMap<UserId, OwnerDisplay> = owners
            .iter()
            .copied()
            .zip(join_all(lookups).await)
            .filter_map(|(id, display)| display.map(|d| (id, d)))
            .collect();

        Ok(txs
            .into_iter()
            .map(|transaction| {
                let owner = resolved.get(&transaction.owner_id).cloned();
                TransactionView { transaction, owner }
            })
            .collect())
    }

    async fn owner_display(&self, owner: UserId) -> Option<OwnerDisplay> {
        match tokio::time::timeout(self.profile_timeout, self.identity.get_profile(owner)).await {
            Ok(Ok(profile)) => Some(OwnerDisplay {
                full_name: profile.full_name,
                mobile_number: profile.mobile_number,
            }),
            Ok(Err(e)) => {
                warn!(owner = %owner, error = %e, "Owner profile lookup failed");
                None
            }
            Err(_) => {
                warn!(
                    owner = %owner,
                    timeout_ms = self.profile_timeout.as_millis() as u64,
                    "Owner profile lookup timed out"
                );
                None
            }
        }
    }

    /// Change status and/or stage
    ///
    /// The lifecycle check and the write happen against the stored record
    /// under its lock; fields not in `delta` are left as stored.
    pub async fn set_transaction_state(
        &self,
        caller: Option<&Caller>,
        id: TransactionId,
        delta: StateDelta,
    ) -> Result<Transaction, RemitError> {
        let admin = access::require(caller, Operation::SetState)?;
        if delta.is_empty() {
            return Err(RemitError::Validation(
                "at least one of status or stage is required".into(),
            ));
        }

        let lifecycle = self.lifecycle;
        let updated = self
            .store
            .update_transaction(id, &|current: &Transaction| {
                lifecycle.mutation(current, delta, admin.user_id, Utc::now())
            })
            .await?;

        info!(
            tx_id = %id,
            admin = %admin.user_id,
            status = %updated.status,
            stage = %updated.stage,
            "Transaction state set"
        );
        Ok(updated)
    }

    pub async fn audit_trail(
        &self,
        caller: Option<&Caller>,
        id: TransactionId,
    ) -> Result<Vec<AuditEntry>, RemitError> {
        access::require(caller, Operation::ReadAll)?;
        if self.store.get_transaction(id).await?.is_none() {
            return Err(RemitError::TransactionNotFound(id.to_string()));
        }
        self.store.audit_trail(id).await
    }

    // ========================================================================
    // Statistics
    // ========================================================================

    pub async fn stats(&self, caller: Option<&Caller>) -> Result<AdminStats, RemitError> {
        access::require(caller, Operation::ViewStats)?;

        let profiles = match self.identity.list_profiles().await {
            Ok(p) => p,
            Err(e) => {
                warn!(provider = self.identity.name(), error = %e, "Profile directory unavailable, user counts degraded");
                Vec::new()
            }
        };
        let txs = self.store.list_transactions().await?;
        Ok(compute_stats(&profiles, &txs))
    }
}
