//! Rate Table
//!
//! One active exchange-rate/fee-percentage pair per destination country,
//! stored as a versioned record. Every read goes to the store: there is no
//! process-wide cached rate.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::corridor::Country;
use crate::error::RemitError;
use crate::models::RateEntry;
use crate::money::{MoneyError, RATE_DECIMALS, parse_decimal};
use crate::store::RemitStore;

/// Initial rate for one country, from configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateSeed {
    pub country: Country,
    pub exchange_rate: Decimal,
    pub fee_percentage: Decimal,
}

/// Check a candidate entry
///
/// - `exchange_rate > 0`
/// - `0 <= fee_percentage < 100`
/// - at most 6 decimal places each
pub fn validate_rate(exchange_rate: Decimal, fee_percentage: Decimal) -> Result<(), RemitError> {
    if exchange_rate <= Decimal::ZERO {
        return Err(RemitError::InvalidRate(format!(
            "exchange rate must be positive, got {}",
            exchange_rate
        )));
    }
    if fee_percentage < Decimal::ZERO || fee_percentage >= Decimal::ONE_HUNDRED {
        return Err(RemitError::InvalidRate(format!(
            "fee percentage must be in [0, 100), got {}",
            fee_percentage
        )));
    }
    for (field, value) in [
        ("exchange rate", exchange_rate),
        ("fee percentage", fee_percentage),
    ] {
        if value.normalize().scale() > RATE_DECIMALS {
            return Err(RemitError::InvalidRate(format!(
                "{} has more than {} decimal places",
                field, RATE_DECIMALS
            )));
        }
    }
    Ok(())
}

/// Parse administrator input for a rate update
pub fn parse_rate_input(
    exchange_rate: &str,
    fee_percentage: &str,
) -> Result<(Decimal, Decimal), RemitError> {
    let to_invalid = |field: &str, e: MoneyError| {
        RemitError::InvalidRate(format!("{}: {}", field, e))
    };
    let exchange_rate =
        parse_decimal(exchange_rate, RATE_DECIMALS).map_err(|e| to_invalid("exchange rate", e))?;
    let fee_percentage = parse_decimal(fee_percentage, RATE_DECIMALS)
        .map_err(|e| to_invalid("fee percentage", e))?;
    Ok((exchange_rate, fee_percentage))
}

/// Rate table over a store
#[derive(Clone)]
pub struct RateTable {
    store: Arc<dyn RemitStore>,
}

impl RateTable {
    pub fn new(store: Arc<dyn RemitStore>) -> Self {
        Self { store }
    }

    /// The entry active right now
    pub async fn get_active_rate(&self, country: Country) -> Result<RateEntry, RemitError> {
        self.store
            .get_rate(country)
            .await?
            .ok_or_else(|| RemitError::RateNotFound(country.to_string()))
    }

    pub async fn list_rates(&self) -> Result<Vec<RateEntry>, RemitError> {
        self.store.list_rates().await
    }

    /// Replace a country's entry; both fields change together or not at all
    ///
    /// Authorization is the caller's responsibility.
    pub async fn update_rate(
        &self,
        country: Country,
        exchange_rate: Decimal,
        fee_percentage: Decimal,
    ) -> Result<RateEntry, RemitError> {
        if let Err(e) = validate_rate(exchange_rate, fee_percentage) {
            warn!(country = %country, error = %e, "Rate update rejected");
            return Err(e);
        }

        let entry = self
            .store
            .replace_rate(country, exchange_rate, fee_percentage, Utc::now())
            .await?;
        info!(
            country = %country,
            exchange_rate = %entry.exchange_rate,
            fee_percentage = %entry.fee_percentage,
            version = entry.version,
            "Rate updated"
        );
        Ok(entry)
    }

    /// Install configured rates for countries that have none yet
    ///
    /// Entries already in the store (e.g. restored from a snapshot) win.
    pub async fn seed(&self, seeds: &[RateSeed]) -> Result<usize, RemitError> {
        let mut inserted = 0;
        for seed in seeds {
            validate_rate(seed.exchange_rate, seed.fee_percentage)?;
            if self
                .store
                .insert_rate_if_absent(
                    seed.country,
                    seed.exchange_rate,
                    seed.fee_percentage,
                    Utc::now(),
                )
                .await?
                .is_some()
            {
                inserted += 1;
            }
        }
        info!(inserted, configured = seeds.len(), "Rate table seeded");
        Ok(inserted)
    }
}
