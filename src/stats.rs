//! Administrator dashboard statistics

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::warn;

use crate::fee::profit;
use crate::identity::Profile;
use crate::models::Transaction;
use crate::money::round_currency;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminStats {
    pub total_users: usize,
    /// Profiles not yet approved
    pub pending_approvals: usize,
    pub total_transactions: usize,
    /// Sum of source amounts
    pub total_volume: Decimal,
    /// Sum of each transaction's fee percentage applied to its source amount
    pub total_profit: Decimal,
}

/// Aggregate over profiles and transactions
///
/// Profit uses the fee percentage captured when each transaction was
/// created, so later rate updates do not rewrite past profit. Sums saturate
/// at `Decimal::MAX` instead of overflowing.
pub fn compute_stats(profiles: &[Profile], transactions: &[Transaction]) -> AdminStats {
    let mut total_volume = Decimal::ZERO;
    let mut total_profit = Decimal::ZERO;
    let mut saturated = false;
    for tx in transactions {
        let fee = profit(tx.source_amount, tx.rate.fee_percentage).unwrap_or_else(|| {
            saturated = true;
            Decimal::MAX
        });
        saturated |= total_volume.checked_add(tx.source_amount).is_none()
            || total_profit.checked_add(fee).is_none();
        total_volume = total_volume.saturating_add(tx.source_amount);
        total_profit = total_profit.saturating_add(fee);
    }
    if saturated {
        warn!(
            transactions = transactions.len(),
            "Stats totals saturated at Decimal::MAX"
        );
    }

    AdminStats {
        total_users: profiles.len(),
        pending_approvals: profiles.iter().filter(|p| !p.is_approved).count(),
        total_transactions: transactions.len(),
        total_volume: round_currency(total_volume),
        total_profit: round_currency(total_profit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::Role;
    use crate::core_types::TransactionId;
    use crate::corridor::{Country, PaymentMethod};
    use crate::lifecycle::{TransactionStage, TransactionStatus};
    use crate::models::RateSnapshot;
    use chrono::Utc;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn tx(amount: &str, fee_percentage: &str) -> Transaction {
        let now = Utc::now();
        Transaction {
            id: TransactionId::new(),
            owner_id: uuid::Uuid::new_v4(),
            source_amount: dec(amount),
            destination_amount: dec("1"),
            fee: dec("2.99"),
            total_charge: dec(amount).saturating_add(dec("2.99")),
            rate: RateSnapshot {
                exchange_rate: dec("1.27"),
                fee_percentage: dec(fee_percentage),
                version: 1,
            },
            recipient_name: "r".into(),
            recipient_mobile: "m".into(),
            country: Country::Somalia,
            payment_method: PaymentMethod::EvcPlus,
            status: TransactionStatus::Pending,
            stage: TransactionStage::MoneyCollection,
            created_at: now,
            updated_at: now,
        }
    }

    fn profile(is_approved: bool) -> Profile {
        Profile {
            user_id: uuid::Uuid::new_v4(),
            full_name: "n".into(),
            mobile_number: "m".into(),
            role: Role::User,
            is_approved,
        }
    }

    #[test]
    fn test_empty() {
        let stats = compute_stats(&[], &[]);
        assert_eq!(stats.total_users, 0);
        assert_eq!(stats.total_volume, Decimal::ZERO);
        assert_eq!(stats.total_profit, Decimal::ZERO);
    }

    #[test]
    fn test_aggregates() {
        let profiles = [profile(true), profile(false), profile(false)];
        let txs = [tx("100", "2"), tx("250.50", "1.5")];
        let stats = compute_stats(&profiles, &txs);

        assert_eq!(stats.total_users, 3);
        assert_eq!(stats.pending_approvals, 2);
        assert_eq!(stats.total_transactions, 2);
        assert_eq!(stats.total_volume, dec("350.50"));
        // 2.00 + 3.76 (3.7575 rounded)
        assert_eq!(stats.total_profit, dec("5.76"));
    }

    #[test]
    fn test_near_max_amounts_saturate() {
        let txs = [
            tx("50000000000000000000000000000", "2"),
            tx("50000000000000000000000000000", "2"),
            tx("79228162514264337593543950335", "99"),
        ];
        let stats = compute_stats(&[], &txs);
        assert_eq!(stats.total_transactions, 3);
        assert_eq!(stats.total_volume, Decimal::MAX);
        assert_eq!(stats.total_profit, Decimal::MAX);
    }

    #[test]
    fn test_large_profit_without_saturation() {
        let txs = [tx("1000000.00", "1.5"), tx("1000000.00", "2")];
        let stats = compute_stats(&[], &txs);
        assert_eq!(stats.total_volume, dec("2000000.00"));
        assert_eq!(stats.total_profit, dec("35000.00"));
    }
}
