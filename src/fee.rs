//! Fee calculation utilities
//!
//! Fee percentages are plain percent values: `1.5` = 1.5%.
//! The sender is charged a flat fee per transfer; the rate table's fee
//! percentage feeds profit reporting and, when the policy says so, is added
//! to the sender's charge as well.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money::round_currency;

/// Default flat fee charged per transfer (GBP 2.99)
pub const DEFAULT_FLAT_FEE: Decimal = Decimal::from_parts(299, 0, 0, false, 2);

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Calculate a percentage of an amount, rounded half-up to 2 dp.
///
/// Returns `None` if the product overflows `Decimal`.
///
/// # Example
/// ```
/// use remit_ledger::fee::percentage_of;
/// use rust_decimal::Decimal;
/// // 1.5% of 200.00 = 3.00
/// let fee = percentage_of(Decimal::new(20000, 2), Decimal::new(15, 1));
/// assert_eq!(fee, Some(Decimal::new(300, 2)));
/// assert_eq!(percentage_of(Decimal::MAX, Decimal::TEN), None);
/// ```
#[inline]
pub fn percentage_of(amount: Decimal, percentage: Decimal) -> Option<Decimal> {
    amount
        .checked_mul(percentage)?
        .checked_div(HUNDRED)
        .map(round_currency)
}

/// How the sender is charged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeePolicy {
    /// Fixed charge per transfer, in the source currency
    pub flat_fee: Decimal,
    /// Also charge the rate table's fee percentage to the sender
    #[serde(default)]
    pub charge_percentage_fee: bool,
}

impl Default for FeePolicy {
    fn default() -> Self {
        Self {
            flat_fee: DEFAULT_FLAT_FEE,
            charge_percentage_fee: false,
        }
    }
}

impl FeePolicy {
    /// Fee charged to the sender for `amount` under `fee_percentage`
    ///
    /// `None` on arithmetic overflow.
    pub fn sender_fee(&self, amount: Decimal, fee_percentage: Decimal) -> Option<Decimal> {
        let flat = round_currency(self.flat_fee);
        if self.charge_percentage_fee {
            flat.checked_add(percentage_of(amount, fee_percentage)?)
        } else {
            Some(flat)
        }
    }
}

/// Operator profit on a transfer, as reported to administrators
#[inline]
pub fn profit(amount: Decimal, fee_percentage: Decimal) -> Option<Decimal> {
    percentage_of(amount, fee_percentage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_default_flat_fee() {
        assert_eq!(DEFAULT_FLAT_FEE, dec("2.99"));
        let policy = FeePolicy::default();
        assert_eq!(policy.sender_fee(dec("100"), dec("5")), Some(dec("2.99")));
    }

    #[test]
    fn test_percentage_fee_charged_when_enabled() {
        let policy = FeePolicy {
            flat_fee: dec("2.99"),
            charge_percentage_fee: true,
        };
        // 2.99 + 5% of 100 = 7.99
        assert_eq!(policy.sender_fee(dec("100"), dec("5")), Some(dec("7.99")));
    }

    #[test]
    fn test_percentage_of_rounds_half_up() {
        // 1.5% of 0.33 = 0.00495 -> 0.00
        assert_eq!(percentage_of(dec("0.33"), dec("1.5")), Some(dec("0.00")));
        // 2.5% of 0.99 = 0.02475 -> 0.02
        assert_eq!(percentage_of(dec("0.99"), dec("2.5")), Some(dec("0.02")));
        // 10% of 0.05 = 0.005 -> 0.01
        assert_eq!(percentage_of(dec("0.05"), dec("10")), Some(dec("0.01")));
    }

    #[test]
    fn test_zero_percentage() {
        assert_eq!(profit(dec("250"), Decimal::ZERO), Some(dec("0.00")));
    }

    #[test]
    fn test_overflow_is_none_not_panic() {
        assert_eq!(percentage_of(Decimal::MAX, dec("99.999999")), None);
        let policy = FeePolicy {
            flat_fee: Decimal::MAX,
            charge_percentage_fee: true,
        };
        assert_eq!(policy.sender_fee(dec("100"), dec("5")), None);
    }
}
