//! Conversion Engine
//!
//! Pure conversion of a source amount under one rate entry and fee policy.
//! No I/O and no shared state: safe to call on every keystroke with the same
//! rate held fixed.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::corridor::Country;
use crate::error::RemitError;
use crate::fee::FeePolicy;
use crate::models::RateSnapshot;
use crate::money::{SOURCE_DECIMALS, parse_amount, round_currency, validate_amount};

/// Result of converting one source amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub source_amount: Decimal,
    /// Amount the recipient receives, in the destination currency
    pub destination_amount: Decimal,
    /// Charge to the sender on top of the source amount
    pub fee: Decimal,
    /// `source_amount + fee`, what the sender pays
    pub total_charge: Decimal,
}

impl Quote {
    /// All-zero quote: "not ready to submit"
    pub const ZERO: Quote = Quote {
        source_amount: Decimal::ZERO,
        destination_amount: Decimal::ZERO,
        fee: Decimal::ZERO,
        total_charge: Decimal::ZERO,
    };

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.destination_amount.is_zero()
    }
}

/// Quote for live input; never an `Err`
///
/// Invalid input produces [`Quote::ZERO`] together with the validation error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LiveQuote {
    pub quote: Quote,
    /// Currency of `quote.destination_amount`
    pub destination_currency: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LiveQuote {
    /// Whether a transaction may be submitted with this quote
    #[inline]
    pub fn is_ready(&self) -> bool {
        self.error.is_none() && !self.quote.is_zero()
    }
}

fn too_large() -> RemitError {
    RemitError::Validation("amount too large".into())
}

/// Convert a validated source amount
///
/// # Formula
/// ```text
/// destination_amount = round_half_up(source_amount * exchange_rate, 2)
/// fee                = policy.sender_fee(source_amount, fee_percentage)
/// total_charge       = source_amount + fee
/// ```
///
/// # Errors
/// `Validation` if `source_amount` is not positive, has more than 2 dp,
/// exceeds [`MAX_SOURCE_AMOUNT`], or any step overflows.
///
/// [`MAX_SOURCE_AMOUNT`]: crate::money::MAX_SOURCE_AMOUNT
pub fn convert(
    source_amount: Decimal,
    rate: &RateSnapshot,
    policy: &FeePolicy,
) -> Result<Quote, RemitError> {
    let source_amount = validate_amount(source_amount, SOURCE_DECIMALS)?;

    let destination_amount = rate
        .exchange_rate
        .checked_mul(source_amount)
        .map(round_currency)
        .ok_or_else(too_large)?;
    if destination_amount.is_zero() {
        return Err(RemitError::Validation(
            "amount too small: recipient would receive 0.00".into(),
        ));
    }

    let fee = policy
        .sender_fee(source_amount, rate.fee_percentage)
        .ok_or_else(too_large)?;
    let total_charge = source_amount
        .checked_add(fee)
        .map(round_currency)
        .ok_or_else(too_large)?;

    Ok(Quote {
        source_amount: round_currency(source_amount),
        destination_amount,
        fee,
        total_charge,
    })
}

/// Convert raw client input (e.g. the text of an amount field)
///
/// Non-numeric, non-positive or over-precise input yields a zero quote and
/// the validation error; this function never fails.
pub fn convert_input(
    input: &str,
    country: Country,
    rate: &RateSnapshot,
    policy: &FeePolicy,
) -> LiveQuote {
    let result = parse_amount(input, SOURCE_DECIMALS)
        .map_err(RemitError::from)
        .and_then(|amount| convert(amount, rate, policy));

    let destination_currency = country.currency();
    match result {
        Ok(quote) => LiveQuote {
            quote,
            destination_currency,
            error: None,
        },
        Err(e) => LiveQuote {
            quote: Quote::ZERO,
            destination_currency,
            error: Some(e.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::MAX_SOURCE_AMOUNT;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn rate(exchange_rate: &str, fee_percentage: &str) -> RateSnapshot {
        RateSnapshot {
            exchange_rate: dec(exchange_rate),
            fee_percentage: dec(fee_percentage),
            version: 1,
        }
    }

    #[test]
    fn test_reference_conversion() {
        let quote = convert(dec("100.00"), &rate("125.19", "2"), &FeePolicy::default()).unwrap();
        assert_eq!(quote.destination_amount, dec("12519.00"));
        assert_eq!(quote.destination_amount.to_string(), "12519.00");
        assert_eq!(quote.fee, dec("2.99"));
        assert_eq!(quote.total_charge, dec("102.99"));
    }

    #[test]
    fn test_destination_rounds_half_up() {
        // 0.05 * 1.1 = 0.055 -> 0.06
        let quote = convert(dec("0.05"), &rate("1.1", "0"), &FeePolicy::default()).unwrap();
        assert_eq!(quote.destination_amount, dec("0.06"));
        // 0.01 * 1.234 = 0.01234 -> 0.01
        let quote = convert(dec("0.01"), &rate("1.234", "0"), &FeePolicy::default()).unwrap();
        assert_eq!(quote.destination_amount, dec("0.01"));
    }

    #[test]
    fn test_stable_under_repetition() {
        let r = rate("0.0079", "1.5");
        let policy = FeePolicy::default();
        let first = convert(dec("987.65"), &r, &policy).unwrap();
        for _ in 0..100 {
            assert_eq!(convert(dec("987.65"), &r, &policy).unwrap(), first);
        }
    }

    #[test]
    fn test_percentage_fee_policy() {
        let policy = FeePolicy {
            flat_fee: dec("2.99"),
            charge_percentage_fee: true,
        };
        let quote = convert(dec("200"), &rate("165", "1.5"), &policy).unwrap();
        assert_eq!(quote.fee, dec("5.99"));
        assert_eq!(quote.total_charge, dec("205.99"));
    }

    #[test]
    fn test_rejects_non_positive() {
        let r = rate("125.19", "0");
        assert!(convert(Decimal::ZERO, &r, &FeePolicy::default()).is_err());
        assert!(convert(dec("-10"), &r, &FeePolicy::default()).is_err());
    }

    #[test]
    fn test_huge_amounts_are_validation_errors() {
        let policy = FeePolicy {
            flat_fee: dec("2.99"),
            charge_percentage_fee: true,
        };
        for amount in [
            Decimal::MAX,
            dec("79228162514264337593543950335"),
            dec("50000000000000000000000000000"),
            dec("1000000.01"),
        ] {
            for r in [rate("0.5", "2"), rate("1.27", "2"), rate("125.19", "99")] {
                let err = convert(amount, &r, &policy).unwrap_err();
                assert_eq!(err.code(), "VALIDATION_ERROR", "amount {}", amount);
            }
        }
    }

    #[test]
    fn test_largest_amount_converts() {
        let policy = FeePolicy {
            flat_fee: dec("2.99"),
            charge_percentage_fee: true,
        };
        let quote = convert(MAX_SOURCE_AMOUNT, &rate("125.19", "1.5"), &policy).unwrap();
        assert_eq!(quote.destination_amount, dec("125190000.00"));
        assert_eq!(quote.fee, dec("15002.99"));
        assert_eq!(quote.total_charge, dec("1015002.99"));
    }

    #[test]
    fn test_overflowing_rate_is_validation_error() {
        let r = rate("79228162514264337593543950", "0");
        let err = convert(dec("1000000"), &r, &FeePolicy::default()).unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_rejects_amount_converting_to_zero() {
        // 0.01 * 0.0079 = 0.000079 -> 0.00
        let err = convert(dec("0.01"), &rate("0.0079", "0"), &FeePolicy::default()).unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_live_quote_invalid_input_is_zero_not_error() {
        let r = rate("125.19", "0");
        for input in ["", "abc", "0", "-5", "1.234", "1e2"] {
            let live = convert_input(input, Country::Kenya, &r, &FeePolicy::default());
            assert_eq!(live.quote, Quote::ZERO, "input {:?}", input);
            assert!(live.error.is_some(), "input {:?}", input);
            assert!(!live.is_ready());
            assert_eq!(live.destination_currency, "KES");
        }

        let live = convert_input(
            "79228162514264337593543950335",
            Country::Somalia,
            &r,
            &FeePolicy::default(),
        );
        assert_eq!(live.quote, Quote::ZERO);
        assert_eq!(live.destination_currency, "USD");
        assert!(live.error.is_some());
    }

    #[test]
    fn test_live_quote_recomputes_per_keystroke() {
        let r = rate("125.19", "0");
        let policy = FeePolicy::default();
        let amounts: Vec<Decimal> = ["1", "10", "100", "100.0", "100.00"]
            .iter()
            .map(|s| {
                convert_input(s, Country::Kenya, &r, &policy)
                    .quote
                    .destination_amount
            })
            .collect();
        assert_eq!(
            amounts,
            vec![
                dec("125.19"),
                dec("1251.90"),
                dec("12519.00"),
                dec("12519.00"),
                dec("12519.00")
            ]
        );
        let live = convert_input("100", Country::Kenya, &r, &policy);
        assert!(live.is_ready());
        assert_eq!(live.destination_currency, "KES");
    }
}
