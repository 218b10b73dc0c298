//! Money Parsing and Rounding Module
//!
//! Every client-supplied amount, rate or percentage enters the system through
//! this module. All values are `rust_decimal::Decimal`; floats never appear.
//!
//! ## Design Principles
//! 1. Strict format: `.5`, `5.`, `+5`, `1e3` and blanks are rejected
//! 2. No silent truncation: too many decimal places is an error
//! 3. One rounding rule: half-up at 2 decimal places for currency amounts
//!
//! ## Usage
//! ```rust
//! use remit_ledger::money::{parse_amount, round_currency, SOURCE_DECIMALS};
//! use rust_decimal::Decimal;
//!
//! let amount = parse_amount("100.50", SOURCE_DECIMALS).unwrap();
//! assert_eq!(amount, Decimal::new(10050, 2));
//! assert_eq!(round_currency(Decimal::new(12345, 3)), Decimal::new(1235, 2));
//! ```

use rust_decimal::prelude::*;
use thiserror::Error;

/// Decimal places accepted for a source (GBP) amount
pub const SOURCE_DECIMALS: u32 = 2;

/// Decimal places stored for any currency amount
pub const CURRENCY_DECIMALS: u32 = 2;

/// Decimal places accepted for an exchange rate or fee percentage
pub const RATE_DECIMALS: u32 = 6;

/// Largest source amount accepted for one transfer (GBP 1,000,000.00)
pub const MAX_SOURCE_AMOUNT: Decimal = Decimal::from_parts(100_000_000, 0, 0, false, 2);

// ============================================================================
// Error Types
// ============================================================================

/// Money parsing errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Precision overflow: provided {provided} decimals, max allowed {max}")]
    PrecisionOverflow { provided: u32, max: u32 },

    #[error("Amount must be positive")]
    InvalidAmount,

    #[error("Amount too large: maximum is {max}")]
    AmountTooLarge { max: Decimal },

    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

// ============================================================================
// Parse: Client → Internal (String → Decimal)
// ============================================================================

/// Parse a client string as a non-negative decimal in strict format
///
/// Zero is accepted here; callers decide whether zero is meaningful
/// (a fee percentage may be 0, an amount may not).
pub fn parse_decimal(input: &str, max_decimals: u32) -> Result<Decimal, MoneyError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(MoneyError::InvalidFormat("empty string".into()));
    }

    if s.starts_with('-') {
        return Err(MoneyError::InvalidAmount);
    }

    if s.starts_with('+') {
        return Err(MoneyError::InvalidFormat("+ prefix not allowed".into()));
    }

    if s.contains('e') || s.contains('E') {
        return Err(MoneyError::InvalidFormat(
            "scientific notation not allowed".into(),
        ));
    }

    // Require both sides of the dot to be non-empty
    if s.starts_with('.') {
        return Err(MoneyError::InvalidFormat(
            "missing leading zero (e.g., use 0.5 instead of .5)".into(),
        ));
    }
    if s.ends_with('.') {
        return Err(MoneyError::InvalidFormat(
            "missing fractional part (e.g., use 5.0 instead of 5.)".into(),
        ));
    }

    if !s.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return Err(MoneyError::InvalidFormat(format!("not a number: {}", s)));
    }

    let value = Decimal::from_str(s).map_err(|e| MoneyError::InvalidFormat(e.to_string()))?;

    // Trailing zeros ("10.500") are not extra precision
    let provided = value.normalize().scale();
    if provided > max_decimals {
        return Err(MoneyError::PrecisionOverflow {
            provided,
            max: max_decimals,
        });
    }

    Ok(value)
}

/// Parse a client string as a strictly positive amount, at most
/// [`MAX_SOURCE_AMOUNT`]
pub fn parse_amount(input: &str, max_decimals: u32) -> Result<Decimal, MoneyError> {
    let value = parse_decimal(input, max_decimals)?;
    validate_amount(value, max_decimals)
}

/// Check an already-typed amount against the same rules as [`parse_amount`]
pub fn validate_amount(value: Decimal, max_decimals: u32) -> Result<Decimal, MoneyError> {
    if value.is_sign_negative() || value.is_zero() {
        return Err(MoneyError::InvalidAmount);
    }
    let provided = value.normalize().scale();
    if provided > max_decimals {
        return Err(MoneyError::PrecisionOverflow {
            provided,
            max: max_decimals,
        });
    }
    if value > MAX_SOURCE_AMOUNT {
        return Err(MoneyError::AmountTooLarge {
            max: MAX_SOURCE_AMOUNT,
        });
    }
    Ok(value)
}

// ============================================================================
// Rounding and Formatting
// ============================================================================

/// Round a currency amount to 2 decimal places, half-up
///
/// Amounts in this system are never negative, so "away from zero" at the
/// midpoint is the same as half-up.
#[inline]
pub fn round_currency(value: Decimal) -> Decimal {
    let mut rounded =
        value.round_dp_with_strategy(CURRENCY_DECIMALS, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(CURRENCY_DECIMALS);
    rounded
}

/// Format an amount for display with a fixed number of decimals
pub fn format_amount(value: Decimal, display_decimals: u32) -> String {
    format!("{:.prec$}", value, prec = display_decimals as usize)
}

// ============================================================================
// Unit Tests
// ============================================================================
