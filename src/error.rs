//! Remittance Error Types
//!
//! One error type for every boundary operation. Codes are stable strings
//! for API responses; HTTP statuses are suggestions for the gateway.

use thiserror::Error;

use crate::money::MoneyError;

/// Remittance error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemitError {
    // === Input Errors ===
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid rate: {0}")]
    InvalidRate(String),

    // === Lookup Errors ===
    #[error("No active rate for country: {0}")]
    RateNotFound(String),

    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),

    // === Access Errors ===
    #[error("User not authenticated")]
    Unauthorized,

    #[error("Insufficient role or ownership - forbidden")]
    Forbidden,

    // === Lifecycle Errors ===
    #[error("Illegal transition: {0}")]
    IllegalTransition(String),

    // === System Errors ===
    #[error("Storage error: {0}")]
    Storage(String),
}

impl RemitError {
    /// Get the error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            RemitError::Validation(_) => "VALIDATION_ERROR",
            RemitError::InvalidRate(_) => "INVALID_RATE",
            RemitError::RateNotFound(_) => "RATE_NOT_FOUND",
            RemitError::TransactionNotFound(_) => "TRANSACTION_NOT_FOUND",
            RemitError::Unauthorized => "UNAUTHORIZED",
            RemitError::Forbidden => "FORBIDDEN",
            RemitError::IllegalTransition(_) => "ILLEGAL_TRANSITION",
            RemitError::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Get HTTP status code suggestion
    pub fn http_status(&self) -> u16 {
        match self {
            RemitError::Validation(_) | RemitError::InvalidRate(_) => 400,
            RemitError::Unauthorized => 401,
            RemitError::Forbidden => 403,
            RemitError::RateNotFound(_) | RemitError::TransactionNotFound(_) => 404,
            RemitError::IllegalTransition(_) => 409,
            RemitError::Storage(_) => 500,
        }
    }

    /// Numeric code used in the `{code, msg, data}` response envelope
    pub fn api_code(&self) -> i32 {
        match self {
            RemitError::Validation(_) => 1001,
            RemitError::InvalidRate(_) => 1002,
            RemitError::Unauthorized => 2001,
            RemitError::Forbidden => 2003,
            RemitError::RateNotFound(_) => 4001,
            RemitError::TransactionNotFound(_) => 4002,
            RemitError::IllegalTransition(_) => 4091,
            RemitError::Storage(_) => 5000,
        }
    }
}

impl From<MoneyError> for RemitError {
    fn from(e: MoneyError) -> Self {
        RemitError::Validation(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(RemitError::Forbidden.code(), "FORBIDDEN");
        assert_eq!(
            RemitError::IllegalTransition("x".into()).code(),
            "ILLEGAL_TRANSITION"
        );
        assert_eq!(RemitError::Unauthorized.code(), "UNAUTHORIZED");
    }

    #[test]
    fn test_http_status() {
        assert_eq!(RemitError::Unauthorized.http_status(), 401);
        assert_eq!(RemitError::Forbidden.http_status(), 403);
        assert_eq!(RemitError::Validation("x".into()).http_status(), 400);
        assert_eq!(RemitError::RateNotFound("Kenya".into()).http_status(), 404);
        assert_eq!(RemitError::Storage("disk".into()).http_status(), 500);
    }

    #[test]
    fn test_money_error_maps_to_validation() {
        let err: RemitError = MoneyError::InvalidAmount.into();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }
}
