//! Gateway request/response types
//!
//! - `ApiResponse<T>`: unified `{code, msg, data}` envelope
//! - `ApiError`: `RemitError` rendered as an HTTP response
//! - Request DTOs: amounts and rates arrive as strings and are parsed strictly

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::access::Caller;
use crate::corridor::{Country, PaymentMethod};
use crate::error::RemitError;
use crate::lifecycle::{StateDelta, TransactionStage, TransactionStatus};
use crate::money::{SOURCE_DECIMALS, parse_amount};
use crate::service::CreateTransaction;

// ============================================================================
// Unified API Response Format
// ============================================================================

/// Unified API response wrapper
///
/// - code: 0 = success, non-zero = error code
/// - msg: short message description
/// - data: payload on success, absent on error
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: 0,
            msg: "ok".to_string(),
            data: Some(data),
        }
    }

    pub fn error(code: i32, msg: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            code,
            msg: msg.into(),
            data: None,
        }
    }
}

/// Error half of every handler result
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: i32,
    pub msg: String,
}

impl From<RemitError> for ApiError {
    fn from(e: RemitError) -> Self {
        let status =
            StatusCode::from_u16(e.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(code = e.code(), error = %e, "Request failed");
        }
        Self {
            status,
            code: e.api_code(),
            msg: e.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ApiResponse::<()>::error(self.code, self.msg)),
        )
            .into_response()
    }
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

#[inline]
pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::success(data)))
}

/// Caller resolved by the bearer middleware; `None` for anonymous requests
#[derive(Debug, Clone, Copy, Default)]
pub struct CurrentCaller(pub Option<Caller>);

impl CurrentCaller {
    pub fn get(&self) -> Option<&Caller> {
        self.0.as_ref()
    }
}

// ============================================================================
// Path / field parsing
// ============================================================================

pub fn parse_country(raw: &str) -> Result<Country, RemitError> {
    Country::from_str(raw).map_err(RemitError::Validation)
}

fn parse_payment_method(raw: Option<&str>) -> Result<Option<PaymentMethod>, RemitError> {
    raw.filter(|s| !s.trim().is_empty())
        .map(|s| PaymentMethod::from_str(s).map_err(RemitError::Validation))
        .transpose()
}

// ============================================================================
// Request DTOs
// ============================================================================

/// POST /quote
#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    pub country: String,
    /// Raw amount text, e.g. the content of an input field
    pub amount: String,
}

/// POST /transactions
#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    pub source_amount: String,
    pub recipient_name: String,
    pub recipient_mobile: String,
    pub country: String,
    #[serde(default)]
    pub payment_method: Option<String>,
}

impl CreateTransactionRequest {
    pub fn into_command(self) -> Result<CreateTransaction, RemitError> {
        Ok(CreateTransaction {
            source_amount: parse_amount(&self.source_amount, SOURCE_DECIMALS)?,
            recipient_name: self.recipient_name,
            recipient_mobile: self.recipient_mobile,
            country: parse_country(&self.country)?,
            payment_method: parse_payment_method(self.payment_method.as_deref())?,
        })
    }
}

/// PATCH /admin/transactions/{id}/state
#[derive(Debug, Deserialize)]
pub struct SetStateRequest {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub stage: Option<String>,
}

impl SetStateRequest {
    pub fn into_delta(self) -> Result<StateDelta, RemitError> {
        let status = self
            .status
            .as_deref()
            .map(TransactionStatus::from_str)
            .transpose()
            .map_err(RemitError::Validation)?;
        let stage = self
            .stage
            .as_deref()
            .map(TransactionStage::from_str)
            .transpose()
            .map_err(RemitError::Validation)?;
        Ok(StateDelta { status, stage })
    }
}

/// PUT /admin/rates/{country}
#[derive(Debug, Deserialize)]
pub struct UpdateRateRequest {
    pub exchange_rate: String,
    pub fee_percentage: String,
}

#[derive(Debug, Serialize)]
pub struct HealthData {
    pub status: &'static str,
    pub version: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_create_request_parsing() {
        let req = CreateTransactionRequest {
            source_amount: "100.50".into(),
            recipient_name: "Amina".into(),
            recipient_mobile: "+254700000000".into(),
            country: "kenya".into(),
            payment_method: Some("money collection".into()),
        };
        let cmd = req.into_command().unwrap();
        assert_eq!(cmd.source_amount, Decimal::new(10050, 2));
        assert_eq!(cmd.country, Country::Kenya);
        assert_eq!(cmd.payment_method, Some(PaymentMethod::MoneyCollection));
    }

    #[test]
    fn test_create_request_rejects_bad_amount() {
        for amount in ["", "abc", "0", "-1", "1.234", ".5"] {
            let req = CreateTransactionRequest {
                source_amount: amount.into(),
                recipient_name: "Amina".into(),
                recipient_mobile: "+254700000000".into(),
                country: "Kenya".into(),
                payment_method: None,
            };
            assert!(
                matches!(req.into_command(), Err(RemitError::Validation(_))),
                "{}",
                amount
            );
        }
    }

    #[test]
    fn test_set_state_request() {
        let delta = SetStateRequest {
            status: Some("approved".into()),
            stage: Some("Recipient Received".into()),
        }
        .into_delta()
        .unwrap();
        assert_eq!(delta.status, Some(TransactionStatus::Approved));
        assert_eq!(delta.stage, Some(TransactionStage::RecipientReceived));

        let bad = SetStateRequest {
            status: Some("shipped".into()),
            stage: None,
        };
        assert!(matches!(bad.into_delta(), Err(RemitError::Validation(_))));
    }

    #[test]
    fn test_api_error_from_remit_error() {
        let err = ApiError::from(RemitError::Forbidden);
        assert_eq!(err.status, StatusCode::FORBIDDEN);
        assert_eq!(err.code, RemitError::Forbidden.api_code());
    }
}
