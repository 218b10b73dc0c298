//! HTTP handlers
//!
//! Thin adapters: parse the request, call [`RemitService`], wrap the result.
//! Handlers that parse path or body input check the caller first, so an
//! anonymous or under-privileged request is refused before its input is
//! judged. The service repeats the check.
//!
//! [`RemitService`]: crate::service::RemitService

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
};

use super::state::AppState;
use super::types::{
    ApiResult, CreateTransactionRequest, CurrentCaller, HealthData, QuoteRequest, SetStateRequest,
    UpdateRateRequest, ok, parse_country,
};
use crate::access::{self, Operation};
use crate::audit::AuditEntry;
use crate::conversion::LiveQuote;
use crate::core_types::TransactionId;
use crate::error::RemitError;
use crate::models::{RateEntry, Transaction, TransactionView};
use crate::rates::parse_rate_input;
use crate::stats::AdminStats;

fn parse_tx_id(raw: &str) -> Result<TransactionId, RemitError> {
    TransactionId::from_str(raw)
        .map_err(|_| RemitError::Validation(format!("invalid transaction id: {}", raw)))
}

/// GET /api/v1/health
pub async fn health_check() -> ApiResult<HealthData> {
    ok(HealthData {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /api/v1/rates
pub async fn list_rates(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CurrentCaller>,
) -> ApiResult<Vec<RateEntry>> {
    ok(state.service.list_rates(caller.get()).await?)
}

/// GET /api/v1/rates/{country}
pub async fn get_rate(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CurrentCaller>,
    Path(country): Path<String>,
) -> ApiResult<RateEntry> {
    access::require(caller.get(), Operation::ReadRate)?;
    let country = parse_country(&country)?;
    ok(state.service.get_rate(caller.get(), country).await?)
}

/// POST /api/v1/quote
///
/// Bad amount text still answers 200 with a zero quote and `error` set.
pub async fn quote(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CurrentCaller>,
    Json(req): Json<QuoteRequest>,
) -> ApiResult<LiveQuote> {
    access::require(caller.get(), Operation::ReadRate)?;
    let country = parse_country(&req.country)?;
    ok(state
        .service
        .quote(caller.get(), country, &req.amount)
        .await?)
}

/// POST /api/v1/transactions
pub async fn create_transaction(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CurrentCaller>,
    Json(req): Json<CreateTransactionRequest>,
) -> ApiResult<Transaction> {
    let Some(who) = caller.get() else {
        return Err(RemitError::Unauthorized.into());
    };
    let command = req.into_command()?;
    ok(state
        .service
        .create_transaction(Some(who), command)
        .await?)
}

/// GET /api/v1/transactions
pub async fn list_my_transactions(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CurrentCaller>,
) -> ApiResult<Vec<Transaction>> {
    ok(state.service.list_my_transactions(caller.get()).await?)
}

/// GET /api/v1/transactions/{id}
pub async fn get_transaction(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CurrentCaller>,
    Path(id): Path<String>,
) -> ApiResult<Transaction> {
    // Ownership is only known after the lookup
    if caller.get().is_none() {
        return Err(RemitError::Unauthorized.into());
    }
    let id = parse_tx_id(&id)?;
    ok(state.service.get_transaction(caller.get(), id).await?)
}

/// GET /api/v1/admin/transactions
pub async fn list_all_transactions(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CurrentCaller>,
) -> ApiResult<Vec<TransactionView>> {
    ok(state.service.list_all_transactions(caller.get()).await?)
}

/// PATCH /api/v1/admin/transactions/{id}/state
pub async fn set_transaction_state(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CurrentCaller>,
    Path(id): Path<String>,
    Json(req): Json<SetStateRequest>,
) -> ApiResult<Transaction> {
    access::require(caller.get(), Operation::SetState)?;
    let id = parse_tx_id(&id)?;
    let delta = req.into_delta()?;
    ok(state
        .service
        .set_transaction_state(caller.get(), id, delta)
        .await?)
}

/// GET /api/v1/admin/transactions/{id}/audit
pub async fn audit_trail(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CurrentCaller>,
    Path(id): Path<String>,
) -> ApiResult<Vec<AuditEntry>> {
    access::require(caller.get(), Operation::ReadAll)?;
    let id = parse_tx_id(&id)?;
    ok(state.service.audit_trail(caller.get(), id).await?)
}

/// PUT /api/v1/admin/rates/{country}
pub async fn update_rate(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CurrentCaller>,
    Path(country): Path<String>,
    Json(req): Json<UpdateRateRequest>,
) -> ApiResult<RateEntry> {
    access::require(caller.get(), Operation::UpdateRate)?;
    let country = parse_country(&country)?;
    let (exchange_rate, fee_percentage) =
        parse_rate_input(&req.exchange_rate, &req.fee_percentage)?;
    ok(state
        .service
        .update_rate(caller.get(), country, exchange_rate, fee_percentage)
        .await?)
}

/// GET /api/v1/admin/stats
pub async fn stats(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CurrentCaller>,
) -> ApiResult<AdminStats> {
    ok(state.service.stats(caller.get()).await?)
}
