//! Savings ledger handlers. Every route requires a bearer token.
//!
//! ```text
//! GET  /savings/balance
//! POST /savings/deposit  {"amount": 10.5}
//! POST /savings/withdraw {"amount": 4}
//! GET  /savings/history
//! ```

use actix_web::{get, post, web};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{Money, Transaction, TransactionKind};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::parse_amount;

/// Body for deposit and withdraw.
///
/// `amount` is kept as raw JSON so non-numeric values are reported as
/// `invalid_amount` rather than a generic body error.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct AmountRequest {
    #[serde(default)]
    pub amount: Option<Value>,
}

/// Response body carrying the balance after the operation.
#[derive(Debug, Serialize, Deserialize)]
pub struct BalanceResponse {
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
}

impl From<Money> for BalanceResponse {
    fn from(balance: Money) -> Self {
        Self {
            balance: balance.to_decimal(),
        }
    }
}

/// One ledger entry as returned to clients.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDto {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
}

impl From<Transaction> for TransactionDto {
    fn from(tx: Transaction) -> Self {
        Self {
            id: tx.id.to_string(),
            kind: tx.kind,
            amount: tx.amount.to_decimal(),
            created_at: tx.created_at,
        }
    }
}

/// Response body for `GET /savings/history`, newest entry first.
#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub history: Vec<TransactionDto>,
}

#[get("/balance")]
pub async fn get_balance(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
) -> ApiResult<web::Json<BalanceResponse>> {
    let balance = state.ledger.balance(user.user_id()).await?;
    Ok(web::Json(balance.into()))
}

#[post("/deposit")]
pub async fn deposit_funds(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<AmountRequest>,
) -> ApiResult<web::Json<BalanceResponse>> {
    let amount = parse_amount(payload.amount.as_ref())?;
    let balance = state.ledger.deposit(user.user_id(), amount).await?;
    Ok(web::Json(balance.into()))
}

#[post("/withdraw")]
pub async fn withdraw_funds(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<AmountRequest>,
) -> ApiResult<web::Json<BalanceResponse>> {
    let amount = parse_amount(payload.amount.as_ref())?;
    let balance = state.ledger.withdraw(user.user_id(), amount).await?;
    Ok(web::Json(balance.into()))
}

#[get("/history")]
pub async fn get_history(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
) -> ApiResult<web::Json<HistoryResponse>> {
    let history = state.ledger.history(user.user_id()).await?;
    Ok(web::Json(HistoryResponse {
        history: history.into_iter().map(TransactionDto::from).collect(),
    }))
}

#[cfg(test)]
#[path = "savings_tests.rs"]
mod tests;
