//! PostgreSQL-backed `LedgerRepository` implementation using Diesel ORM.
//!
//! A mutation is one database transaction: `SELECT ... FOR UPDATE` on the
//! account row, the sufficiency check, the balance update and the ledger
//! insert. The row lock serialises concurrent mutations for the same account,
//! so two withdrawals can never both pass the check on a stale balance. The
//! transaction timestamp is read from the clock only once the lock is held,
//! which keeps `created_at` in commit order per account.

use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use mockable::{Clock, DefaultClock};
use tracing::warn;
use uuid::Uuid;

use crate::domain::ports::{LedgerRepository, LedgerRepositoryError};
use crate::domain::{LedgerReceipt, Money, Transaction, TransactionKind, UserId};

use super::error_mapping::{DieselFailure, classify_diesel_error};
use super::models::{NewTransactionRow, TransactionRow};
use super::pool::{DbPool, PoolError};
use super::schema::{transactions, users};

/// Diesel-backed ledger.
#[derive(Clone)]
pub struct DieselLedgerRepository {
    pool: DbPool,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl DieselLedgerRepository {
    /// Create a repository over `pool` stamping with the system clock.
    pub fn new(pool: DbPool) -> Self {
        Self::with_clock(pool, Arc::new(DefaultClock))
    }

    /// Create a repository over `pool` with an explicit clock.
    pub fn with_clock(pool: DbPool, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self { pool, clock }
    }
}

/// Failure inside the ledger transaction; any variant rolls it back.
#[derive(Debug)]
enum ApplyError {
    Diesel(diesel::result::Error),
    UserNotFound,
    InsufficientBalance,
    Overflow,
}

impl From<diesel::result::Error> for ApplyError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

impl From<ApplyError> for LedgerRepositoryError {
    fn from(error: ApplyError) -> Self {
        match error {
            ApplyError::Diesel(error) => map_diesel_error(error),
            ApplyError::UserNotFound => Self::user_not_found(),
            ApplyError::InsufficientBalance => Self::insufficient_balance(),
            ApplyError::Overflow => Self::query("balance overflow"),
        }
    }
}

fn map_pool_error(error: PoolError) -> LedgerRepositoryError {
    LedgerRepositoryError::connection(error.into_message())
}

fn map_diesel_error(error: diesel::result::Error) -> LedgerRepositoryError {
    match classify_diesel_error(error) {
        DieselFailure::Connection(message) => LedgerRepositoryError::connection(message),
        DieselFailure::ForeignKeyViolation { .. } => LedgerRepositoryError::user_not_found(),
        DieselFailure::UniqueViolation { constraint } => {
            warn!(?constraint, "unexpected unique violation on ledger");
            LedgerRepositoryError::query("constraint violation")
        }
        DieselFailure::Query(message) => LedgerRepositoryError::query(message),
    }
}

/// Balance after applying `kind` to `current`.
fn next_balance(current: i64, kind: TransactionKind, amount: i64) -> Result<i64, ApplyError> {
    match kind {
        TransactionKind::Deposit => current.checked_add(amount).ok_or(ApplyError::Overflow),
        TransactionKind::Withdraw if current < amount => Err(ApplyError::InsufficientBalance),
        TransactionKind::Withdraw => Ok(current - amount),
    }
}

#[async_trait]
impl LedgerRepository for DieselLedgerRepository {
    async fn balance(&self, user_id: &UserId) -> Result<Money, LedgerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let balance: Option<i64> = users::table
            .find(user_id.as_uuid())
            .select(users::balance_minor)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        balance
            .map(Money::from_minor)
            .ok_or_else(LedgerRepositoryError::user_not_found)
    }

    async fn apply(
        &self,
        user_id: &UserId,
        kind: TransactionKind,
        amount: Money,
    ) -> Result<LedgerReceipt, LedgerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let account = *user_id.as_uuid();
        let amount_minor = amount.minor_units();
        let transaction_id = Uuid::new_v4();
        let clock = Arc::clone(&self.clock);

        let (balance_minor, created_at) = conn
            .transaction::<_, ApplyError, _>(|conn| {
                async move {
                    let current: i64 = users::table
                        .find(account)
                        .select(users::balance_minor)
                        .for_update()
                        .first(conn)
                        .await
                        .optional()?
                        .ok_or(ApplyError::UserNotFound)?;
                    let balance_minor = next_balance(current, kind, amount_minor)?;
                    let now = clock.utc();

                    diesel::update(users::table.find(account))
                        .set((
                            users::balance_minor.eq(balance_minor),
                            users::updated_at.eq(now),
                        ))
                        .execute(conn)
                        .await?;

                    diesel::insert_into(transactions::table)
                        .values(&NewTransactionRow {
                            id: transaction_id,
                            user_id: account,
                            kind: kind.as_str(),
                            amount_minor,
                            created_at: now,
                        })
                        .execute(conn)
                        .await?;

                    Ok((balance_minor, now))
                }
                .scope_boxed()
            })
            .await?;

        Ok(LedgerReceipt {
            transaction: Transaction {
                id: transaction_id,
                user_id: user_id.clone(),
                kind,
                amount,
                created_at,
            },
            balance: Money::from_minor(balance_minor),
        })
    }

    async fn history(&self, user_id: &UserId) -> Result<Vec<Transaction>, LedgerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<TransactionRow> = transactions::table
            .filter(transactions::user_id.eq(user_id.as_uuid()))
            .order((transactions::created_at.desc(), transactions::seq.desc()))
            .select(TransactionRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        if rows.is_empty() {
            let exists: Option<Uuid> = users::table
                .find(user_id.as_uuid())
                .select(users::id)
                .first(&mut conn)
                .await
                .optional()
                .map_err(map_diesel_error)?;
            if exists.is_none() {
                return Err(LedgerRepositoryError::user_not_found());
            }
        }

        rows.into_iter()
            .map(|row| Transaction::try_from(row).map_err(LedgerRepositoryError::query))
            .collect()
    }
}
