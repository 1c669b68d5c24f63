//! Savings ledger domain service.
//!
//! Implements the [`SavingsLedger`] driving port over a [`LedgerRepository`].
//! The repository owns atomicity; this service validates amounts, maps
//! repository failures onto domain errors and emits post-commit
//! notifications.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::ports::{LedgerRepository, LedgerRepositoryError, SavingsLedger};
use crate::domain::{
    Error, LedgerReceipt, Money, Notification, NotificationDispatcher, Transaction,
    TransactionKind, UserId, withdrawal_notifications,
};

/// Ledger service implementing [`SavingsLedger`].
#[derive(Clone)]
pub struct LedgerService<R> {
    repo: Arc<R>,
    notifications: NotificationDispatcher,
}

impl<R> LedgerService<R> {
    /// Create a new service with the given repository and notification sink.
    pub fn new(repo: Arc<R>, notifications: NotificationDispatcher) -> Self {
        Self {
            repo,
            notifications,
        }
    }
}

impl<R> LedgerService<R>
where
    R: LedgerRepository,
{
    fn map_repository_error(error: LedgerRepositoryError) -> Error {
        match error {
            LedgerRepositoryError::Connection { message } => {
                warn!(%message, "ledger repository unavailable");
                Error::service_unavailable("ledger temporarily unavailable")
            }
            LedgerRepositoryError::Query { message } => {
                Error::internal(format!("ledger repository error: {message}"))
            }
            LedgerRepositoryError::UserNotFound => Error::user_not_found(),
            LedgerRepositoryError::InsufficientBalance => Error::insufficient_balance(),
        }
    }

    fn ensure_positive(amount: Money) -> Result<(), Error> {
        if amount.is_positive() {
            Ok(())
        } else {
            Err(Error::invalid_amount("Amount must be positive"))
        }
    }

    async fn apply(
        &self,
        user_id: &UserId,
        kind: TransactionKind,
        amount: Money,
    ) -> Result<LedgerReceipt, Error> {
        Self::ensure_positive(amount)?;
        let receipt = self
            .repo
            .apply(user_id, kind, amount)
            .await
            .map_err(Self::map_repository_error)?;
        info!(
            user_id = %user_id,
            kind = %kind,
            amount = %amount,
            balance = %receipt.balance,
            transaction_id = %receipt.transaction.id,
            "ledger mutation committed"
        );
        Ok(receipt)
    }
}

#[async_trait]
impl<R> SavingsLedger for LedgerService<R>
where
    R: LedgerRepository,
{
    async fn balance(&self, user_id: &UserId) -> Result<Money, Error> {
        self.repo
            .balance(user_id)
            .await
            .map_err(Self::map_repository_error)
    }

    async fn deposit(&self, user_id: &UserId, amount: Money) -> Result<Money, Error> {
        let receipt = self.apply(user_id, TransactionKind::Deposit, amount).await?;
        self.notifications.dispatch(
            user_id.clone(),
            vec![Notification::deposit_confirmed(amount, receipt.balance)],
        );
        Ok(receipt.balance)
    }

    async fn withdraw(&self, user_id: &UserId, amount: Money) -> Result<Money, Error> {
        let receipt = self.apply(user_id, TransactionKind::Withdraw, amount).await?;
        self.notifications.dispatch(
            user_id.clone(),
            withdrawal_notifications(amount, receipt.balance),
        );
        Ok(receipt.balance)
    }

    async fn history(&self, user_id: &UserId) -> Result<Vec<Transaction>, Error> {
        self.repo
            .history(user_id)
            .await
            .map_err(Self::map_repository_error)
    }
}

#[cfg(test)]
#[path = "ledger_service_tests.rs"]
mod tests;
