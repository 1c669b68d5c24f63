//! Driving port for balance operations.
//!
//! Inbound adapters call this port with an authenticated user id and a
//! validated amount; they never touch the ledger repository directly.

use async_trait::async_trait;

use crate::domain::{Error, Money, Transaction, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SavingsLedger: Send + Sync {
    /// Current balance.
    async fn balance(&self, user_id: &UserId) -> Result<Money, Error>;

    /// Credit the account and return the new balance.
    async fn deposit(&self, user_id: &UserId, amount: Money) -> Result<Money, Error>;

    /// Debit the account and return the new balance.
    async fn withdraw(&self, user_id: &UserId, amount: Money) -> Result<Money, Error>;

    /// Full transaction history, newest first.
    async fn history(&self, user_id: &UserId) -> Result<Vec<Transaction>, Error>;
}
