//! Port for the authoritative balance and its transaction log.
//!
//! [`LedgerRepository::apply`] is the only way a balance changes. Adapters
//! must make the balance update and the log append a single atomic unit and
//! serialise concurrent mutations for the same account. For withdrawals the
//! sufficiency check must use the balance seen by that same atomic step.

use async_trait::async_trait;

use crate::domain::{LedgerReceipt, Money, Transaction, TransactionKind, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by ledger repository adapters.
    pub enum LedgerRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "ledger repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "ledger repository query failed: {message}",
        /// The account does not exist.
        UserNotFound => "ledger account not found",
        /// The withdrawal exceeds the balance at the moment of application.
        InsufficientBalance => "insufficient balance",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    /// Current balance of the account.
    async fn balance(&self, user_id: &UserId) -> Result<Money, LedgerRepositoryError>;

    /// Atomically adjust the balance and append one transaction.
    ///
    /// `amount` must be positive. Nothing is written when an error is
    /// returned.
    async fn apply(
        &self,
        user_id: &UserId,
        kind: TransactionKind,
        amount: Money,
    ) -> Result<LedgerReceipt, LedgerRepositoryError>;

    /// Every transaction of the account, newest first.
    ///
    /// Entries sharing a timestamp are ordered by insertion, newest first.
    async fn history(&self, user_id: &UserId) -> Result<Vec<Transaction>, LedgerRepositoryError>;
}
