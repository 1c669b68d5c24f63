//! Immutable ledger entries.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Money, UserId};

/// Direction of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Deposit,
    Withdraw,
}

impl TransactionKind {
    /// Stable storage and wire name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Withdraw => "withdraw",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a stored kind is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown transaction kind: {0}")]
pub struct UnknownTransactionKind(pub String);

impl FromStr for TransactionKind {
    type Err = UnknownTransactionKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "deposit" => Ok(Self::Deposit),
            "withdraw" => Ok(Self::Withdraw),
            other => Err(UnknownTransactionKind(other.to_owned())),
        }
    }
}

/// Recorded deposit or withdrawal.
///
/// `amount` is always positive; the sign comes from `kind`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: UserId,
    pub kind: TransactionKind,
    pub amount: Money,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Amount with the sign implied by the kind.
    ///
    /// # Examples
    /// ```
    /// use chrono::Utc;
    /// use savings_backend::domain::{Money, Transaction, TransactionKind, UserId};
    /// use uuid::Uuid;
    ///
    /// let tx = Transaction {
    ///     id: Uuid::new_v4(),
    ///     user_id: UserId::random(),
    ///     kind: TransactionKind::Withdraw,
    ///     amount: Money::from_minor(500),
    ///     created_at: Utc::now(),
    /// };
    /// assert_eq!(tx.signed_minor_units(), -500);
    /// ```
    pub fn signed_minor_units(&self) -> i64 {
        match self.kind {
            TransactionKind::Deposit => self.amount.minor_units(),
            TransactionKind::Withdraw => -self.amount.minor_units(),
        }
    }
}

/// Outcome of one atomic balance mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerReceipt {
    pub transaction: Transaction,
    /// Balance immediately after the mutation committed.
    pub balance: Money,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(TransactionKind::Deposit)]
    #[case(TransactionKind::Withdraw)]
    fn kind_parses_its_own_name(#[case] kind: TransactionKind) {
        assert_eq!(kind.as_str().parse::<TransactionKind>(), Ok(kind));
    }

    #[rstest]
    fn kind_rejects_unknown_names() {
        assert!("transfer".parse::<TransactionKind>().is_err());
    }

    #[rstest]
    fn kind_serialises_lowercase() {
        let value = serde_json::to_value(TransactionKind::Withdraw).expect("serialise kind");
        assert_eq!(value, serde_json::json!("withdraw"));
    }
}
