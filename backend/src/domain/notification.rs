//! Post-commit notifications.
//!
//! Ledger and auth services hand notifications to a [`NotificationDispatcher`]
//! once their state change has committed. Delivery runs on a detached task and
//! any failure is logged and dropped; it never changes the outcome returned to
//! the caller.

use std::sync::Arc;

use tracing::{debug, warn};

use super::ports::NotificationSink;
use super::{Money, TraceId, UserId};

/// Balance below which a withdrawal also raises a low-balance notification.
pub const LOW_BALANCE_THRESHOLD: Money = Money::from_minor(10_000);

/// Category of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// A deposit was applied.
    DepositConfirmed,
    /// A withdrawal was applied.
    WithdrawalConfirmed,
    /// A withdrawal left the balance under [`LOW_BALANCE_THRESHOLD`].
    LowBalance,
    /// A verified device signed in.
    LoginSucceeded,
}

/// Titled message addressed to an account holder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Category, used by sinks for routing and in logs.
    pub kind: NotificationKind,
    /// Short headline shown by push clients.
    pub title: String,
    /// Human-readable message text.
    pub body: String,
}

impl Notification {
    /// Confirmation of an applied deposit and the resulting balance.
    pub fn deposit_confirmed(amount: Money, balance: Money) -> Self {
        Self {
            kind: NotificationKind::DepositConfirmed,
            title: "Deposit Confirmed".to_owned(),
            body: format!("Your deposit of {amount} was received. New balance: {balance}."),
        }
    }

    /// Confirmation of an applied withdrawal and the resulting balance.
    pub fn withdrawal_confirmed(amount: Money, balance: Money) -> Self {
        Self {
            kind: NotificationKind::WithdrawalConfirmed,
            title: "Withdrawal Confirmed".to_owned(),
            body: format!("Your withdrawal of {amount} was processed. New balance: {balance}."),
        }
    }

    /// Warning that `balance` fell below [`LOW_BALANCE_THRESHOLD`].
    pub fn low_balance(balance: Money) -> Self {
        Self {
            kind: NotificationKind::LowBalance,
            title: "Low Balance".to_owned(),
            body: format!("Your balance is {balance}, below {LOW_BALANCE_THRESHOLD}."),
        }
    }

    /// Notice sent after a successful login.
    pub fn login_succeeded() -> Self {
        Self {
            kind: NotificationKind::LoginSucceeded,
            title: "Login Successful".to_owned(),
            body: "You have successfully logged in.".to_owned(),
        }
    }
}

/// Notifications owed after a withdrawal left `balance` behind.
///
/// # Examples
/// ```
/// use savings_backend::domain::{Money, NotificationKind, withdrawal_notifications};
///
/// let sent = withdrawal_notifications(Money::from_minor(8_000), Money::from_minor(2_000));
/// assert_eq!(sent.len(), 2);
/// assert_eq!(sent[1].kind, NotificationKind::LowBalance);
/// ```
pub fn withdrawal_notifications(amount: Money, balance: Money) -> Vec<Notification> {
    let mut notifications = vec![Notification::withdrawal_confirmed(amount, balance)];
    if balance < LOW_BALANCE_THRESHOLD {
        notifications.push(Notification::low_balance(balance));
    }
    notifications
}

/// Fire-and-forget delivery of notifications through a [`NotificationSink`].
#[derive(Clone)]
pub struct NotificationDispatcher {
    sink: Arc<dyn NotificationSink>,
}

impl NotificationDispatcher {
    /// Create a dispatcher delivering through `sink`.
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self { sink }
    }

    /// Spawn delivery of `notifications` in order.
    ///
    /// Returns immediately. Outside a Tokio runtime the notifications are
    /// dropped with a warning.
    pub fn dispatch(&self, user_id: UserId, notifications: Vec<Notification>) {
        if notifications.is_empty() {
            return;
        }
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!(user_id = %user_id, "no runtime available; dropping notifications");
            return;
        };
        let sink = Arc::clone(&self.sink);
        let delivery = async move {
            for notification in &notifications {
                match sink.notify(&user_id, notification).await {
                    Ok(()) => debug!(user_id = %user_id, kind = ?notification.kind, "notification sent"),
                    Err(error) => warn!(
                        user_id = %user_id,
                        kind = ?notification.kind,
                        %error,
                        "notification delivery failed"
                    ),
                }
            }
        };
        match TraceId::current() {
            Some(trace_id) => drop(handle.spawn(TraceId::scope(trace_id, delivery))),
            None => drop(handle.spawn(delivery)),
        }
    }
}
