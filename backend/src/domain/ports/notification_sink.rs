//! Port for best-effort post-commit notifications.
use async_trait::async_trait;

use crate::domain::{Notification, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by notification adapters.
    pub enum NotificationError {
        /// The notification could not be handed to the delivery channel.
        Delivery { message: String } => "notification delivery failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver one notification addressed to the account holder.
    async fn notify(
        &self,
        user_id: &UserId,
        notification: &Notification,
    ) -> Result<(), NotificationError>;
}
