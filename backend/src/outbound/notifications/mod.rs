//! Notification sink that records notifications in the structured log.
//!
//! Push delivery is out of scope for this service. The sink resolves the
//! account's registered push addresses so the log line carries everything a
//! delivery worker would need.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{DeviceRepository, NotificationError, NotificationSink};
use crate::domain::{Notification, UserId};

/// [`NotificationSink`] that emits one `info` event per notification.
pub struct TracingNotificationSink<D> {
    devices: Arc<D>,
}

impl<D> TracingNotificationSink<D> {
    /// Create a sink resolving push addresses through `devices`.
    pub fn new(devices: Arc<D>) -> Self {
        Self { devices }
    }
}

#[async_trait]
impl<D> NotificationSink for TracingNotificationSink<D>
where
    D: DeviceRepository,
{
    async fn notify(
        &self,
        user_id: &UserId,
        notification: &Notification,
    ) -> Result<(), NotificationError> {
        let addresses = self
            .devices
            .push_addresses(user_id)
            .await
            .map_err(|err| NotificationError::delivery(err.to_string()))?;
        info!(
            user_id = %user_id,
            kind = ?notification.kind,
            title = %notification.title,
            body = %notification.body,
            recipients = addresses.len(),
            "notification"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PushAddress;
    use crate::domain::ports::{DeviceRepositoryError, MockDeviceRepository};
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn looks_up_push_addresses_for_the_user() {
        let user_id = UserId::random();
        let expected = user_id.clone();
        let mut devices = MockDeviceRepository::new();
        devices
            .expect_push_addresses()
            .withf(move |id| id == &expected)
            .times(1)
            .return_once(|_| Ok(vec![PushAddress::new("tok").expect("push address")]));
        let sink = TracingNotificationSink::new(Arc::new(devices));

        sink.notify(&user_id, &Notification::login_succeeded())
            .await
            .expect("notification logged");
    }

    #[rstest]
    #[tokio::test]
    async fn lookup_failures_become_delivery_errors() {
        let mut devices = MockDeviceRepository::new();
        devices
            .expect_push_addresses()
            .times(1)
            .return_once(|_| Err(DeviceRepositoryError::connection("refused")));
        let sink = TracingNotificationSink::new(Arc::new(devices));

        let err = sink
            .notify(&UserId::random(), &Notification::login_succeeded())
            .await
            .expect_err("lookup failed");

        assert!(matches!(err, NotificationError::Delivery { .. }));
    }
}
