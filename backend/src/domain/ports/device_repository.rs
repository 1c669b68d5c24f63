//! Port for device records bound to an account.
//!
//! Devices are created with their account through
//! [`UserRepository::create`](super::UserRepository::create).
use async_trait::async_trait;

use crate::domain::{Device, DeviceId, PushAddress, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by device repository adapters.
    pub enum DeviceRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "device repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "device repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeviceRepository: Send + Sync {
    /// Fetch the device the account registered under `device_id`.
    async fn find(
        &self,
        user_id: &UserId,
        device_id: &DeviceId,
    ) -> Result<Option<Device>, DeviceRepositoryError>;

    /// Replace the stored push address.
    ///
    /// Leaves the record untouched when the address is unchanged. Returns
    /// whether a write happened.
    async fn update_push_address(
        &self,
        device: &Device,
        address: &PushAddress,
    ) -> Result<bool, DeviceRepositoryError>;

    /// All push addresses registered by the account's devices.
    async fn push_addresses(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<PushAddress>, DeviceRepositoryError>;
}
