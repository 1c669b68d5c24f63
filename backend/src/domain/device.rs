//! Devices bound to an account.
//!
//! A device is created unverified at registration. Verification is granted
//! out of band; the core only reads the flag when gating login.

use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::UserId;

/// Validation errors for device values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceValidationError {
    EmptyDeviceId,
    EmptyPushAddress,
}

impl fmt::Display for DeviceValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyDeviceId => write!(f, "device id must not be empty"),
            Self::EmptyPushAddress => write!(f, "push token must not be empty"),
        }
    }
}

impl std::error::Error for DeviceValidationError {}

/// Client-chosen device identifier, unique per user.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(raw: impl Into<String>) -> Result<Self, DeviceValidationError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(DeviceValidationError::EmptyDeviceId);
        }
        Ok(Self(raw))
    }
}

impl AsRef<str> for DeviceId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// Opaque push-delivery address registered by a device.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PushAddress(String);

impl PushAddress {
    pub fn new(raw: impl Into<String>) -> Result<Self, DeviceValidationError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(DeviceValidationError::EmptyPushAddress);
        }
        Ok(Self(raw))
    }
}

impl AsRef<str> for PushAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Stored device record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    /// Storage identifier of the record itself.
    pub id: Uuid,
    pub user_id: UserId,
    pub device_id: DeviceId,
    pub is_verified: bool,
    pub push_address: Option<PushAddress>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Device {
    /// Whether `candidate` would change the stored push address.
    pub fn push_address_differs(&self, candidate: &PushAddress) -> bool {
        self.push_address.as_ref() != Some(candidate)
    }
}
