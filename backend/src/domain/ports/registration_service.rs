//! Driving port for account registration.
use async_trait::async_trait;

use crate::domain::{Error, Registration, User};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistrationService: Send + Sync {
    /// Create an account with a zero balance and one unverified device.
    ///
    /// No token is issued; the device must be verified before login.
    async fn register(&self, registration: &Registration) -> Result<User, Error>;
}
