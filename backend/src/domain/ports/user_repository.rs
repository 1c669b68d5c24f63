//! Port abstraction for account persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{DeviceId, Email, PasswordHash, PushAddress, User, UserCredentials, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another account already uses the email address.
        DuplicateEmail { email: String } => "email already registered: {email}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create an account with a zero balance and its first, unverified
    /// device.
    ///
    /// The account and the device are written together: on error neither
    /// exists, so a failed registration never reserves the email.
    async fn create(
        &self,
        email: &Email,
        password_hash: &PasswordHash,
        device_id: &DeviceId,
        push_address: Option<PushAddress>,
    ) -> Result<User, UserRepositoryError>;

    /// Fetch an account and its password hash by exact email match.
    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<UserCredentials>, UserRepositoryError>;

    /// Fetch an account by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError>;
}
