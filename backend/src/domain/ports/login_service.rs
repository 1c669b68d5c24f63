//! Driving port for login/authentication use-cases.
//!
//! Inbound adapters call it to exchange credentials for a bearer token
//! without knowing the backing infrastructure, so handler tests substitute a
//! mock instead of wiring persistence.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, User};

/// Successful login result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub token: String,
    pub user: User,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Authenticate a verified device and issue a bearer token.
    async fn login(&self, credentials: &LoginCredentials) -> Result<LoginOutcome, Error>;
}
