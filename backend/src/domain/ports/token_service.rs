//! Port for issuing and verifying bearer tokens.
//!
//! Verification is pure: it needs only the signing secret and a clock, never
//! the credential store.

use chrono::{DateTime, Utc};

use crate::domain::UserId;

use super::define_port_error;

define_port_error! {
    /// Errors raised by token adapters.
    pub enum TokenError {
        /// The token is not structurally valid.
        Malformed { message: String } => "token is malformed: {message}",
        /// The signature does not match the payload.
        BadSignature => "token signature mismatch",
        /// The token expiry has passed.
        Expired => "token has expired",
        /// A token could not be produced.
        Signing { message: String } => "token signing failed: {message}",
    }
}

/// Freshly issued bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[cfg_attr(test, mockall::automock)]
pub trait TokenService: Send + Sync {
    /// Sign a token binding requests to `user_id`.
    fn issue(&self, user_id: &UserId) -> Result<IssuedToken, TokenError>;

    /// Validate a token and return the user it was issued to.
    fn verify(&self, token: &str) -> Result<UserId, TokenError>;
}
