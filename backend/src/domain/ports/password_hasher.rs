//! Port for password hashing primitives.
//!
//! Implementations are synchronous and CPU bound; callers move them off the
//! async executor.

use crate::domain::PasswordHash;

use super::define_port_error;

define_port_error! {
    /// Errors raised by password hashing adapters.
    pub enum PasswordHashError {
        /// Producing a new hash failed.
        Hashing { message: String } => "password hashing failed: {message}",
        /// A stored hash could not be parsed.
        Malformed { message: String } => "stored password hash is malformed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password with a fresh salt.
    fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHashError>;

    /// Check a plaintext password against a stored hash.
    fn verify(&self, password: &str, hash: &PasswordHash) -> Result<bool, PasswordHashError>;
}
