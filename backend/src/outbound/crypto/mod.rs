//! Argon2id password hashing adapter.
//!
//! Hashes are stored in PHC string form (`$argon2id$v=19$...`) so parameters
//! travel with each hash.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    PasswordHash as PhcHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
};

use crate::domain::PasswordHash;
use crate::domain::ports::{PasswordHashError, PasswordHasher};

/// [`PasswordHasher`] backed by Argon2id with default parameters.
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2PasswordHasher;

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHashError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|err| PasswordHashError::hashing(err.to_string()))?;
        Ok(PasswordHash::new(hash.to_string()))
    }

    fn verify(&self, password: &str, hash: &PasswordHash) -> Result<bool, PasswordHashError> {
        let parsed =
            PhcHash::new(hash.as_str()).map_err(|err| PasswordHashError::malformed(err.to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}
