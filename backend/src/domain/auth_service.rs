//! Registration and login orchestration.
//!
//! [`AuthService`] implements the [`RegistrationService`] and [`LoginService`]
//! driving ports on top of the credential store, a password hasher and a
//! token issuer. Device verification is read here but never granted.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::domain::ports::{
    DeviceRepository, DeviceRepositoryError, LoginOutcome, LoginService, PasswordHashError,
    PasswordHasher, RegistrationService, TokenService, UserRepository, UserRepositoryError,
};
use crate::domain::{
    Device, Error, LoginCredentials, Notification, NotificationDispatcher, PasswordHash,
    Registration, User,
};

/// Message shared by unknown-email and wrong-password failures.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password";

/// Collaborators that are shared by reference and not tied to a repository
/// type.
#[derive(Clone)]
pub struct AuthCollaborators {
    /// Hashes new passwords and verifies login attempts.
    pub hasher: Arc<dyn PasswordHasher>,
    /// Issues the bearer token returned on login.
    pub tokens: Arc<dyn TokenService>,
    /// Receives the login notice once a login succeeds.
    pub notifications: NotificationDispatcher,
}

/// Auth orchestrator implementing registration and login.
#[derive(Clone)]
pub struct AuthService<U, D> {
    users: Arc<U>,
    devices: Arc<D>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenService>,
    notifications: NotificationDispatcher,
}

impl<U, D> AuthService<U, D> {
    /// Create a new service over the given credential store.
    pub fn new(users: Arc<U>, devices: Arc<D>, collaborators: AuthCollaborators) -> Self {
        let AuthCollaborators {
            hasher,
            tokens,
            notifications,
        } = collaborators;
        Self {
            users,
            devices,
            hasher,
            tokens,
            notifications,
        }
    }
}

impl<U, D> AuthService<U, D>
where
    U: UserRepository,
    D: DeviceRepository,
{
    fn map_user_error(error: UserRepositoryError) -> Error {
        match error {
            UserRepositoryError::Connection { message } => {
                warn!(%message, "user repository unavailable");
                Error::service_unavailable("credential store temporarily unavailable")
            }
            UserRepositoryError::Query { message } => {
                Error::internal(format!("user repository error: {message}"))
            }
            UserRepositoryError::DuplicateEmail { .. } => Error::duplicate_email(),
        }
    }

    fn map_device_error(error: DeviceRepositoryError) -> Error {
        match error {
            DeviceRepositoryError::Connection { message } => {
                warn!(%message, "device repository unavailable");
                Error::service_unavailable("credential store temporarily unavailable")
            }
            DeviceRepositoryError::Query { message } => {
                Error::internal(format!("device repository error: {message}"))
            }
        }
    }

    fn map_hash_error(error: PasswordHashError) -> Error {
        Error::internal(format!("password hasher failed: {error}"))
    }

    async fn hash_password(&self, password: &str) -> Result<PasswordHash, Error> {
        let hasher = Arc::clone(&self.hasher);
        let password = Zeroizing::new(password.to_owned());
        tokio::task::spawn_blocking(move || hasher.hash(password.as_str()))
            .await
            .map_err(|err| Error::internal(format!("password hashing task failed: {err}")))?
            .map_err(Self::map_hash_error)
    }

    async fn verify_password(&self, password: &str, hash: PasswordHash) -> Result<bool, Error> {
        let hasher = Arc::clone(&self.hasher);
        let password = Zeroizing::new(password.to_owned());
        tokio::task::spawn_blocking(move || hasher.verify(password.as_str(), &hash))
            .await
            .map_err(|err| Error::internal(format!("password verification task failed: {err}")))?
            .map_err(Self::map_hash_error)
    }

    async fn refresh_push_address(&self, device: &Device, credentials: &LoginCredentials) {
        let Some(address) = credentials.push_address() else {
            return;
        };
        if !device.push_address_differs(address) {
            return;
        }
        if let Err(error) = self.devices.update_push_address(device, address).await {
            warn!(
                user_id = %device.user_id,
                device_id = %device.device_id,
                %error,
                "push address update failed; continuing login"
            );
        }
    }
}

#[async_trait]
impl<U, D> RegistrationService for AuthService<U, D>
where
    U: UserRepository,
    D: DeviceRepository,
{
    async fn register(&self, registration: &Registration) -> Result<User, Error> {
        let password_hash = self.hash_password(registration.password()).await?;
        let user = self
            .users
            .create(
                registration.email(),
                &password_hash,
                registration.device_id(),
                registration.push_address().cloned(),
            )
            .await
            .map_err(Self::map_user_error)?;
        info!(user_id = %user.id, device_id = %registration.device_id(), "user registered");
        Ok(user)
    }
}

#[async_trait]
impl<U, D> LoginService for AuthService<U, D>
where
    U: UserRepository,
    D: DeviceRepository,
{
    async fn login(&self, credentials: &LoginCredentials) -> Result<LoginOutcome, Error> {
        let Some(stored) = self
            .users
            .find_by_email(credentials.email())
            .await
            .map_err(Self::map_user_error)?
        else {
            return Err(Error::invalid_credentials(INVALID_CREDENTIALS_MESSAGE));
        };
        if !self
            .verify_password(credentials.password(), stored.password_hash)
            .await?
        {
            return Err(Error::invalid_credentials(INVALID_CREDENTIALS_MESSAGE));
        }

        let user = stored.user;
        let device = self
            .devices
            .find(&user.id, credentials.device_id())
            .await
            .map_err(Self::map_device_error)?
            .ok_or_else(Error::device_not_registered)?;
        if !device.is_verified {
            return Err(Error::device_not_verified());
        }

        self.refresh_push_address(&device, credentials).await;

        let issued = self
            .tokens
            .issue(&user.id)
            .map_err(|err| Error::internal(format!("token issue failed: {err}")))?;
        self.notifications
            .dispatch(user.id.clone(), vec![Notification::login_succeeded()]);
        info!(user_id = %user.id, device_id = %device.device_id, "login succeeded");

        Ok(LoginOutcome {
            token: issued.token,
            user,
        })
    }
}

#[cfg(test)]
#[path = "auth_service_tests.rs"]
mod tests;
