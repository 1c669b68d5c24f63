//! Registration and login inputs.
//!
//! Handlers build these from raw payload strings so services only ever see
//! validated values.

use std::fmt;

use zeroize::Zeroizing;

use super::{DeviceId, DeviceValidationError, Email, PushAddress, UserValidationError};

/// Minimum password length accepted at registration.
pub const PASSWORD_MIN_LEN: usize = 6;

/// Domain error returned when auth payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialsValidationError {
    EmptyEmail,
    InvalidEmail,
    EmptyPassword,
    PasswordTooShort { min: usize },
    EmptyDeviceId,
    EmptyPushToken,
}

impl fmt::Display for CredentialsValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::InvalidEmail => write!(f, "email must be a valid email address"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
            Self::EmptyDeviceId => write!(f, "deviceId must not be empty"),
            Self::EmptyPushToken => write!(f, "pushToken must not be empty"),
        }
    }
}

impl std::error::Error for CredentialsValidationError {}

impl From<UserValidationError> for CredentialsValidationError {
    fn from(value: UserValidationError) -> Self {
        match value {
            UserValidationError::EmptyEmail => Self::EmptyEmail,
            _ => Self::InvalidEmail,
        }
    }
}

impl From<DeviceValidationError> for CredentialsValidationError {
    fn from(value: DeviceValidationError) -> Self {
        match value {
            DeviceValidationError::EmptyDeviceId => Self::EmptyDeviceId,
            DeviceValidationError::EmptyPushAddress => Self::EmptyPushToken,
        }
    }
}

fn parse_push(push_token: Option<&str>) -> Result<Option<PushAddress>, CredentialsValidationError> {
    push_token.map(PushAddress::new).transpose().map_err(Into::into)
}

/// Validated registration input.
///
/// # Examples
/// ```
/// use savings_backend::domain::Registration;
///
/// let reg = Registration::try_from_parts("ada@example.com", "secret", "phone-1", None)
///     .expect("valid registration");
/// assert_eq!(reg.email().as_ref(), "ada@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    email: Email,
    password: Zeroizing<String>,
    device_id: DeviceId,
    push_address: Option<PushAddress>,
}

impl Registration {
    pub fn try_from_parts(
        email: &str,
        password: &str,
        device_id: &str,
        push_token: Option<&str>,
    ) -> Result<Self, CredentialsValidationError> {
        let email = Email::new(email)?;
        if password.is_empty() {
            return Err(CredentialsValidationError::EmptyPassword);
        }
        if password.chars().count() < PASSWORD_MIN_LEN {
            return Err(CredentialsValidationError::PasswordTooShort {
                min: PASSWORD_MIN_LEN,
            });
        }
        let device_id = DeviceId::new(device_id)?;
        let push_address = parse_push(push_token)?;
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
            device_id,
            push_address,
        })
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    pub fn device_id(&self) -> &DeviceId {
        &self.device_id
    }

    pub fn push_address(&self) -> Option<&PushAddress> {
        self.push_address.as_ref()
    }
}

/// Validated login credentials.
///
/// The password keeps caller-provided whitespace; only emptiness is checked so
/// accounts created under older length rules can still sign in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: Email,
    password: Zeroizing<String>,
    device_id: DeviceId,
    push_address: Option<PushAddress>,
}

impl LoginCredentials {
    pub fn try_from_parts(
        email: &str,
        password: &str,
        device_id: &str,
        push_token: Option<&str>,
    ) -> Result<Self, CredentialsValidationError> {
        let email = Email::new(email)?;
        if password.is_empty() {
            return Err(CredentialsValidationError::EmptyPassword);
        }
        let device_id = DeviceId::new(device_id)?;
        let push_address = parse_push(push_token)?;
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
            device_id,
            push_address,
        })
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    pub fn device_id(&self) -> &DeviceId {
        &self.device_id
    }

    pub fn push_address(&self) -> Option<&PushAddress> {
        self.push_address.as_ref()
    }
}
