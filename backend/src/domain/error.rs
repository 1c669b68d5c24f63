//! Domain-level error types.
//!
//! These errors are transport agnostic. Inbound adapters map them to HTTP
//! responses or any other protocol-specific envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::TraceId;

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request is malformed or fails validation.
    InvalidRequest,
    /// Authentication is missing.
    Unauthorized,
    /// The bearer token is malformed, forged, or expired.
    InvalidToken,
    /// The email address is already registered.
    DuplicateEmail,
    /// Email or password did not match a stored account.
    InvalidCredentials,
    /// The presented device id is unknown for the account.
    DeviceNotRegistered,
    /// The device exists but has not been verified yet.
    DeviceNotVerified,
    /// The account referenced by the request does not exist.
    UserNotFound,
    /// The amount is not positive or exceeds currency precision.
    InvalidAmount,
    /// The withdrawal exceeds the balance at the moment of application.
    InsufficientBalance,
    /// The request conflicts with current state.
    Conflict,
    /// A backing service is temporarily unavailable.
    ServiceUnavailable,
    /// An unexpected error occurred inside the domain.
    InternalError,
}

/// Domain error payload.
///
/// The human-readable message is serialised under the `error` key so every
/// failure body has the `{ "error": ... }` shape clients rely on.
///
/// # Examples
/// ```
/// use savings_backend::domain::{Error, ErrorCode};
///
/// let err = Error::new(ErrorCode::InsufficientBalance, "Insufficient balance");
/// assert_eq!(err.code(), ErrorCode::InsufficientBalance);
/// assert_eq!(err.message(), "Insufficient balance");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Error {
    #[serde(rename = "error")]
    message: String,
    code: ErrorCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(alias = "trace_id")]
    trace_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl Error {
    /// Create a new error.
    ///
    /// Captures the current trace identifier if one is in scope so the error
    /// payload is correlated automatically.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code,
            trace_id: TraceId::current().map(|id| id.to_string()),
            details: None,
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message returned to adapters.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Correlation identifier captured when the error was created.
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    /// Supplementary error details for adapters.
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Attach a trace identifier to the error.
    ///
    /// # Examples
    /// ```
    /// use savings_backend::domain::Error;
    ///
    /// let err = Error::unauthorized("Access denied").with_trace_id("abc");
    /// assert_eq!(err.trace_id(), Some("abc"));
    /// ```
    pub fn with_trace_id(mut self, id: impl Into<String>) -> Self {
        self.trace_id = Some(id.into());
        self
    }

    /// Attach structured details to the error.
    ///
    /// # Examples
    /// ```
    /// use savings_backend::domain::Error;
    /// use serde_json::json;
    ///
    /// let err = Error::invalid_request("bad")
    ///     .with_details(json!({ "field": "email" }));
    /// assert!(err.details().is_some());
    /// ```
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Convenience constructor for [`ErrorCode::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Convenience constructor for [`ErrorCode::Unauthorized`].
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Convenience constructor for [`ErrorCode::InvalidToken`].
    pub fn invalid_token() -> Self {
        Self::new(ErrorCode::InvalidToken, "Invalid token")
    }

    /// Convenience constructor for [`ErrorCode::DuplicateEmail`].
    pub fn duplicate_email() -> Self {
        Self::new(ErrorCode::DuplicateEmail, "Email already registered")
    }

    /// Convenience constructor for [`ErrorCode::InvalidCredentials`].
    pub fn invalid_credentials(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidCredentials, message)
    }

    /// Convenience constructor for [`ErrorCode::DeviceNotRegistered`].
    pub fn device_not_registered() -> Self {
        Self::new(ErrorCode::DeviceNotRegistered, "Device not registered")
    }

    /// Convenience constructor for [`ErrorCode::DeviceNotVerified`].
    pub fn device_not_verified() -> Self {
        Self::new(ErrorCode::DeviceNotVerified, "Device not verified")
    }

    /// Convenience constructor for [`ErrorCode::UserNotFound`].
    pub fn user_not_found() -> Self {
        Self::new(ErrorCode::UserNotFound, "User not found")
    }

    /// Convenience constructor for [`ErrorCode::InvalidAmount`].
    pub fn invalid_amount(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidAmount, message)
    }

    /// Convenience constructor for [`ErrorCode::InsufficientBalance`].
    pub fn insufficient_balance() -> Self {
        Self::new(ErrorCode::InsufficientBalance, "Insufficient balance")
    }

    /// Convenience constructor for [`ErrorCode::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    /// Convenience constructor for [`ErrorCode::ServiceUnavailable`].
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    /// Convenience constructor for [`ErrorCode::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}
