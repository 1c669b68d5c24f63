//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every validation failure becomes an `invalid_request` (or
//! `invalid_amount`) error whose details name the offending field and a
//! stable machine-readable code.

use serde_json::{Value, json};

use crate::domain::{AmountError, CredentialsValidationError, Error, Money};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidEmail,
    TooShort,
    Blank,
    NotANumber,
    NotPositive,
    TooPrecise,
    OutOfRange,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidEmail => "invalid_email",
            ErrorCode::TooShort => "too_short",
            ErrorCode::Blank => "blank",
            ErrorCode::NotANumber => "not_a_number",
            ErrorCode::NotPositive => "not_positive",
            ErrorCode::TooPrecise => "too_precise",
            ErrorCode::OutOfRange => "out_of_range",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &'static str {
        self.0
    }
}

pub(crate) const EMAIL: FieldName = FieldName::new("email");
pub(crate) const PASSWORD: FieldName = FieldName::new("password");
pub(crate) const DEVICE_ID: FieldName = FieldName::new("deviceId");
pub(crate) const PUSH_TOKEN: FieldName = FieldName::new("pushToken");
pub(crate) const AMOUNT: FieldName = FieldName::new("amount");

fn details(field: FieldName, code: ErrorCode) -> Value {
    json!({
        "field": field.as_str(),
        "code": code.as_str(),
    })
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let name = field.as_str();
    Error::invalid_request(format!("missing required field: {name}"))
        .with_details(details(field, ErrorCode::MissingField))
}

/// Map credential validation failures to a field-scoped request error.
pub(crate) fn map_credentials_error(err: CredentialsValidationError) -> Error {
    let (field, code) = match &err {
        CredentialsValidationError::EmptyEmail => (EMAIL, ErrorCode::MissingField),
        CredentialsValidationError::InvalidEmail => (EMAIL, ErrorCode::InvalidEmail),
        CredentialsValidationError::EmptyPassword => (PASSWORD, ErrorCode::MissingField),
        CredentialsValidationError::PasswordTooShort { .. } => (PASSWORD, ErrorCode::TooShort),
        CredentialsValidationError::EmptyDeviceId => (DEVICE_ID, ErrorCode::MissingField),
        CredentialsValidationError::EmptyPushToken => (PUSH_TOKEN, ErrorCode::Blank),
    };
    Error::invalid_request(err.to_string()).with_details(details(field, code))
}

fn map_amount_error(err: AmountError) -> Error {
    let code = match err {
        AmountError::Malformed => ErrorCode::NotANumber,
        AmountError::NotPositive => ErrorCode::NotPositive,
        AmountError::TooPrecise => ErrorCode::TooPrecise,
        AmountError::OutOfRange => ErrorCode::OutOfRange,
    };
    Error::invalid_amount(err.to_string()).with_details(details(AMOUNT, code))
}

/// Parse the JSON `amount` field into minor units.
///
/// Only JSON numbers are accepted. Strings such as `"10"` are rejected even
/// when they would parse as decimals.
pub(crate) fn parse_amount(value: Option<&Value>) -> Result<Money, Error> {
    match value {
        None | Some(Value::Null) => Err(missing_field_error(AMOUNT)),
        Some(Value::Number(number)) => {
            Money::parse_amount(&number.to_string()).map_err(map_amount_error)
        }
        Some(_) => Err(map_amount_error(AmountError::Malformed)),
    }
}
