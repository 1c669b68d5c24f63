//! Maps domain failures onto HTTP responses.
//!
//! Every failure body keeps the `{ "error": ..., "code": ... }` shape. The
//! ledger and credential codes are client errors; credential and token codes
//! answer 401 with a bearer challenge so clients know to re-authenticate.
//! Internal failures are logged in full and replaced with a generic message.

use actix_web::http::StatusCode;
use actix_web::http::header::WWW_AUTHENTICATE;
use actix_web::{HttpResponse, ResponseError};
use tracing::error;

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

/// Generic message returned in place of any internal failure.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Challenge sent with every 401 response.
pub const BEARER_CHALLENGE: &str = "Bearer";

/// HTTP status for a domain error code.
///
/// # Examples
/// ```
/// use actix_web::http::StatusCode;
/// use savings_backend::domain::ErrorCode;
/// use savings_backend::inbound::http::error::status_for;
///
/// assert_eq!(status_for(ErrorCode::InsufficientBalance), StatusCode::BAD_REQUEST);
/// assert_eq!(status_for(ErrorCode::DeviceNotVerified), StatusCode::UNAUTHORIZED);
/// ```
pub fn status_for(code: ErrorCode) -> StatusCode {
    use ErrorCode as C;
    match code {
        C::InvalidRequest
        | C::DuplicateEmail
        | C::UserNotFound
        | C::InvalidAmount
        | C::InsufficientBalance => StatusCode::BAD_REQUEST,
        C::Unauthorized
        | C::InvalidToken
        | C::InvalidCredentials
        | C::DeviceNotRegistered
        | C::DeviceNotVerified => StatusCode::UNAUTHORIZED,
        C::Conflict => StatusCode::CONFLICT,
        C::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        C::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Body sent to the client for `err`.
///
/// Internal errors lose their message and details but keep the trace id so
/// support can find the logged original.
fn client_payload(err: &Error) -> Error {
    if err.code() != ErrorCode::InternalError {
        return err.clone();
    }
    error!(
        trace_id = err.trace_id().unwrap_or_default(),
        message = err.message(),
        "internal error redacted from response"
    );
    let generic = Error::internal(INTERNAL_ERROR_MESSAGE);
    match err.trace_id() {
        Some(id) => generic.with_trace_id(id),
        None => generic,
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let mut response = HttpResponse::build(status);
        if status == StatusCode::UNAUTHORIZED {
            response.insert_header((WWW_AUTHENTICATE, BEARER_CHALLENGE));
        }
        if let Some(id) = self.trace_id() {
            response.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        response.json(client_payload(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "actix error promoted to domain error");
        Self::internal(INTERNAL_ERROR_MESSAGE)
    }
}
