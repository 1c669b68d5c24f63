//! Bearer token authentication for protected routes.
//!
//! [`AuthenticatedUser`] is an extractor: a handler that takes it as an
//! argument only runs once the `Authorization: Bearer <token>` header has
//! been verified through the [`TokenService`](crate::domain::ports::TokenService)
//! held in [`HttpState`].

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::{Ready, ready};
use tracing::debug;

use crate::domain::{Error, UserId};

use super::state::HttpState;

/// Message returned when no credentials accompany a protected request.
pub const ACCESS_DENIED_MESSAGE: &str = "Access denied";

const BEARER_SCHEME: &str = "Bearer";

/// Identity of the caller, derived from a verified bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(UserId);

impl AuthenticatedUser {
    /// Identifier carried by the verified token.
    pub fn user_id(&self) -> &UserId {
        &self.0
    }
}

/// Extract the raw token from the `Authorization` header.
///
/// The `Bearer` scheme matches case-insensitively. Returns `None` when the
/// header is absent, empty or carries the scheme with no token; header
/// parsing trims trailing whitespace, so `"Bearer "` arrives as `"Bearer"`.
/// A value without the scheme is passed through as-is so it fails
/// verification as an invalid token rather than reading as a missing one.
fn bearer_token(req: &HttpRequest) -> Option<&str> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?.trim();
    let token = match value.split_once(char::is_whitespace) {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case(BEARER_SCHEME) => rest.trim(),
        None if value.eq_ignore_ascii_case(BEARER_SCHEME) => "",
        _ => value,
    };
    (!token.is_empty()).then_some(token)
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, Error> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("HTTP state is not configured"))?;
    let token = bearer_token(req).ok_or_else(|| Error::unauthorized(ACCESS_DENIED_MESSAGE))?;
    state
        .tokens
        .verify(token)
        .map(AuthenticatedUser)
        .map_err(|error| {
            debug!(%error, "bearer token rejected");
            Error::invalid_token()
        })
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}
