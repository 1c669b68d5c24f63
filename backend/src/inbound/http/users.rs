//! Account registration and login handlers.
//!
//! ```text
//! POST /auth/register {"email":"ada@example.com","password":"secret","deviceId":"phone-1"}
//! POST /auth/login    {"email":"ada@example.com","password":"secret","deviceId":"phone-1"}
//! ```

use actix_web::{HttpResponse, post, web};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{LoginCredentials, Registration, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::map_credentials_error;

/// Body shared by `POST /auth/register` and `POST /auth/login`.
///
/// Absent string fields deserialise as empty so they surface through the
/// same field-level validation errors as blank ones.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub device_id: String,
    #[serde(default)]
    pub push_token: Option<String>,
}

/// Public view of a newly registered account.
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisteredUser {
    pub id: String,
    pub email: String,
}

/// Response body for `POST /auth/register`.
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user: RegisteredUser,
}

/// Public view of an account returned at login.
#[derive(Debug, Serialize, Deserialize)]
pub struct AccountSummary {
    pub id: String,
    pub email: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
}

impl From<&User> for AccountSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.as_ref().to_owned(),
            balance: user.balance.to_decimal(),
        }
    }
}

/// Response body for `POST /auth/login`.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: AccountSummary,
}

/// Create an account and bind the calling device to it.
///
/// The device starts unverified, so logging in fails with
/// `device_not_verified` until it is verified out of band.
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<AuthRequest>,
) -> ApiResult<HttpResponse> {
    let AuthRequest {
        email,
        password,
        device_id,
        push_token,
    } = payload.into_inner();
    let registration =
        Registration::try_from_parts(&email, &password, &device_id, push_token.as_deref())
            .map_err(map_credentials_error)?;
    let user = state.registration.register(&registration).await?;
    info!(user_id = %user.id, "account registered");
    Ok(HttpResponse::Created().json(RegisterResponse {
        message: "User registered successfully".to_owned(),
        user: RegisteredUser {
            id: user.id.to_string(),
            email: user.email.as_ref().to_owned(),
        },
    }))
}

/// Exchange credentials from a verified device for a bearer token.
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<AuthRequest>,
) -> ApiResult<web::Json<LoginResponse>> {
    let AuthRequest {
        email,
        password,
        device_id,
        push_token,
    } = payload.into_inner();
    let credentials =
        LoginCredentials::try_from_parts(&email, &password, &device_id, push_token.as_deref())
            .map_err(map_credentials_error)?;
    let outcome = state.login.login(&credentials).await?;
    Ok(web::Json(LoginResponse {
        user: AccountSummary::from(&outcome.user),
        token: outcome.token,
    }))
}
