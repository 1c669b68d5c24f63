//! HTTP inbound adapter exposing REST endpoints.
//!
//! ```text
//! GET  /                  service banner
//! POST /auth/register     create an account and bind a device
//! POST /auth/login        exchange credentials for a bearer token
//! GET  /savings/balance   (bearer)
//! POST /savings/deposit   (bearer)
//! POST /savings/withdraw  (bearer)
//! GET  /savings/history   (bearer)
//! GET  /health/ready, /health/live
//! ```

pub mod auth;
pub mod error;
pub mod health;
pub mod savings;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;

use actix_web::{HttpResponse, get, web};
use serde_json::json;

use crate::domain::Error;

/// JSON extractor settings that report body errors as `invalid_request`.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        Error::invalid_request("Invalid request body")
            .with_details(json!({ "reason": err.to_string() }))
            .into()
    })
}

/// Service banner.
#[get("/")]
pub async fn root() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "message": "Client Backend API" }))
}

/// Register every route and the JSON extractor settings.
///
/// Callers supply [`state::HttpState`] and [`health::HealthState`] as app
/// data.
///
/// ```
/// use actix_web::App;
/// use savings_backend::inbound::http::configure;
///
/// let _app = App::new().configure(configure);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(root)
        .service(health::ready)
        .service(health::live)
        .service(
            web::scope("/auth")
                .service(users::register)
                .service(users::login),
        )
        .service(
            web::scope("/savings")
                .service(savings::get_balance)
                .service(savings::deposit_funds)
                .service(savings::withdraw_funds)
                .service(savings::get_history),
        );
}
