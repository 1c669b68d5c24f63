//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerSettings;
pub use state_builders::build_http_state;

use actix_web::dev::Server;
use actix_web::{App, HttpServer, web};
use tracing::info;

use savings_backend::Trace;
use savings_backend::inbound::http::configure;
use savings_backend::inbound::http::health::HealthState;

/// Construct the HTTP server for `settings`.
///
/// Readiness flips to healthy once the store and token service are wired
/// and the listener is bound.
///
/// # Errors
///
/// Propagates [`std::io::Error`] when wiring fails or the socket cannot be
/// bound.
pub async fn create_server(
    health_state: web::Data<HealthState>,
    settings: ServerSettings,
) -> std::io::Result<Server> {
    let bind_addr = settings.bind_addr()?;
    let http_state = web::Data::new(build_http_state(&settings).await?);
    let server_health_state = health_state.clone();

    let server = HttpServer::new(move || {
        App::new()
            .app_data(server_health_state.clone())
            .app_data(http_state.clone())
            .wrap(Trace)
            .configure(configure)
    })
    .bind(bind_addr)?
    .run();

    info!(%bind_addr, "savings backend listening");
    health_state.mark_ready();
    Ok(server)
}
