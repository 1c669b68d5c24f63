//! Assemble domain services over the configured store.

use std::sync::Arc;

use mockable::DefaultClock;
use tracing::info;

use savings_backend::domain::ports::{
    DeviceRepository, LedgerRepository, TokenService, UserRepository,
};
use savings_backend::domain::{
    AuthCollaborators, AuthService, LedgerService, NotificationDispatcher,
};
use savings_backend::inbound::http::state::HttpState;
use savings_backend::outbound::crypto::Argon2PasswordHasher;
use savings_backend::outbound::memory::InMemoryStore;
use savings_backend::outbound::notifications::TracingNotificationSink;
use savings_backend::outbound::persistence::{
    DbPool, DieselDeviceRepository, DieselLedgerRepository, DieselUserRepository,
};
use savings_backend::outbound::token::{BuildMode, Hs256TokenService, token_settings_from_env};

use super::ServerSettings;

/// Wire services over one set of repositories.
fn wire<U, D, L>(
    users: Arc<U>,
    devices: Arc<D>,
    ledger: Arc<L>,
    tokens: Arc<dyn TokenService>,
) -> HttpState
where
    U: UserRepository + 'static,
    D: DeviceRepository + 'static,
    L: LedgerRepository + 'static,
{
    let sink = Arc::new(TracingNotificationSink::new(Arc::clone(&devices)));
    let notifications = NotificationDispatcher::new(sink);
    let savings = Arc::new(LedgerService::new(ledger, notifications.clone()));
    let auth = Arc::new(AuthService::new(
        users,
        devices,
        AuthCollaborators {
            hasher: Arc::new(Argon2PasswordHasher),
            tokens: Arc::clone(&tokens),
            notifications,
        },
    ));
    HttpState::new(savings, auth.clone(), auth, tokens)
}

fn build_token_service() -> std::io::Result<Arc<dyn TokenService>> {
    let env = mockable::DefaultEnv::new();
    let settings = token_settings_from_env(&env, BuildMode::from_debug_assertions())
        .map_err(|err| std::io::Error::other(err.to_string()))?;
    Ok(Arc::new(Hs256TokenService::new(
        settings,
        Arc::new(DefaultClock),
    )))
}

/// Build handler state for the configured store.
///
/// # Errors
///
/// Fails when token settings are invalid or the database pool cannot be
/// built.
pub async fn build_http_state(settings: &ServerSettings) -> std::io::Result<HttpState> {
    let tokens = build_token_service()?;
    match settings.pool_config() {
        Some(config) => {
            let pool = DbPool::new(config)
                .await
                .map_err(|err| std::io::Error::other(err.to_string()))?;
            info!("using PostgreSQL store");
            Ok(wire(
                Arc::new(DieselUserRepository::new(pool.clone())),
                Arc::new(DieselDeviceRepository::new(pool.clone())),
                Arc::new(DieselLedgerRepository::new(pool)),
                tokens,
            ))
        }
        None => {
            info!("no database configured; using in-memory store");
            let store = Arc::new(InMemoryStore::new());
            Ok(wire(
                Arc::clone(&store),
                Arc::clone(&store),
                store,
                tokens,
            ))
        }
    }
}
