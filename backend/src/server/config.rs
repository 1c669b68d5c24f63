//! HTTP server settings loaded via OrthoConfig.

use std::net::SocketAddr;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use savings_backend::outbound::persistence::PoolConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Settings controlling the listener and the backing store.
///
/// Read from `SAVINGS_*` environment variables, configuration files and
/// command-line flags.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SAVINGS")]
pub struct ServerSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL. Without it accounts live in process memory.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
}

impl ServerSettings {
    /// Parse the configured bind address, falling back to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> std::io::Result<SocketAddr> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid bind address {raw:?}: {err}"),
            )
        })
    }

    /// Pool settings for the configured database, if any.
    pub fn pool_config(&self) -> Option<PoolConfig> {
        let url = self.database_url.as_deref()?;
        let config = PoolConfig::new(url);
        Some(match self.db_max_connections {
            Some(max) => config.with_max_size(max),
            None => config,
        })
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for server settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    fn load_from_empty_args() -> ServerSettings {
        ServerSettings::load_from_iter([OsString::from("savings-backend")])
            .expect("config should load")
    }

    #[rstest]
    fn defaults_use_memory_store_on_port_8080() {
        let _guard = lock_env([
            ("SAVINGS_BIND_ADDR", None::<String>),
            ("SAVINGS_DATABASE_URL", None::<String>),
            ("SAVINGS_DB_MAX_CONNECTIONS", None::<String>),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("default parses"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("valid addr")
        );
        assert!(settings.pool_config().is_none());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("SAVINGS_BIND_ADDR", Some("127.0.0.1:9000".to_owned())),
            (
                "SAVINGS_DATABASE_URL",
                Some("postgres://localhost/savings".to_owned()),
            ),
            ("SAVINGS_DB_MAX_CONNECTIONS", Some("4".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("override parses"),
            "127.0.0.1:9000".parse::<SocketAddr>().expect("valid addr")
        );
        let pool = settings.pool_config().expect("database configured");
        assert_eq!(pool.database_url(), "postgres://localhost/savings");
        assert_eq!(settings.db_max_connections, Some(4));
    }

    #[rstest]
    fn malformed_bind_addresses_are_rejected() {
        let _guard = lock_env([("SAVINGS_BIND_ADDR", Some("not an address".to_owned()))]);

        let settings = load_from_empty_args();
        assert!(settings.bind_addr().is_err());
    }
}
