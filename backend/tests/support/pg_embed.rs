//! Embedded PostgreSQL bootstrap for the Diesel adapter suites.
//!
//! `pg-embed-setup-unpriv` installs into `/var/tmp` unless `PG_RUNTIME_DIR`
//! and `PG_DATA_DIR` are set. When either is missing, both are pointed at a
//! fresh directory under the cargo target dir for the duration of the
//! bootstrap, so sandboxed runs can still start a cluster.

use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use pg_embedded_setup_unpriv::TestCluster;
use postgres::{Client, NoTls};
use uuid::Uuid;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

static BOOTSTRAP_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn scratch_dirs() -> Result<(PathBuf, PathBuf), std::io::Error> {
    let target = std::env::var_os("CARGO_TARGET_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("..").join("target"));
    let base = target
        .join("pg-embed")
        .join(format!("savings-{}-{}", std::process::id(), Uuid::new_v4()));
    let runtime_dir = base.join("install");
    let data_dir = base.join("data");
    std::fs::create_dir_all(&runtime_dir)?;
    std::fs::create_dir_all(&data_dir)?;
    Ok((runtime_dir, data_dir))
}

/// Start an embedded cluster, serialising bootstraps across tests.
pub fn test_cluster() -> Result<TestCluster, String> {
    let _bootstrap = BOOTSTRAP_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|err| err.into_inner());

    let needs_dirs =
        std::env::var_os("PG_RUNTIME_DIR").is_none() || std::env::var_os("PG_DATA_DIR").is_none();
    let _env = if needs_dirs {
        let (runtime_dir, data_dir) = scratch_dirs().map_err(|err| err.to_string())?;
        Some(env_lock::lock_env([
            ("PG_RUNTIME_DIR", Some(runtime_dir.to_string_lossy().into_owned())),
            ("PG_DATA_DIR", Some(data_dir.to_string_lossy().into_owned())),
        ]))
    } else {
        None
    };

    TestCluster::new().map_err(|err| format!("{err:?}"))
}

/// Create an empty, migrated database and return its URL.
pub fn migrated_database(cluster: &TestCluster) -> Result<String, String> {
    let name = format!("savings_{}", Uuid::new_v4().simple());
    let admin_url = cluster.connection().database_url("postgres");
    let mut admin = Client::connect(&admin_url, NoTls).map_err(|err| format_postgres_error(&err))?;
    admin
        .batch_execute(&format!("CREATE DATABASE \"{name}\""))
        .map_err(|err| format_postgres_error(&err))?;

    let url = cluster.connection().database_url(&name);
    let mut conn = PgConnection::establish(&url).map_err(|err| format!("{err:?}"))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|err| format!("migration: {err:?}"))?;
    Ok(url)
}

/// Surface the SQLSTATE and server message rather than a bare `db error`.
pub fn format_postgres_error(error: &postgres::Error) -> String {
    match error.as_db_error() {
        Some(db_error) => format!(
            "postgres error {:?}: {}",
            db_error.code(),
            db_error.message()
        ),
        None => error.to_string(),
    }
}

fn should_skip_test_cluster() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Skip when `SKIP_TEST_CLUSTER` is truthy, otherwise fail loudly.
pub fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    if should_skip_test_cluster() {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        None
    } else {
        panic!("Test cluster setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.");
    }
}
