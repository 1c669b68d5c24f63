//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repository implementations only translate between Diesel rows and domain
//! types. Row structs (`models.rs`) and table definitions (`schema.rs`) stay
//! private to this module, and every database error is mapped to the port
//! error of the repository that raised it.
//!
//! ```no_run
//! use savings_backend::outbound::persistence::{DbPool, DieselLedgerRepository, PoolConfig};
//!
//! # async fn build() -> Result<(), savings_backend::outbound::persistence::PoolError> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/savings")).await?;
//! let ledger = DieselLedgerRepository::new(pool);
//! # let _ = ledger;
//! # Ok(())
//! # }
//! ```

mod diesel_device_repository;
mod diesel_ledger_repository;
mod diesel_user_repository;
mod error_mapping;
mod models;
mod pool;
mod schema;

pub use diesel_device_repository::DieselDeviceRepository;
pub use diesel_ledger_repository::DieselLedgerRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
