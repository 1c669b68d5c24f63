//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, hashing, tokens, notifications) are
//! implemented by outbound adapters. Driving ports (ledger, registration,
//! login) are implemented by domain services and called by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod device_repository;
mod ledger_repository;
mod login_service;
mod notification_sink;
mod password_hasher;
mod registration_service;
mod savings_ledger;
mod token_service;
mod user_repository;

#[cfg(test)]
pub use device_repository::MockDeviceRepository;
pub use device_repository::{DeviceRepository, DeviceRepositoryError};
#[cfg(test)]
pub use ledger_repository::MockLedgerRepository;
pub use ledger_repository::{LedgerRepository, LedgerRepositoryError};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::{LoginOutcome, LoginService};
#[cfg(test)]
pub use notification_sink::MockNotificationSink;
pub use notification_sink::{NotificationError, NotificationSink};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use registration_service::MockRegistrationService;
pub use registration_service::RegistrationService;
#[cfg(test)]
pub use savings_ledger::MockSavingsLedger;
pub use savings_ledger::SavingsLedger;
#[cfg(test)]
pub use token_service::MockTokenService;
pub use token_service::{IssuedToken, TokenError, TokenService};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserRepository, UserRepositoryError};
