//! Domain primitives, services and ports.
//!
//! Purpose: hold the savings ledger and credential rules independent of any
//! transport or storage. Inbound adapters call the driving ports in
//! [`ports`]; outbound adapters implement the driven ones.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - Money: fixed-point minor-unit amounts.
//! - User, Device, Transaction: stored records.
//! - LedgerService, AuthService: driving port implementations.

pub mod auth;
pub mod auth_service;
pub mod device;
pub mod error;
pub mod ledger_service;
pub mod money;
pub mod notification;
pub mod ports;
pub mod trace_id;
pub mod transaction;
pub mod user;

pub use self::auth::{
    CredentialsValidationError, LoginCredentials, PASSWORD_MIN_LEN, Registration,
};
pub use self::auth_service::{AuthCollaborators, AuthService, INVALID_CREDENTIALS_MESSAGE};
pub use self::device::{Device, DeviceId, DeviceValidationError, PushAddress};
pub use self::error::{Error, ErrorCode};
pub use self::ledger_service::LedgerService;
pub use self::money::{AmountError, Money};
pub use self::notification::{
    LOW_BALANCE_THRESHOLD, Notification, NotificationDispatcher, NotificationKind,
    withdrawal_notifications,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::transaction::{LedgerReceipt, Transaction, TransactionKind, UnknownTransactionKind};
pub use self::user::{Email, PasswordHash, User, UserCredentials, UserId, UserValidationError};
