//! Savings account backend.
//!
//! Accounts register with a device, log in from a verified device to obtain
//! an HS256 bearer token, and move money through a per-account ledger whose
//! balance is only ever changed atomically together with its transaction
//! log.

pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

pub use domain::TraceId;
pub use middleware::Trace;
