//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **memory**: in-process store for development and tests
//! - **crypto**: Argon2 password hashing
//! - **token**: HS256 bearer tokens
//! - **notifications**: push notification sink
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business logic.

pub mod crypto;
pub mod memory;
pub mod notifications;
pub mod persistence;
pub mod token;
