//! Actix middleware wrapped around every savings and auth route.

pub mod trace;

pub use trace::Trace;
