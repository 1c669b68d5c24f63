//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{LoginService, RegistrationService, SavingsLedger, TokenService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub ledger: Arc<dyn SavingsLedger>,
    pub registration: Arc<dyn RegistrationService>,
    pub login: Arc<dyn LoginService>,
    /// Verifies bearer tokens for [`super::auth::AuthenticatedUser`].
    pub tokens: Arc<dyn TokenService>,
}

impl HttpState {
    /// Bundle the driving ports used by the handlers.
    pub fn new(
        ledger: Arc<dyn SavingsLedger>,
        registration: Arc<dyn RegistrationService>,
        login: Arc<dyn LoginService>,
        tokens: Arc<dyn TokenService>,
    ) -> Self {
        Self {
            ledger,
            registration,
            login,
            tokens,
        }
    }
}
