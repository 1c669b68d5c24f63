//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::web;

use crate::domain::UserId;
use crate::domain::ports::{
    MockLoginService, MockRegistrationService, MockSavingsLedger, MockTokenService, TokenError,
};

use super::state::HttpState;

/// Token accepted by the default [`TestPorts`] token mock.
pub const VALID_TOKEN: &str = "valid-token";

const TEST_USER_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

/// Identity carried by [`VALID_TOKEN`].
pub fn test_user_id() -> UserId {
    UserId::new(TEST_USER_ID).expect("fixture user id is valid")
}

/// Token mock that accepts [`VALID_TOKEN`] and rejects everything else.
pub fn accepting_tokens() -> MockTokenService {
    let mut tokens = MockTokenService::new();
    tokens.expect_verify().returning(|token| {
        if token == VALID_TOKEN {
            Ok(test_user_id())
        } else {
            Err(TokenError::bad_signature())
        }
    });
    tokens
}

/// Mock ports for handler tests. Unconfigured mocks panic when called.
pub struct TestPorts {
    pub ledger: MockSavingsLedger,
    pub registration: MockRegistrationService,
    pub login: MockLoginService,
    pub tokens: MockTokenService,
}

impl Default for TestPorts {
    fn default() -> Self {
        Self {
            ledger: MockSavingsLedger::new(),
            registration: MockRegistrationService::new(),
            login: MockLoginService::new(),
            tokens: accepting_tokens(),
        }
    }
}

impl TestPorts {
    /// Wrap the mocks in handler state.
    pub fn into_state(self) -> web::Data<HttpState> {
        web::Data::new(HttpState::new(
            Arc::new(self.ledger),
            Arc::new(self.registration),
            Arc::new(self.login),
            Arc::new(self.tokens),
        ))
    }
}
