//! Shared helpers for HTTP integration tests over the in-memory store.
//!
//! Each harness wires the production services (Argon2 hashing, HS256 tokens,
//! the ledger service and the tracing notification sink) over a fresh
//! [`InMemoryStore`], so tests drive the full stack without a database.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use actix_http::Request;
use actix_web::body::BoxBody;
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{App, test as actix_test, web};
use mockable::DefaultClock;
use serde_json::{Value, json};
use zeroize::Zeroizing;

use savings_backend::Trace;
use savings_backend::domain::{
    AuthCollaborators, AuthService, DeviceId, LedgerService, NotificationDispatcher, UserId,
};
use savings_backend::inbound::http::configure;
use savings_backend::inbound::http::health::HealthState;
use savings_backend::inbound::http::state::HttpState;
use savings_backend::outbound::crypto::Argon2PasswordHasher;
use savings_backend::outbound::memory::InMemoryStore;
use savings_backend::outbound::notifications::TracingNotificationSink;
use savings_backend::outbound::token::{Hs256TokenService, TokenSettings};

pub const PASSWORD: &str = "correct horse";
pub const DEVICE: &str = "phone-1";

/// Store plus handler state for one test.
pub struct Harness {
    pub store: Arc<InMemoryStore>,
    pub ledger: Arc<LedgerService<InMemoryStore>>,
    pub auth: Arc<AuthService<InMemoryStore, InMemoryStore>>,
    state: web::Data<HttpState>,
    health: web::Data<HealthState>,
}

impl Harness {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let tokens = Arc::new(Hs256TokenService::new(
            TokenSettings {
                secret: Zeroizing::new(vec![42_u8; 32]),
                ttl: Duration::from_secs(3600),
            },
            Arc::new(DefaultClock),
        ));
        let notifications =
            NotificationDispatcher::new(Arc::new(TracingNotificationSink::new(Arc::clone(&store))));
        let ledger = Arc::new(LedgerService::new(Arc::clone(&store), notifications.clone()));
        let auth = Arc::new(AuthService::new(
            Arc::clone(&store),
            Arc::clone(&store),
            AuthCollaborators {
                hasher: Arc::new(Argon2PasswordHasher),
                tokens: tokens.clone(),
                notifications,
            },
        ));
        let state = web::Data::new(HttpState::new(
            ledger.clone(),
            auth.clone(),
            auth.clone(),
            tokens,
        ));
        let health = web::Data::new(HealthState::new());
        health.mark_ready();
        Self {
            store,
            ledger,
            auth,
            state,
            health,
        }
    }

    /// Full application over this harness's state.
    ///
    /// The factory owns clones of the shared state, so it outlives `self`.
    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse<BoxBody>,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        App::new()
            .app_data(self.health.clone())
            .app_data(self.state.clone())
            .wrap(Trace)
            .configure(configure)
    }

    /// Flag a device as verified, standing in for the administrator.
    pub fn verify_device(&self, user_id: &UserId, device_id: &str) {
        let device_id = DeviceId::new(device_id).expect("valid device id");
        assert!(
            self.store.mark_device_verified(user_id, &device_id),
            "device should exist"
        );
    }
}

/// Send a request and decode the JSON response.
pub async fn send<S>(app: &S, request: actix_test::TestRequest) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    let response = actix_test::call_service(app, request.to_request()).await;
    let status = response.status();
    let body = actix_test::read_body(response).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("JSON body")
    };
    (status, value)
}

/// Register an account with [`PASSWORD`] and return its id.
pub async fn register<S>(app: &S, email: &str, device_id: &str) -> UserId
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    let (status, body) = send(
        app,
        actix_test::TestRequest::post()
            .uri("/auth/register")
            .set_json(json!({"email": email, "password": PASSWORD, "deviceId": device_id})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    UserId::new(body["user"]["id"].as_str().expect("user id")).expect("valid user id")
}

/// Attempt a login and return the raw response.
pub async fn login<S>(app: &S, email: &str, device_id: &str) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    send(
        app,
        actix_test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({"email": email, "password": PASSWORD, "deviceId": device_id})),
    )
    .await
}

/// Register, verify and log in; returns the user id and bearer token.
pub async fn signed_in<S>(harness: &Harness, app: &S, email: &str) -> (UserId, String)
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    let user_id = register(app, email, DEVICE).await;
    harness.verify_device(&user_id, DEVICE);
    let (status, body) = login(app, email, DEVICE).await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    let token = body["token"].as_str().expect("token").to_owned();
    (user_id, token)
}

/// Authorised request builder.
pub fn authorised(request: actix_test::TestRequest, token: &str) -> actix_test::TestRequest {
    request.insert_header((AUTHORIZATION, format!("Bearer {token}")))
}
