//! Tests for savings handlers.

use super::*;
use crate::domain::{Error, UserId};
use crate::inbound::http::json_config;
use crate::inbound::http::test_utils::{TestPorts, VALID_TOKEN, test_user_id};
use actix_web::http::StatusCode;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{App, test as actix_test};
use rstest::rstest;
use serde_json::json;
use uuid::Uuid;

async fn send(
    ports: TestPorts,
    request: actix_test::TestRequest,
    authorised: bool,
) -> (StatusCode, Value) {
    let app = actix_test::init_service(
        App::new()
            .app_data(ports.into_state())
            .app_data(json_config())
            .service(
                web::scope("/savings")
                    .service(get_balance)
                    .service(deposit_funds)
                    .service(withdraw_funds)
                    .service(get_history),
            ),
    )
    .await;
    let request = if authorised {
        request.insert_header((AUTHORIZATION, format!("Bearer {VALID_TOKEN}")))
    } else {
        request
    };
    let response = actix_test::call_service(&app, request.to_request()).await;
    let status = response.status();
    let body = actix_test::read_body(response).await;
    (status, serde_json::from_slice(&body).expect("JSON body"))
}

fn is_test_user(user_id: &UserId) -> bool {
    *user_id == test_user_id()
}

#[actix_web::test]
async fn balance_is_rendered_as_a_number() {
    let mut ports = TestPorts::default();
    ports
        .ledger
        .expect_balance()
        .withf(is_test_user)
        .return_once(|_| Ok(Money::from_minor(12_050)));

    let (status, body) = send(
        ports,
        actix_test::TestRequest::get().uri("/savings/balance"),
        true,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"balance": 120.5}));
}

#[actix_web::test]
async fn deposit_passes_minor_units_to_the_ledger() {
    let mut ports = TestPorts::default();
    ports
        .ledger
        .expect_deposit()
        .withf(|user_id, amount| is_test_user(user_id) && amount.minor_units() == 5_025)
        .times(1)
        .return_once(|_, _| Ok(Money::from_minor(15_025)));

    let (status, body) = send(
        ports,
        actix_test::TestRequest::post()
            .uri("/savings/deposit")
            .set_json(json!({"amount": 50.25})),
        true,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"balance": 150.25}));
}

#[rstest]
#[case("1000000000000000.01", 100_000_000_000_000_001)]
#[case("90071992547409.93", 9_007_199_254_740_993)]
#[actix_web::test]
async fn large_amounts_keep_every_cent(#[case] literal: &str, #[case] expected: i64) {
    let mut ports = TestPorts::default();
    ports
        .ledger
        .expect_deposit()
        .withf(move |_, amount| amount.minor_units() == expected)
        .times(1)
        .return_once(move |_, _| Ok(Money::from_minor(expected)));

    let (status, _) = send(
        ports,
        actix_test::TestRequest::post()
            .uri("/savings/deposit")
            .insert_header((actix_web::http::header::CONTENT_TYPE, "application/json"))
            .set_payload(format!(r#"{{"amount": {literal}}}"#)),
        true,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
}

#[rstest]
#[case(json!({"amount": -10}), "invalid_amount")]
#[case(json!({"amount": 0}), "invalid_amount")]
#[case(json!({"amount": "ten"}), "invalid_amount")]
#[case(json!({"amount": 1.005}), "invalid_amount")]
#[case(json!({}), "invalid_request")]
#[actix_web::test]
async fn invalid_amounts_never_reach_the_ledger(#[case] payload: Value, #[case] code: &str) {
    let (status, body) = send(
        TestPorts::default(),
        actix_test::TestRequest::post()
            .uri("/savings/deposit")
            .set_json(payload),
        true,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], code);
}

#[actix_web::test]
async fn insufficient_balance_is_a_bad_request() {
    let mut ports = TestPorts::default();
    ports
        .ledger
        .expect_withdraw()
        .return_once(|_, _| Err(Error::insufficient_balance()));

    let (status, body) = send(
        ports,
        actix_test::TestRequest::post()
            .uri("/savings/withdraw")
            .set_json(json!({"amount": 80})),
        true,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Insufficient balance");
}

#[actix_web::test]
async fn history_uses_client_field_names() {
    let id = Uuid::new_v4();
    let created_at = Utc::now();
    let mut ports = TestPorts::default();
    ports.ledger.expect_history().return_once(move |user_id| {
        Ok(vec![Transaction {
            id,
            user_id: user_id.clone(),
            kind: TransactionKind::Withdraw,
            amount: Money::from_minor(500),
            created_at,
        }])
    });

    let (status, body) = send(
        ports,
        actix_test::TestRequest::get().uri("/savings/history"),
        true,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let entry = &body["history"][0];
    assert_eq!(entry["id"], id.to_string());
    assert_eq!(entry["type"], "withdraw");
    assert_eq!(entry["amount"], json!(5.0));
    assert!(entry["createdAt"].is_string());
}

#[rstest]
#[case(actix_test::TestRequest::get().uri("/savings/balance"))]
#[case(actix_test::TestRequest::get().uri("/savings/history"))]
#[case(actix_test::TestRequest::post().uri("/savings/deposit").set_json(json!({"amount": 1})))]
#[actix_web::test]
async fn routes_require_a_token(#[case] request: actix_test::TestRequest) {
    let (status, body) = send(TestPorts::default(), request, false).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Access denied");
}
