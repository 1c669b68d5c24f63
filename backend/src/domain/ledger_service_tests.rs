//! Tests for the savings ledger service.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rstest::rstest;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::*;
use crate::domain::ports::{MockLedgerRepository, MockNotificationSink};
use crate::domain::{ErrorCode, NotificationKind};

fn receipt(user_id: &UserId, kind: TransactionKind, amount: i64, balance: i64) -> LedgerReceipt {
    LedgerReceipt {
        transaction: Transaction {
            id: Uuid::new_v4(),
            user_id: user_id.clone(),
            kind,
            amount: Money::from_minor(amount),
            created_at: Utc::now(),
        },
        balance: Money::from_minor(balance),
    }
}

fn recording_dispatcher() -> (NotificationDispatcher, mpsc::UnboundedReceiver<NotificationKind>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let mut sink = MockNotificationSink::new();
    sink.expect_notify().returning(move |_, notification| {
        let _ = tx.send(notification.kind);
        Ok(())
    });
    (NotificationDispatcher::new(Arc::new(sink)), rx)
}

fn silent_dispatcher() -> NotificationDispatcher {
    let mut sink = MockNotificationSink::new();
    sink.expect_notify().times(0);
    NotificationDispatcher::new(Arc::new(sink))
}

async fn next_kind(rx: &mut mpsc::UnboundedReceiver<NotificationKind>) -> Option<NotificationKind> {
    tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .ok()
        .flatten()
}

#[tokio::test]
async fn deposit_returns_new_balance_and_confirms() {
    let user_id = UserId::random();
    let mut repo = MockLedgerRepository::new();
    let expected_user = user_id.clone();
    repo.expect_apply()
        .withf(move |id, kind, amount| {
            id == &expected_user
                && *kind == TransactionKind::Deposit
                && *amount == Money::from_minor(1_000)
        })
        .times(1)
        .return_once(|id, kind, _| Ok(receipt(id, kind, 1_000, 1_000)));
    let (dispatcher, mut rx) = recording_dispatcher();
    let service = LedgerService::new(Arc::new(repo), dispatcher);

    let balance = service
        .deposit(&user_id, Money::from_minor(1_000))
        .await
        .expect("deposit succeeds");

    assert_eq!(balance, Money::from_minor(1_000));
    assert_eq!(next_kind(&mut rx).await, Some(NotificationKind::DepositConfirmed));
}

#[rstest]
#[case(0)]
#[case(-500)]
#[tokio::test]
async fn non_positive_amounts_never_reach_the_repository(#[case] minor: i64) {
    let mut repo = MockLedgerRepository::new();
    repo.expect_apply().times(0);
    let service = LedgerService::new(Arc::new(repo), silent_dispatcher());

    let deposit = service
        .deposit(&UserId::random(), Money::from_minor(minor))
        .await
        .expect_err("deposit rejected");
    let withdraw = service
        .withdraw(&UserId::random(), Money::from_minor(minor))
        .await
        .expect_err("withdraw rejected");

    assert_eq!(deposit.code(), ErrorCode::InvalidAmount);
    assert_eq!(withdraw.code(), ErrorCode::InvalidAmount);
}

#[tokio::test]
async fn withdraw_below_threshold_raises_low_balance() {
    let user_id = UserId::random();
    let mut repo = MockLedgerRepository::new();
    repo.expect_apply()
        .times(1)
        .return_once(|id, kind, _| Ok(receipt(id, kind, 8_000, 2_000)));
    let (dispatcher, mut rx) = recording_dispatcher();
    let service = LedgerService::new(Arc::new(repo), dispatcher);

    let balance = service
        .withdraw(&user_id, Money::from_minor(8_000))
        .await
        .expect("withdraw succeeds");

    assert_eq!(balance, Money::from_minor(2_000));
    assert_eq!(next_kind(&mut rx).await, Some(NotificationKind::WithdrawalConfirmed));
    assert_eq!(next_kind(&mut rx).await, Some(NotificationKind::LowBalance));
}

#[tokio::test]
async fn failed_mutations_emit_nothing() {
    let mut repo = MockLedgerRepository::new();
    repo.expect_apply()
        .times(1)
        .return_once(|_, _, _| Err(LedgerRepositoryError::insufficient_balance()));
    let service = LedgerService::new(Arc::new(repo), silent_dispatcher());

    let err = service
        .withdraw(&UserId::random(), Money::from_minor(8_000))
        .await
        .expect_err("withdraw rejected");

    assert_eq!(err.code(), ErrorCode::InsufficientBalance);
    assert_eq!(err.message(), "Insufficient balance");
}

#[rstest]
#[case(LedgerRepositoryError::user_not_found(), ErrorCode::UserNotFound)]
#[case(LedgerRepositoryError::connection("refused"), ErrorCode::ServiceUnavailable)]
#[case(LedgerRepositoryError::query("syntax error"), ErrorCode::InternalError)]
#[tokio::test]
async fn balance_maps_repository_errors(
    #[case] error: LedgerRepositoryError,
    #[case] expected: ErrorCode,
) {
    let mut repo = MockLedgerRepository::new();
    repo.expect_balance().times(1).return_once(move |_| Err(error));
    let service = LedgerService::new(Arc::new(repo), silent_dispatcher());

    let err = service
        .balance(&UserId::random())
        .await
        .expect_err("balance fails");

    assert_eq!(err.code(), expected);
}

#[tokio::test]
async fn connection_errors_do_not_leak_details() {
    let mut repo = MockLedgerRepository::new();
    repo.expect_history()
        .times(1)
        .return_once(|_| Err(LedgerRepositoryError::connection("host=db.internal")));
    let service = LedgerService::new(Arc::new(repo), silent_dispatcher());

    let err = service
        .history(&UserId::random())
        .await
        .expect_err("history fails");

    assert!(!err.message().contains("db.internal"));
}

#[tokio::test]
async fn history_passes_repository_order_through() {
    let user_id = UserId::random();
    let entries = vec![
        receipt(&user_id, TransactionKind::Withdraw, 500, 2_500).transaction,
        receipt(&user_id, TransactionKind::Deposit, 2_000, 3_000).transaction,
    ];
    let expected = entries.clone();
    let mut repo = MockLedgerRepository::new();
    repo.expect_history().times(1).return_once(move |_| Ok(entries));
    let service = LedgerService::new(Arc::new(repo), silent_dispatcher());

    let history = service.history(&user_id).await.expect("history succeeds");

    assert_eq!(history, expected);
}
