//! Tests for registration and login orchestration.

use std::sync::Arc;

use chrono::{Duration, Utc};
use rstest::{fixture, rstest};
use uuid::Uuid;

use super::*;
use crate::domain::ports::{
    IssuedToken, MockDeviceRepository, MockNotificationSink, MockPasswordHasher, MockTokenService,
    MockUserRepository,
};
use crate::domain::{DeviceId, Email, ErrorCode, Money, PushAddress, UserCredentials, UserId};

const EMAIL: &str = "ada@example.com";
const DEVICE: &str = "phone-1";

fn stored_user() -> User {
    let now = Utc::now();
    User {
        id: UserId::random(),
        email: Email::new(EMAIL).expect("email"),
        balance: Money::ZERO,
        created_at: now,
        updated_at: now,
    }
}

fn device_for(user: &User, verified: bool, push: Option<&str>) -> Device {
    let now = Utc::now();
    Device {
        id: Uuid::new_v4(),
        user_id: user.id.clone(),
        device_id: DeviceId::new(DEVICE).expect("device id"),
        is_verified: verified,
        push_address: push.map(|raw| PushAddress::new(raw).expect("push address")),
        created_at: now,
        updated_at: now,
    }
}

/// Hasher that stores passwords as `hashed:<password>`.
fn plain_hasher() -> MockPasswordHasher {
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_hash()
        .returning(|password| Ok(PasswordHash::new(format!("hashed:{password}"))));
    hasher
        .expect_verify()
        .returning(|password, hash| Ok(hash.as_str() == format!("hashed:{password}")));
    hasher
}

fn fixed_tokens() -> MockTokenService {
    let mut tokens = MockTokenService::new();
    tokens.expect_issue().returning(|_| {
        Ok(IssuedToken {
            token: "signed-token".to_owned(),
            expires_at: Utc::now() + Duration::hours(1),
        })
    });
    tokens
}

#[fixture]
fn collaborators() -> AuthCollaborators {
    let mut sink = MockNotificationSink::new();
    sink.expect_notify().returning(|_, _| Ok(()));
    AuthCollaborators {
        hasher: Arc::new(plain_hasher()),
        tokens: Arc::new(fixed_tokens()),
        notifications: NotificationDispatcher::new(Arc::new(sink)),
    }
}

fn login_credentials(password: &str, push: Option<&str>) -> LoginCredentials {
    LoginCredentials::try_from_parts(EMAIL, password, DEVICE, push).expect("credentials")
}

fn users_with(user: Option<User>) -> MockUserRepository {
    let mut users = MockUserRepository::new();
    users.expect_find_by_email().return_once(move |_| {
        Ok(user.map(|user| UserCredentials {
            user,
            password_hash: PasswordHash::new("hashed:secret"),
        }))
    });
    users
}

#[rstest]
#[tokio::test]
async fn register_hashes_and_creates_unverified_device(collaborators: AuthCollaborators) {
    let created = stored_user();
    let mut users = MockUserRepository::new();
    users
        .expect_create()
        .withf(|email, hash, device_id, push| {
            email.as_ref() == EMAIL
                && hash.as_str() == "hashed:secret"
                && device_id.as_ref() == DEVICE
                && push.as_ref().map(AsRef::as_ref) == Some("tok")
        })
        .times(1)
        .return_once(move |_, _, _, _| Ok(created));
    let service = AuthService::new(
        Arc::new(users),
        Arc::new(MockDeviceRepository::new()),
        collaborators,
    );
    let registration =
        Registration::try_from_parts(EMAIL, "secret", DEVICE, Some("tok")).expect("registration");

    let registered = service.register(&registration).await.expect("register");

    assert_eq!(registered.balance, Money::ZERO);
    assert_eq!(registered.email.as_ref(), EMAIL);
}

#[rstest]
#[case(UserRepositoryError::duplicate_email(EMAIL), ErrorCode::DuplicateEmail)]
#[case(UserRepositoryError::query("device insert failed"), ErrorCode::InternalError)]
#[case(UserRepositoryError::connection("refused"), ErrorCode::ServiceUnavailable)]
#[tokio::test]
async fn register_surfaces_store_failures(
    collaborators: AuthCollaborators,
    #[case] failure: UserRepositoryError,
    #[case] expected: ErrorCode,
) {
    let mut users = MockUserRepository::new();
    users
        .expect_create()
        .times(1)
        .return_once(move |_, _, _, _| Err(failure));
    let service = AuthService::new(
        Arc::new(users),
        Arc::new(MockDeviceRepository::new()),
        collaborators,
    );
    let registration =
        Registration::try_from_parts(EMAIL, "secret", DEVICE, None).expect("registration");

    let err = service.register(&registration).await.expect_err("store failure");

    assert_eq!(err.code(), expected);
}

#[rstest]
#[case(None, "secret")]
#[case(Some(()), "wrong-password")]
#[tokio::test]
async fn login_rejects_bad_credentials_with_one_message(
    collaborators: AuthCollaborators,
    #[case] known: Option<()>,
    #[case] password: &str,
) {
    let users = users_with(known.map(|()| stored_user()));
    let mut devices = MockDeviceRepository::new();
    devices.expect_find().times(0);
    let service = AuthService::new(Arc::new(users), Arc::new(devices), collaborators);

    let err = service
        .login(&login_credentials(password, None))
        .await
        .expect_err("login rejected");

    assert_eq!(err.code(), ErrorCode::InvalidCredentials);
    assert_eq!(err.message(), INVALID_CREDENTIALS_MESSAGE);
}

#[rstest]
#[tokio::test]
async fn login_requires_registered_device(collaborators: AuthCollaborators) {
    let users = users_with(Some(stored_user()));
    let mut devices = MockDeviceRepository::new();
    devices.expect_find().times(1).return_once(|_, _| Ok(None));
    let service = AuthService::new(Arc::new(users), Arc::new(devices), collaborators);

    let err = service
        .login(&login_credentials("secret", None))
        .await
        .expect_err("login rejected");

    assert_eq!(err.code(), ErrorCode::DeviceNotRegistered);
}

#[rstest]
#[tokio::test]
async fn login_requires_verified_device(collaborators: AuthCollaborators) {
    let user = stored_user();
    let device = device_for(&user, false, None);
    let users = users_with(Some(user));
    let mut devices = MockDeviceRepository::new();
    devices
        .expect_find()
        .times(1)
        .return_once(move |_, _| Ok(Some(device)));
    devices.expect_update_push_address().times(0);
    let service = AuthService::new(Arc::new(users), Arc::new(devices), collaborators);

    let err = service
        .login(&login_credentials("secret", Some("tok")))
        .await
        .expect_err("login rejected");

    assert_eq!(err.code(), ErrorCode::DeviceNotVerified);
}

#[rstest]
#[case(None, Some("tok-new"), 1)]
#[case(Some("tok-old"), Some("tok-new"), 1)]
#[case(Some("tok-same"), Some("tok-same"), 0)]
#[case(Some("tok-old"), None, 0)]
#[tokio::test]
async fn login_updates_push_address_only_when_changed(
    collaborators: AuthCollaborators,
    #[case] stored: Option<&'static str>,
    #[case] presented: Option<&'static str>,
    #[case] expected_updates: usize,
) {
    let user = stored_user();
    let device = device_for(&user, true, stored);
    let users = users_with(Some(user));
    let mut devices = MockDeviceRepository::new();
    devices
        .expect_find()
        .times(1)
        .return_once(move |_, _| Ok(Some(device)));
    devices
        .expect_update_push_address()
        .times(expected_updates)
        .returning(|_, _| Ok(true));
    let service = AuthService::new(Arc::new(users), Arc::new(devices), collaborators);

    let outcome = service
        .login(&login_credentials("secret", presented))
        .await
        .expect("login succeeds");

    assert_eq!(outcome.token, "signed-token");
}

#[rstest]
#[tokio::test]
async fn push_update_failure_does_not_fail_login(collaborators: AuthCollaborators) {
    let user = stored_user();
    let expected_id = user.id.clone();
    let device = device_for(&user, true, None);
    let users = users_with(Some(user));
    let mut devices = MockDeviceRepository::new();
    devices
        .expect_find()
        .times(1)
        .return_once(move |_, _| Ok(Some(device)));
    devices
        .expect_update_push_address()
        .times(1)
        .return_once(|_, _| Err(DeviceRepositoryError::connection("refused")));
    let service = AuthService::new(Arc::new(users), Arc::new(devices), collaborators);

    let outcome = service
        .login(&login_credentials("secret", Some("tok")))
        .await
        .expect("login succeeds");

    assert_eq!(outcome.user.id, expected_id);
    assert_eq!(outcome.user.balance, Money::ZERO);
}
