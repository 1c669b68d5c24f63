//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Registration inserts the account and its first device in one
//! transaction.

use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use mockable::{Clock, DefaultClock};
use tracing::warn;
use uuid::Uuid;

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{
    DeviceId, Email, Money, PasswordHash, PushAddress, User, UserCredentials, UserId,
};

use super::error_mapping::{DieselFailure, classify_diesel_error};
use super::models::{NewDeviceRow, NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::{devices, users};

/// Diesel-backed account store.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl DieselUserRepository {
    /// Create a repository over `pool` stamping with the system clock.
    pub fn new(pool: DbPool) -> Self {
        Self::with_clock(pool, Arc::new(DefaultClock))
    }

    /// Create a repository over `pool` with an explicit clock.
    pub fn with_clock(pool: DbPool, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self { pool, clock }
    }
}

fn map_pool_error(error: PoolError) -> UserRepositoryError {
    UserRepositoryError::connection(error.into_message())
}

fn map_diesel_error(error: diesel::result::Error, email: Option<&Email>) -> UserRepositoryError {
    match classify_diesel_error(error) {
        DieselFailure::Connection(message) => UserRepositoryError::connection(message),
        DieselFailure::UniqueViolation { constraint } => match email {
            Some(email) => UserRepositoryError::duplicate_email(email.as_ref()),
            None => {
                warn!(?constraint, "unexpected unique violation on users");
                UserRepositoryError::query("constraint violation")
            }
        },
        DieselFailure::ForeignKeyViolation { constraint } => {
            warn!(?constraint, "unexpected constraint violation on users");
            UserRepositoryError::query("constraint violation")
        }
        DieselFailure::Query(message) => UserRepositoryError::query(message),
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(
        &self,
        email: &Email,
        password_hash: &PasswordHash,
        device_id: &DeviceId,
        push_address: Option<PushAddress>,
    ) -> Result<User, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let now = self.clock.utc();
        let user_id = Uuid::new_v4();
        let user_row = NewUserRow {
            id: user_id,
            email: email.as_ref(),
            password_hash: password_hash.as_str(),
            balance_minor: Money::ZERO.minor_units(),
            created_at: now,
            updated_at: now,
        };
        let device_row = NewDeviceRow {
            id: Uuid::new_v4(),
            user_id,
            device_id: device_id.as_ref(),
            is_verified: false,
            push_token: push_address.as_ref().map(AsRef::as_ref),
            created_at: now,
            updated_at: now,
        };

        let stored: UserRow = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    let stored = diesel::insert_into(users::table)
                        .values(&user_row)
                        .returning(UserRow::as_returning())
                        .get_result(conn)
                        .await?;
                    diesel::insert_into(devices::table)
                        .values(&device_row)
                        .execute(conn)
                        .await?;
                    Ok(stored)
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| map_diesel_error(err, Some(email)))?;

        stored.into_user().map_err(UserRepositoryError::query)
    }

    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<UserCredentials>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, None))?;

        row.map(UserRow::into_credentials)
            .transpose()
            .map_err(UserRepositoryError::query)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, None))?;

        row.map(UserRow::into_user)
            .transpose()
            .map_err(UserRepositoryError::query)
    }
}
