//! PostgreSQL-backed `DeviceRepository` implementation using Diesel ORM.

use std::sync::Arc;

use async_trait::async_trait;
use diesel::PgExpressionMethods;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use mockable::{Clock, DefaultClock};
use tracing::warn;

use crate::domain::ports::{DeviceRepository, DeviceRepositoryError};
use crate::domain::{Device, DeviceId, PushAddress, UserId};

use super::error_mapping::{DieselFailure, classify_diesel_error};
use super::models::DeviceRow;
use super::pool::{DbPool, PoolError};
use super::schema::devices;

/// Diesel-backed device store.
#[derive(Clone)]
pub struct DieselDeviceRepository {
    pool: DbPool,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl DieselDeviceRepository {
    /// Create a repository over `pool` stamping with the system clock.
    pub fn new(pool: DbPool) -> Self {
        Self::with_clock(pool, Arc::new(DefaultClock))
    }

    /// Create a repository over `pool` with an explicit clock.
    pub fn with_clock(pool: DbPool, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self { pool, clock }
    }
}

fn map_pool_error(error: PoolError) -> DeviceRepositoryError {
    DeviceRepositoryError::connection(error.into_message())
}

fn map_diesel_error(error: diesel::result::Error) -> DeviceRepositoryError {
    match classify_diesel_error(error) {
        DieselFailure::Connection(message) => DeviceRepositoryError::connection(message),
        DieselFailure::UniqueViolation { constraint }
        | DieselFailure::ForeignKeyViolation { constraint } => {
            warn!(?constraint, "unexpected constraint violation on devices");
            DeviceRepositoryError::query("constraint violation")
        }
        DieselFailure::Query(message) => DeviceRepositoryError::query(message),
    }
}

fn into_devices(rows: Vec<DeviceRow>) -> Result<Vec<Device>, DeviceRepositoryError> {
    rows.into_iter()
        .map(|row| Device::try_from(row).map_err(DeviceRepositoryError::query))
        .collect()
}

#[async_trait]
impl DeviceRepository for DieselDeviceRepository {
    async fn find(
        &self,
        user_id: &UserId,
        device_id: &DeviceId,
    ) -> Result<Option<Device>, DeviceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<DeviceRow> = devices::table
            .filter(devices::user_id.eq(user_id.as_uuid()))
            .filter(devices::device_id.eq(device_id.as_ref()))
            .select(DeviceRow::as_select())
            .limit(1)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(into_devices(rows)?.into_iter().next())
    }

    async fn update_push_address(
        &self,
        device: &Device,
        address: &PushAddress,
    ) -> Result<bool, DeviceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let updated = diesel::update(
            devices::table
                .filter(devices::id.eq(device.id))
                .filter(devices::push_token.is_distinct_from(address.as_ref())),
        )
        .set((
            devices::push_token.eq(Some(address.as_ref())),
            devices::updated_at.eq(self.clock.utc()),
        ))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        Ok(updated > 0)
    }

    async fn push_addresses(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<PushAddress>, DeviceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let tokens: Vec<Option<String>> = devices::table
            .filter(devices::user_id.eq(user_id.as_uuid()))
            .filter(devices::push_token.is_not_null())
            .order(devices::created_at.asc())
            .select(devices::push_token)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(tokens
            .into_iter()
            .flatten()
            .filter_map(|token| PushAddress::new(token).ok())
            .collect())
    }
}
