//! Internal Diesel row structs for database operations.
//!
//! These types never leave the persistence layer. Conversions into domain
//! types re-validate stored values so corrupt rows surface as query errors.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    Device, DeviceId, Email, Money, PasswordHash, PushAddress, Transaction, TransactionKind,
    User, UserCredentials, UserId,
};

use super::schema::{devices, transactions, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub balance_minor: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRow {
    pub(crate) fn into_credentials(self) -> Result<UserCredentials, String> {
        let password_hash = PasswordHash::new(self.password_hash.clone());
        Ok(UserCredentials {
            user: self.into_user()?,
            password_hash,
        })
    }

    pub(crate) fn into_user(self) -> Result<User, String> {
        let email = Email::new(self.email)
            .map_err(|err| format!("stored email for user {} is invalid: {err}", self.id))?;
        Ok(User {
            id: UserId::from_uuid(self.id),
            email,
            balance: Money::from_minor(self.balance_minor),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Insertable struct for creating account records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub balance_minor: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row struct for reading from the devices table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = devices)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct DeviceRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub device_id: String,
    pub is_verified: bool,
    pub push_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DeviceRow> for Device {
    type Error = String;

    fn try_from(row: DeviceRow) -> Result<Self, Self::Error> {
        let device_id = DeviceId::new(row.device_id)
            .map_err(|err| format!("stored device {} is invalid: {err}", row.id))?;
        let push_address = row
            .push_token
            .filter(|token| !token.trim().is_empty())
            .map(PushAddress::new)
            .transpose()
            .map_err(|err| format!("stored push token for device {} is invalid: {err}", row.id))?;
        Ok(Self {
            id: row.id,
            user_id: UserId::from_uuid(row.user_id),
            device_id,
            is_verified: row.is_verified,
            push_address,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Insertable struct for creating device records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = devices)]
pub(crate) struct NewDeviceRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub device_id: &'a str,
    pub is_verified: bool,
    pub push_token: Option<&'a str>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row struct for reading from the transactions table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = transactions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TransactionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub amount_minor: i64,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = String;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let kind: TransactionKind = row.kind.parse().map_err(|err| format!("{err}"))?;
        Ok(Self {
            id: row.id,
            user_id: UserId::from_uuid(row.user_id),
            kind,
            amount: Money::from_minor(row.amount_minor),
            created_at: row.created_at,
        })
    }
}

/// Insertable struct for appending ledger entries.
///
/// `seq` is assigned by the database.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = transactions)]
pub(crate) struct NewTransactionRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: &'a str,
    pub amount_minor: i64,
    pub created_at: DateTime<Utc>,
}
