//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Account holders and their authoritative balance.
    users (id) {
        id -> Uuid,
        /// Unique, case-sensitive login email.
        email -> Varchar,
        /// PHC-formatted password hash.
        password_hash -> Text,
        /// Balance in minor units; `CHECK (balance_minor >= 0)`.
        balance_minor -> Int8,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Devices registered per account; `UNIQUE (user_id, device_id)`.
    devices (id) {
        id -> Uuid,
        user_id -> Uuid,
        device_id -> Varchar,
        /// Set only by the out-of-band verification process.
        is_verified -> Bool,
        push_token -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only ledger entries.
    transactions (id) {
        id -> Uuid,
        /// Insertion order, used to break `created_at` ties.
        seq -> Int8,
        user_id -> Uuid,
        /// `deposit` or `withdraw`.
        kind -> Varchar,
        /// Positive amount in minor units.
        amount_minor -> Int8,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(devices -> users (user_id));
diesel::joinable!(transactions -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(users, devices, transactions);
