//! Classification of Diesel failures shared by the repositories.
//!
//! Each repository turns a [`DieselFailure`] into its own port error so
//! constraint violations can carry repository-specific meaning.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

/// Coarse failure categories a repository needs to distinguish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DieselFailure {
    /// The connection dropped or could not be used.
    Connection(String),
    /// A unique constraint rejected the write.
    UniqueViolation { constraint: Option<String> },
    /// A foreign key constraint rejected the write.
    ForeignKeyViolation { constraint: Option<String> },
    /// Any other query failure.
    Query(String),
}

/// Classify a Diesel error and emit debug context.
pub(crate) fn classify_diesel_error(error: DieselError) -> DieselFailure {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => DieselFailure::Query("record not found".to_owned()),
        DieselError::QueryBuilderError(_) => {
            DieselFailure::Query("database query error".to_owned())
        }
        DieselError::DatabaseError(kind, info) => match kind {
            DatabaseErrorKind::UniqueViolation => DieselFailure::UniqueViolation {
                constraint: info.constraint_name().map(str::to_owned),
            },
            DatabaseErrorKind::ForeignKeyViolation => DieselFailure::ForeignKeyViolation {
                constraint: info.constraint_name().map(str::to_owned),
            },
            DatabaseErrorKind::ClosedConnection => {
                DieselFailure::Connection("database connection error".to_owned())
            }
            _ => DieselFailure::Query(info.message().to_owned()),
        },
        other => DieselFailure::Query(other.to_string()),
    }
}
