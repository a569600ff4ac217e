//! Diesel and pool error mapping for the lending adapters.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::LendingStoreError;

use super::pool::PoolError;

/// Map pool errors to connection failures.
pub(crate) fn map_pool_error(error: PoolError) -> LendingStoreError {
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    LendingStoreError::connection(message)
}

/// Map Diesel errors to lending store errors.
///
/// Unique and serialisation violations become [`LendingStoreError::Conflict`]
/// so callers can tell a lost race from a broken query.
pub(crate) fn map_diesel_error(error: DieselError) -> LendingStoreError {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(
                ?kind,
                message = info.message(),
                constraint = ?info.constraint_name(),
                "diesel operation failed"
            );
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => LendingStoreError::query("record not found"),
        DieselError::QueryBuilderError(_) => LendingStoreError::query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            LendingStoreError::conflict(
                info.constraint_name()
                    .map_or_else(|| "unique constraint violated".to_owned(), str::to_owned),
            )
        }
        DieselError::DatabaseError(DatabaseErrorKind::SerializationFailure, _) => {
            LendingStoreError::conflict("serialisation failure")
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            LendingStoreError::connection("database connection error")
        }
        DieselError::DatabaseError(_, _) => LendingStoreError::query("database error"),
        _ => LendingStoreError::query("database error"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(PoolError::checkout("timed out"))]
    #[case(PoolError::build("bad url"))]
    fn pool_errors_are_connection_failures(#[case] error: PoolError) {
        assert!(matches!(
            map_pool_error(error),
            LendingStoreError::Connection { .. }
        ));
    }

    #[rstest]
    fn missing_row_is_a_query_error() {
        assert!(matches!(
            map_diesel_error(DieselError::NotFound),
            LendingStoreError::Query { .. }
        ));
    }

    #[rstest]
    fn rolled_back_transaction_is_a_query_error() {
        assert!(matches!(
            map_diesel_error(DieselError::RollbackTransaction),
            LendingStoreError::Query { .. }
        ));
    }
}
