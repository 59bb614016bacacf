//! Shared Diesel error mapping for the consultation adapters.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Map pool errors into a repository-specific connection error constructor.
pub(crate) fn map_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

/// Map common Diesel error variants into query/connection constructors.
///
/// Closed connections become connection errors; everything else is a query
/// error with a generic message so SQL details stay in the debug log.
pub(crate) fn map_diesel_error<E, Q, C>(error: DieselError, query: Q, connection: C) -> E
where
    Q: Fn(&'static str) -> E,
    C: Fn(&'static str) -> E,
{
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(
                ?kind,
                message = info.message(),
                constraint = info.constraint_name(),
                "diesel operation failed"
            );
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => query("record not found"),
        DieselError::QueryBuilderError(_) => query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection error")
        }
        _ => query("database error"),
    }
}

/// Whether `error` is a unique violation of the named constraint or index.
pub(crate) fn is_unique_violation(error: &DieselError, constraint: &str) -> bool {
    matches!(
        error,
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info)
            if info.constraint_name() == Some(constraint)
    )
}

/// Convert a page offset or limit into the `BIGINT` Diesel expects.
pub(crate) fn to_sql_bigint<E>(value: u64, query: impl FnOnce(String) -> E) -> Result<i64, E> {
    i64::try_from(value).map_err(|_| query(format!("page bound {value} exceeds BIGINT")))
}

/// Convert a `COUNT(*)` result into an unsigned total.
pub(crate) fn count_to_u64(count: i64) -> u64 {
    u64::try_from(count).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[derive(Debug, PartialEq, Eq)]
    enum Mapped {
        Query(String),
        Connection(String),
    }

    fn query(message: &'static str) -> Mapped {
        Mapped::Query(message.to_owned())
    }

    fn connection(message: &'static str) -> Mapped {
        Mapped::Connection(message.to_owned())
    }

    #[rstest]
    fn pool_errors_become_connection_errors() {
        let mapped = map_pool_error(PoolError::checkout("timed out"), Mapped::Connection);
        assert_eq!(mapped, Mapped::Connection("timed out".to_owned()));
    }

    #[rstest]
    #[case(DieselError::NotFound, Mapped::Query("record not found".to_owned()))]
    #[case(DieselError::RollbackTransaction, Mapped::Query("database error".to_owned()))]
    fn diesel_errors_become_query_errors(#[case] error: DieselError, #[case] expected: Mapped) {
        assert_eq!(map_diesel_error(error, query, connection), expected);
    }

    #[rstest]
    fn non_database_errors_are_not_unique_violations() {
        assert!(!is_unique_violation(
            &DieselError::NotFound,
            "consultations_one_active_per_user_brand"
        ));
    }

    #[rstest]
    #[case(0, 0)]
    #[case(-1, 0)]
    #[case(42, 42)]
    fn counts_clamp_to_unsigned(#[case] count: i64, #[case] expected: u64) {
        assert_eq!(count_to_u64(count), expected);
    }

    #[rstest]
    fn oversized_page_bounds_are_rejected() {
        let result = to_sql_bigint(u64::MAX, |message| message);
        assert!(result.is_err());
    }
}
