//! Conversions from external infrastructure errors into domain errors.

use rusqlite::Error as SqlError;
use showings_domain::SchedulingError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub SchedulingError);

impl From<InfraError> for SchedulingError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<SchedulingError> for InfraError {
    fn from(value: SchedulingError) -> Self {
        InfraError(value)
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        use rusqlite::ffi::ErrorCode;

        let mapped = match value {
            SqlError::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => {
                        SchedulingError::Database("database is busy".into())
                    }
                    (ErrorCode::DatabaseLocked, _) => {
                        SchedulingError::Database("database is locked".into())
                    }
                    (ErrorCode::ConstraintViolation, 2067) => {
                        SchedulingError::Database("unique constraint violation".into())
                    }
                    (ErrorCode::ConstraintViolation, 787) => {
                        SchedulingError::Database("foreign key constraint violation".into())
                    }
                    _ => SchedulingError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            SqlError::QueryReturnedNoRows => {
                SchedulingError::NotFound("no rows returned by query".into())
            }
            SqlError::FromSqlConversionFailure(_, _, cause) => {
                SchedulingError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            SqlError::InvalidColumnType(_, _, ty) => {
                SchedulingError::Database(format!("invalid column type: {ty}"))
            }
            SqlError::Utf8Error(_) => {
                SchedulingError::Database("invalid UTF-8 returned from sqlite".into())
            }
            SqlError::InvalidParameterName(parameter_name) => {
                SchedulingError::Database(format!("invalid parameter name: {parameter_name}"))
            }
            SqlError::InvalidPath(path) => SchedulingError::Database(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            SqlError::InvalidQuery => SchedulingError::Database("invalid SQL query".into()),
            other => SchedulingError::Database(other.to_string()),
        };
        InfraError(mapped)
    }
}

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        InfraError(SchedulingError::Database(format!("connection pool error: {value}")))
    }
}

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        InfraError(SchedulingError::Database(format!("stored JSON is invalid: {value}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_rows_maps_to_not_found() {
        let err: SchedulingError = InfraError::from(SqlError::QueryReturnedNoRows).into();
        assert!(matches!(err, SchedulingError::NotFound(_)));
    }

    #[test]
    fn invalid_query_maps_to_database() {
        let err: SchedulingError = InfraError::from(SqlError::InvalidQuery).into();
        assert!(matches!(err, SchedulingError::Database(_)));
    }
}
