//! Classification of sqlx failures into application errors.

use stashbox_core::error::{AppError, ErrorKind};

/// Map a sqlx error onto the matching [`ErrorKind`].
///
/// Connectivity problems become [`ErrorKind::Transient`] so callers may
/// retry them; constraint violations surface as caller errors.
pub(crate) fn classify(err: &sqlx::Error) -> ErrorKind {
    match err {
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Protocol(_)
        | sqlx::Error::WorkerCrashed => ErrorKind::Transient,
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => ErrorKind::Validation,
        sqlx::Error::Database(db) if db.is_check_violation() => ErrorKind::Validation,
        sqlx::Error::Database(db) if db.is_unique_violation() => ErrorKind::Conflict,
        _ => ErrorKind::Database,
    }
}

/// Wrap a sqlx error with context, keeping it as the source.
pub(crate) fn db_error(context: &str, err: sqlx::Error) -> AppError {
    let kind = classify(&err);
    let message = match (&err, kind) {
        (_, ErrorKind::Transient) => format!("{context}: database temporarily unavailable"),
        (sqlx::Error::Database(db), _) if db.is_foreign_key_violation() => {
            format!("{context}: the referenced parent no longer exists")
        }
        (_, ErrorKind::Validation) => format!("{context}: node violates a tree constraint"),
        (_, ErrorKind::Conflict) => format!("{context}: node already exists"),
        _ => context.to_string(),
    };
    AppError::with_source(kind, message, err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_timeout_is_transient() {
        assert_eq!(classify(&sqlx::Error::PoolTimedOut), ErrorKind::Transient);
        assert!(db_error("Failed to find node", sqlx::Error::PoolClosed).is_retryable());
    }

    #[test]
    fn test_row_not_found_is_plain_database_error() {
        let err = db_error("Failed to update node", sqlx::Error::RowNotFound);
        assert_eq!(err.kind, ErrorKind::Database);
        assert!(!err.is_retryable());
    }
}
