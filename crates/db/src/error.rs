use sqlx::migrate::MigrateError;

/// Failure of a store operation, classified at the adapter boundary.
///
/// `Unavailable` marks transient connection-level failures that a fresh
/// handle may fix; everything else is an `Operation` failure.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Store operation failed: {0}")]
    Operation(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if is_connection_error(&err) {
            StoreError::Unavailable(err.to_string())
        } else {
            StoreError::Operation(err.to_string())
        }
    }
}

impl From<MigrateError> for StoreError {
    fn from(err: MigrateError) -> Self {
        match err {
            MigrateError::Execute(inner) => inner.into(),
            other => StoreError::Operation(other.to_string()),
        }
    }
}

/// Whether a sqlx error means the connection itself is broken.
///
/// Covers transport failures, pool exhaustion/closure and the PostgreSQL
/// SQLSTATE codes for connection exceptions (class `08`) and server
/// shutdown (`57P01`..`57P03`).
pub fn is_connection_error(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => true,
        sqlx::Error::Database(db_err) => db_err
            .code()
            .is_some_and(|code| code.starts_with("08") || matches!(&*code, "57P01" | "57P02" | "57P03")),
        _ => false,
    }
}
