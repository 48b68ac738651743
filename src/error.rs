use crate::database::DatabaseError;
use crate::telegram::TelegramError;
use sqlx::Error as SqlxError;
use thiserror::Error;

/// Application-level error types; all of them end the process
#[derive(Error, Debug)]
pub enum AppError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Messaging platform errors
    #[error("Telegram error: {0}")]
    Telegram(#[from] TelegramError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The worker or the poller stopped without a shutdown signal
    #[error("Unexpected shutdown: {0}")]
    Shutdown(String),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Check if error is a database connection error
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            AppError::Database(DatabaseError::PoolCreation(_))
                | AppError::Database(DatabaseError::ConnectionTimeout)
        )
    }
}

/// Repository-specific error types
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Database query error
    #[error("Query error: {0}")]
    Query(SqlxError),

    /// Record not found
    #[error("Record not found")]
    NotFound(String),

    /// Duplicate record
    #[error("Duplicate record: {0}")]
    Duplicate(String),

    /// Store not reachable or otherwise failing outside of a query
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl RepositoryError {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, RepositoryError::Duplicate(_))
    }
}

impl From<SqlxError> for RepositoryError {
    fn from(err: SqlxError) -> Self {
        match &err {
            SqlxError::RowNotFound => RepositoryError::NotFound("Record not found".to_string()),
            SqlxError::Database(db_err) => {
                // Check for common PostgreSQL error codes
                let code = db_err.code().map(|c| c.to_string());
                if code.as_deref() == Some("23505") {
                    // Unique violation
                    RepositoryError::Duplicate(db_err.message().to_string())
                } else {
                    RepositoryError::Query(err)
                }
            }
            SqlxError::PoolTimedOut | SqlxError::PoolClosed => {
                RepositoryError::Unavailable(err.to_string())
            }
            _ => RepositoryError::Query(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err = RepositoryError::from(SqlxError::RowNotFound);
        assert!(matches!(err, RepositoryError::NotFound(_)));
        assert!(!err.is_duplicate());
    }

    #[test]
    fn test_pool_errors_map_to_unavailable() {
        let err = RepositoryError::from(SqlxError::PoolTimedOut);
        assert!(matches!(err, RepositoryError::Unavailable(_)));
    }

    #[test]
    fn test_connection_error_detection() {
        let err = AppError::Database(DatabaseError::PoolCreation(SqlxError::PoolClosed));
        assert!(err.is_connection_error());
        assert!(format!("{}", err).contains("Database error"));

        let err = AppError::Config("missing".to_string());
        assert!(!err.is_connection_error());
    }

    #[test]
    fn test_shutdown_is_not_a_connection_error() {
        let err = AppError::Shutdown("update poller panicked".to_string());
        assert!(!err.is_connection_error());
        assert_eq!(err.to_string(), "Unexpected shutdown: update poller panicked");
    }
}
