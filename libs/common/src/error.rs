//! Storage errors shared by the attendance service

use sqlx::Error as SqlxError;
use sqlx::migrate::MigrateError;
use thiserror::Error;

/// Failure while talking to the attendance database
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// The pool could not reach the server
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    #[error("Database migration error: {0}")]
    Migration(#[from] MigrateError),

    /// Invalid `DATABASE_*` settings
    #[error("Database configuration error: {0}")]
    Configuration(String),

    /// A stored row does not map back onto a model, e.g. an unknown role
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_failure() {
        let err = DatabaseError::Configuration("min exceeds max".to_string());
        assert_eq!(
            err.to_string(),
            "Database configuration error: min exceeds max"
        );

        let err = DatabaseError::Corrupt("Unknown role: admin".to_string());
        assert_eq!(err.to_string(), "Corrupt record: Unknown role: admin");
    }
}
