use rusqlite::ErrorCode;
use thiserror::Error;

use crate::database::DatabaseError;

/// Error type for repository operations
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// A uniqueness constraint rejected the write
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A foreign key points at a missing row, or a deleted row is still referenced
    #[error("Foreign key violation: {0}")]
    ForeignKey(String),

    /// Not found error
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// SQLite error
    #[error("SQLite error: {0}")]
    Sqlite(rusqlite::Error),

    /// Connection pool error
    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(error: rusqlite::Error) -> Self {
        match &error {
            rusqlite::Error::SqliteFailure(failure, message)
                if failure.code == ErrorCode::ConstraintViolation =>
            {
                let detail = message.clone().unwrap_or_else(|| error.to_string());
                match failure.extended_code {
                    rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE => RepositoryError::Conflict(detail),
                    rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY => RepositoryError::ForeignKey(detail),
                    _ => RepositoryError::Validation(detail),
                }
            }
            _ => RepositoryError::Sqlite(error),
        }
    }
}
