//! Error types for liteorm

use crate::value::ValueConversionError;
use thiserror::Error;

/// Result type alias for liteorm operations
pub type OrmResult<T> = Result<T, OrmError>;

/// Error types for database operations
#[derive(Debug, Error)]
pub enum OrmError {
    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Statement rejected by the engine
    #[cfg(feature = "sqlite")]
    #[error("Query error: {0}")]
    Query(#[from] rusqlite::Error),

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unique constraint violation
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// Foreign key constraint violation
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Check constraint violation
    #[error("Check constraint violation: {0}")]
    CheckViolation(String),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// The destination handed to the decoder is neither a record, a mapping,
    /// nor a sequence of those.
    #[error("unsupported destination: {0}")]
    UnsupportedDestination(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Writing a generated key back onto an inserted record failed
    #[error("Key assignment failed for row {row}, column '{column}': {message}")]
    KeyAssignment {
        row: usize,
        column: String,
        message: String,
    },

    /// A clause task panicked or was cancelled
    #[error("Clause task failed: {0}")]
    Task(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl OrmError {
    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an unsupported destination error naming the offending type
    pub fn unsupported_destination(type_name: impl Into<String>) -> Self {
        Self::UnsupportedDestination(type_name.into())
    }

    /// Check if this is a unique violation error
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation(_))
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this is an unsupported destination error
    pub fn is_unsupported_destination(&self) -> bool {
        matches!(self, Self::UnsupportedDestination(_))
    }

    /// Parse a rusqlite error into a more specific OrmError
    #[cfg(feature = "sqlite")]
    pub fn from_sqlite(err: rusqlite::Error) -> Self {
        use rusqlite::ffi;

        if let rusqlite::Error::SqliteFailure(failure, message) = &err {
            let message = message.clone().unwrap_or_else(|| failure.to_string());
            match failure.extended_code {
                ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                    return Self::UniqueViolation(message);
                }
                ffi::SQLITE_CONSTRAINT_FOREIGNKEY => return Self::ForeignKeyViolation(message),
                ffi::SQLITE_CONSTRAINT_CHECK => return Self::CheckViolation(message),
                _ => {}
            }
        }
        Self::Query(err)
    }
}

impl From<ValueConversionError> for OrmError {
    fn from(err: ValueConversionError) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<tokio::task::JoinError> for OrmError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Task(err.to_string())
    }
}
