//! Error handling utilities for the daybook engine.
//!
//! This module provides the central error type `AppError` which represents all
//! possible error conditions that might occur in the engine, as well as the
//! convenience type alias `AppResult` for functions that can return these errors.
//!
//! A lookup that finds nothing is not an error: storage and service functions
//! return `Option::None` for a missing entry, credential or tag.

use chrono::NaiveDate;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Represents errors that can occur when attempting to lock the journal store.
///
/// The store is owned by exactly one process at a time. A lock file next to
/// the database enforces this.
///
/// # Examples
///
/// ```
/// use daybook::errors::LockError;
/// use std::path::PathBuf;
///
/// let error = LockError::FileBusy {
///     path: PathBuf::from("/path/to/daybook.db.lock"),
/// };
///
/// assert!(format!("{}", error).contains("already open"));
/// ```
#[derive(Debug, Error)]
pub enum LockError {
    /// The store is already locked by another process.
    #[error("Journal store is already open in another process: {path}. Close the other daybook instance and try again.")]
    FileBusy {
        /// The path to the lock file
        path: PathBuf,
    },

    /// Acquiring the lock failed for a technical reason.
    #[error("Failed to acquire lock for journal store {path}: {source}. Please check file permissions and ensure the directory is accessible.")]
    AcquisitionFailed {
        /// The path to the lock file
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

/// Represents specific error cases that can occur during database operations.
///
/// # Examples
///
/// ```
/// use daybook::errors::DatabaseError;
/// use chrono::NaiveDate;
///
/// let error = DatabaseError::ConstraintViolation {
///     date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
/// };
/// assert!(format!("{}", error).contains("2024-01-15"));
/// ```
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// An entry already exists for this calendar date.
    #[error("An entry already exists for {date}. Only one entry per day is allowed.")]
    ConstraintViolation {
        /// The date that is already taken
        date: NaiveDate,
    },

    /// The store could not be opened or initialized.
    #[error("Journal store at {path} is unavailable: {message}")]
    Unavailable {
        /// Path of the database file
        path: PathBuf,
        /// What failed
        message: String,
    },

    /// An update targeted a row that no longer exists.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// SQLite database error.
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool error.
    #[error("Failed to get connection from pool: {0}")]
    Pool(#[from] r2d2::Error),

    /// A blocking database task panicked or was cancelled.
    #[error("Database task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// A stored value could not be decoded.
    #[error("Corrupt record in column '{column}': {message}")]
    Corrupt {
        /// Column holding the bad value
        column: &'static str,
        /// Description of the decoding failure
        message: String,
    },
}

/// Errors raised by the credential service.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// The PIN does not have the configured shape.
    #[error("PIN must be exactly {expected_length} digits")]
    InvalidPin {
        /// Number of digits the configuration requires
        expected_length: usize,
    },
}

/// Represents all possible errors that can occur in the daybook engine.
///
/// # Examples
///
/// Creating a configuration error:
/// ```
/// use daybook::errors::AppError;
///
/// let error = AppError::Config("Data directory path is empty".to_string());
/// assert_eq!(format!("{}", error), "Configuration error: Data directory path is empty");
/// ```
///
/// Converting from an IO error:
/// ```
/// use daybook::errors::AppError;
/// use std::io::{self, ErrorKind};
///
/// let io_error = io::Error::new(ErrorKind::NotFound, "file not found");
/// let app_error: AppError = io_error.into();
///
/// match app_error {
///     AppError::Io(inner) => assert_eq!(inner.kind(), ErrorKind::NotFound),
///     _ => panic!("Expected Io variant"),
/// }
/// ```
#[derive(Debug, Error)]
pub enum AppError {
    /// Error related to configuration (loading, validation).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error related to I/O operations (creating directories and similar).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error raised by the store.
    #[error("{0}")]
    Database(#[from] DatabaseError),

    /// Error acquiring the process lock on the store.
    #[error("{0}")]
    Lock(#[from] LockError),

    /// Error raised by the credential service.
    #[error("{0}")]
    Credential(#[from] CredentialError),

    /// Input rejected before it reached the store.
    #[error("Invalid input: {0}")]
    Validation(String),
}

impl AppError {
    /// Returns `true` when the error is a duplicate-date rejection, so callers
    /// can tell the user "you already journaled on that day" instead of
    /// showing a generic failure.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            AppError::Database(DatabaseError::ConstraintViolation { .. })
        )
    }

    /// Returns `true` when the store itself could not be opened.
    pub fn is_storage_unavailable(&self) -> bool {
        matches!(
            self,
            AppError::Database(DatabaseError::Unavailable { .. }) | AppError::Lock(_)
        )
    }
}

/// A type alias for `Result<T, AppError>` to simplify function signatures.
///
/// # Examples
///
/// ```
/// use daybook::errors::{AppResult, AppError};
///
/// fn might_fail(day: u32) -> AppResult<u32> {
///     if day == 0 {
///         return Err(AppError::Validation("day must be positive".to_string()));
///     }
///     Ok(day)
/// }
///
/// assert!(might_fail(0).is_err());
/// ```
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;

    #[test]
    fn test_app_error_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let app_error: AppError = io_error.into();

        match app_error {
            AppError::Io(inner) => {
                assert_eq!(inner.kind(), io::ErrorKind::NotFound);
            }
            _ => panic!("Expected AppError::Io variant"),
        }
    }

    #[test]
    fn test_constraint_violation_is_distinct() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let error: AppError = DatabaseError::ConstraintViolation { date }.into();
        assert!(error.is_constraint_violation());
        assert!(!error.is_storage_unavailable());

        let generic: AppError = DatabaseError::Sqlite(rusqlite::Error::InvalidQuery).into();
        assert!(!generic.is_constraint_violation());
    }

    #[test]
    fn test_unavailable_and_lock_errors_are_storage_unavailable() {
        let unavailable: AppError = DatabaseError::Unavailable {
            path: PathBuf::from("/nowhere/daybook.db"),
            message: "permission denied".to_string(),
        }
        .into();
        assert!(unavailable.is_storage_unavailable());

        let busy: AppError = LockError::FileBusy {
            path: PathBuf::from("/tmp/daybook.db.lock"),
        }
        .into();
        assert!(busy.is_storage_unavailable());
    }

    #[test]
    fn test_error_display() {
        let error = AppError::Validation("month must be between 1 and 12".to_string());
        assert_eq!(
            format!("{}", error),
            "Invalid input: month must be between 1 and 12"
        );

        let error: AppError = CredentialError::InvalidPin { expected_length: 4 }.into();
        assert_eq!(format!("{}", error), "PIN must be exactly 4 digits");
    }

    #[test]
    fn test_lock_error_source_chaining() {
        let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "permission denied");
        let lock_error = LockError::AcquisitionFailed {
            path: PathBuf::from("/tmp/daybook.db.lock"),
            source: io_error,
        };

        let source = lock_error.source().expect("should have a source");
        assert_eq!(source.to_string(), "permission denied");
        assert!(lock_error.to_string().contains("Failed to acquire lock"));
    }
}
