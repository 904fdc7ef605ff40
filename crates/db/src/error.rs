use std::path::PathBuf;
use thiserror::Error;

/// Database error types for calsort
#[derive(Error, Debug)]
pub enum DbError {
    /// Error establishing connection to the database
    #[error("Failed to connect to database at {path}: {source}")]
    Connection {
        path: PathBuf,
        #[source]
        source: Box<surrealdb::Error>,
    },

    /// Error during schema initialization
    #[error("Failed to initialize database schema: {0}")]
    Schema(#[source] Box<surrealdb::Error>),

    /// Error executing a query
    #[error("Query execution failed")]
    Query(#[source] Box<surrealdb::Error>),

    /// Error with database path (invalid or inaccessible)
    #[error("Invalid database path: {path} - {reason}")]
    InvalidPath { path: PathBuf, reason: String },

    /// Error when a requested task was not found
    #[error("Task '{task_id}' not found")]
    NotFound { task_id: i64 },

    /// Error when a reference task has no entry in the target calendar
    #[error("Task '{task_id}' is not in calendar '{calendar}'")]
    NotInList { task_id: i64, calendar: String },

    /// Error when a record with the same identity already exists
    #[error("{resource} already exists")]
    Conflict { resource: String },

    /// Error creating database directory
    #[error("Failed to create database directory at {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error for invalid input or validation failure
    #[error("{message}")]
    ValidationError { message: String },
}

impl From<surrealdb::Error> for DbError {
    fn from(err: surrealdb::Error) -> Self {
        DbError::Query(Box::new(err))
    }
}

impl DbError {
    /// Get the full error message including nested SurrealDB error details.
    ///
    /// This is useful for displaying detailed error information to users.
    pub fn full_message(&self) -> String {
        match self {
            DbError::Query(err) => format!("Query execution failed: {}", err),
            other => other.to_string(),
        }
    }
}

/// Result type alias for database operations
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_path_error_display() {
        let err = DbError::InvalidPath {
            path: PathBuf::from("/invalid/path"),
            reason: "Directory does not exist".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid database path: /invalid/path - Directory does not exist"
        );
    }

    #[test]
    fn test_create_directory_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = DbError::CreateDirectory {
            path: PathBuf::from("/root/csort"),
            source: io_err,
        };
        assert_eq!(
            err.to_string(),
            "Failed to create database directory at /root/csort: access denied"
        );
    }

    #[test]
    fn test_not_found_error_display() {
        let err = DbError::NotFound { task_id: 42 };
        assert_eq!(err.to_string(), "Task '42' not found");
    }

    #[test]
    fn test_not_in_list_error_display() {
        let err = DbError::NotInList {
            task_id: 7,
            calendar: "calendar".to_string(),
        };
        assert_eq!(err.to_string(), "Task '7' is not in calendar 'calendar'");
    }

    #[test]
    fn test_conflict_error_display() {
        let err = DbError::Conflict {
            resource: "Account 'abc'".to_string(),
        };
        assert_eq!(err.to_string(), "Account 'abc' already exists");
    }

    #[test]
    fn test_validation_error_display() {
        let err = DbError::ValidationError {
            message: "Title cannot be empty".to_string(),
        };
        assert_eq!(err.to_string(), "Title cannot be empty");
    }

    #[test]
    fn test_full_message_passes_through_non_query_errors() {
        let err = DbError::NotFound { task_id: 3 };
        assert_eq!(err.full_message(), "Task '3' not found");
    }

    #[test]
    fn test_not_found_error_debug() {
        let err = DbError::NotFound { task_id: 789 };
        let debug_str = format!("{:?}", err);
        assert!(
            debug_str.contains("NotFound") && debug_str.contains("789"),
            "Debug output should contain NotFound and task_id"
        );
    }
}
