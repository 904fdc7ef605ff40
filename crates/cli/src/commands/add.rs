//! Add command for creating new tasks
//!
//! Implements the `csort add` command. Tasks get the next free numeric id
//! unless one is requested explicitly.

use calsort_db::{Database, DbError, Task};
use chrono::{DateTime, Utc};
use clap::Args;

/// Create a new task
#[derive(Debug, Args)]
pub struct AddCommand {
    /// Title of the task
    #[arg(required = true)]
    pub title: String,

    /// Creation instant as RFC 3339, e.g. 2020-05-21T15:29:16.452Z (defaults to now)
    #[arg(long, value_parser = parse_created)]
    pub created: Option<DateTime<Utc>>,

    /// Explicit task id
    #[arg(long)]
    pub id: Option<i64>,
}

/// Parse an RFC 3339 timestamp, keeping millisecond precision
pub(crate) fn parse_created(s: &str) -> Result<DateTime<Utc>, String> {
    let parsed = DateTime::parse_from_rfc3339(s)
        .map_err(|e| format!("invalid timestamp '{}': {}", s, e))?;
    DateTime::from_timestamp_millis(parsed.timestamp_millis())
        .ok_or_else(|| format!("timestamp '{}' is out of range", s))
}

impl AddCommand {
    /// Execute the add command.
    ///
    /// Returns the id of the new task.
    ///
    /// # Errors
    ///
    /// Returns `DbError` if:
    /// - The title is empty
    /// - The requested id is taken
    /// - Database operations fail
    pub async fn execute(&self, db: &Database) -> Result<i64, DbError> {
        if self.title.trim().is_empty() {
            return Err(DbError::ValidationError {
                message: "title required".to_string(),
            });
        }

        let mut task = Task::new(self.title.clone());
        if let Some(created) = self.created {
            task = task.with_created(created);
        }
        if let Some(id) = self.id {
            task = task.with_id(id);
        }

        db.tasks().create_new(&task).await
    }
}
