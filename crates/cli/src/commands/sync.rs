//! Sync command for filing a task without a position
//!
//! Implements the `csort sync` command, which records a calendar entry the way
//! a server download does: the entry is stored unordered, so it sorts by the
//! task's creation instant.

use calsort_db::{CaldavTask, Database, DbError};
use clap::Args;

/// File a task into a calendar without a position
#[derive(Debug, Args)]
pub struct SyncCommand {
    /// Task id
    pub task: i64,

    /// Calendar uid
    pub calendar: String,

    /// Remote object name on the server
    #[arg(long)]
    pub remote_id: Option<String>,
}

impl SyncCommand {
    /// Execute the sync command.
    ///
    /// # Errors
    ///
    /// Returns `DbError::NotFound` if the task does not exist.
    pub async fn execute(&self, db: &Database) -> Result<String, DbError> {
        let mut entry = CaldavTask::new(self.task, self.calendar.clone());
        if let Some(remote_id) = &self.remote_id {
            entry = entry.with_remote_id(remote_id.clone());
        }

        db.caldav().insert(&entry).await?;

        Ok(format!("Synced task {} into {}", self.task, self.calendar))
    }
}
