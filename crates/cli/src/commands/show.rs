//! Show command for displaying a task with its calendar entry
//!
//! Implements the `csort show` command. Without `--calendar` the task's first
//! entry (by calendar uid) is shown.

use crate::output::{format_task_detail, to_json};
use calsort_db::{Database, DbError, OrderKey, from_apple_epoch};
use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;

/// Show a task and its calendar entry
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Task id
    pub task: i64,

    /// Calendar uid (defaults to the task's first calendar)
    #[arg(long)]
    pub calendar: Option<String>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Detailed view of a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskDetail {
    pub id: i64,
    pub title: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    /// Tag names, sorted
    pub tags: Vec<String>,
    pub entry: Option<EntryDetail>,
}

/// A task's entry in one calendar
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryDetail {
    pub calendar: String,
    pub remote_id: Option<String>,
    /// Stored key, null when unordered
    pub order: OrderKey,
    /// Key the entry sorts by
    pub position: i64,
    /// `position` as an instant, when representable
    pub position_at: Option<DateTime<Utc>>,
}

impl ShowCommand {
    /// Load the task detail.
    ///
    /// # Errors
    ///
    /// Returns `DbError::NotFound` if the task does not exist.
    pub async fn detail(&self, db: &Database) -> Result<TaskDetail, DbError> {
        let task = db
            .tasks()
            .get(self.task)
            .await?
            .ok_or(DbError::NotFound { task_id: self.task })?;

        let tags = db
            .tags()
            .tags_for_task(self.task)
            .await?
            .into_iter()
            .map(|t| t.name)
            .collect();

        let caldav = db.caldav();
        let entry = match &self.calendar {
            Some(calendar) => caldav.get(self.task, calendar).await?,
            None => caldav.get_task(self.task).await?,
        };

        let entry = entry.map(|e| {
            let position = e.order.position(task.created);
            EntryDetail {
                position,
                position_at: from_apple_epoch(position),
                calendar: e.calendar,
                remote_id: e.remote_id,
                order: e.order,
            }
        });

        Ok(TaskDetail {
            id: self.task,
            title: task.title,
            created: task.created,
            modified: task.modified,
            tags,
            entry,
        })
    }

    /// Execute the show command.
    ///
    /// # Errors
    ///
    /// Returns `DbError::NotFound` if the task does not exist.
    pub async fn execute(&self, db: &Database) -> Result<String, DbError> {
        let detail = self.detail(db).await?;
        if self.json {
            to_json(&detail)
        } else {
            Ok(format_task_detail(&detail))
        }
    }
}
