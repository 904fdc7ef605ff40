//! Place command for positioning a task in a calendar
//!
//! Implements the `csort place` command. The task is inserted (or moved) at the
//! top, the bottom, or next to another task of the same calendar, and its new
//! ordering key is reported.

use calsort_db::{CaldavTask, Database, DbError, Placement};
use clap::{ArgGroup, Args};

/// Put a task into a calendar at a position
#[derive(Debug, Args)]
#[command(group(
    ArgGroup::new("position")
        .required(true)
        .args(["top", "bottom", "above", "below"])
))]
pub struct PlaceCommand {
    /// Task id
    pub task: i64,

    /// Calendar uid
    pub calendar: String,

    /// Place before every other task
    #[arg(long)]
    pub top: bool,

    /// Place after every other task
    #[arg(long)]
    pub bottom: bool,

    /// Place directly above this task
    #[arg(long, value_name = "TASK")]
    pub above: Option<i64>,

    /// Place directly below this task
    #[arg(long, value_name = "TASK")]
    pub below: Option<i64>,
}

impl PlaceCommand {
    fn placement(&self) -> Placement {
        match (self.above, self.below) {
            (Some(reference), _) => Placement::Above(reference),
            (_, Some(reference)) => Placement::Below(reference),
            _ => Placement::from_top(self.top),
        }
    }

    /// Execute the place command.
    ///
    /// An existing entry keeps its remote id.
    ///
    /// # Errors
    ///
    /// Returns `DbError::NotFound` if the task does not exist.
    /// Returns `DbError::NotInList` if the `--above`/`--below` task is not in the calendar.
    pub async fn execute(&self, db: &Database) -> Result<String, DbError> {
        let task = db
            .tasks()
            .get(self.task)
            .await?
            .ok_or(DbError::NotFound { task_id: self.task })?;

        let caldav = db.caldav();
        let entry = match caldav.get(self.task, &self.calendar).await? {
            Some(existing) => existing,
            None => CaldavTask::new(self.task, self.calendar.clone()),
        };

        let key = caldav.insert_at(&task, &entry, self.placement()).await?;

        Ok(format!(
            "Placed task {} in {} (order {})",
            self.task, self.calendar, key
        ))
    }
}
