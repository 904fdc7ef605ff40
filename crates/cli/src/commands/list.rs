//! List command for showing a calendar in display order
//!
//! Implements the `csort list` command.

use crate::output::{format_entry_table, to_json};
use calsort_db::{Database, DbError, OrderKey};
use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;

/// List a calendar in display order
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Calendar uid
    pub calendar: String,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// One row of a calendar listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListedTask {
    /// 1-based display position
    pub position: usize,
    /// Task id
    pub task: i64,
    /// Task title, empty when the task record is gone
    pub title: String,
    /// Stored ordering key
    pub order: OrderKey,
    /// Task creation instant
    pub created: Option<DateTime<Utc>>,
    /// Remote object name
    pub remote_id: Option<String>,
}

impl ListCommand {
    /// Collect the listing rows for the calendar.
    pub async fn rows(&self, db: &Database) -> Result<Vec<ListedTask>, DbError> {
        let entries = db.caldav().list(&self.calendar).await?;
        let tasks = db.tasks();

        let mut rows = Vec::with_capacity(entries.len());
        for (index, entry) in entries.into_iter().enumerate() {
            let task = tasks.get(entry.task).await?;
            rows.push(ListedTask {
                position: index + 1,
                task: entry.task,
                title: task.as_ref().map(|t| t.title.clone()).unwrap_or_default(),
                order: entry.order,
                created: task.map(|t| t.created),
                remote_id: entry.remote_id,
            });
        }
        Ok(rows)
    }

    /// Execute the list command.
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the database query fails.
    pub async fn execute(&self, db: &Database) -> Result<String, DbError> {
        let rows = self.rows(db).await?;
        if self.json {
            to_json(&rows)
        } else {
            Ok(format_entry_table(&rows))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calsort_db::{CaldavTask, Placement, Task};
    use chrono::Duration;

    async fn setup_test_db() -> Database {
        let db = Database::memory().await.unwrap();
        db.init().await.unwrap();
        db
    }

    async fn add_task(db: &Database, title: &str, created: DateTime<Utc>) -> Task {
        let task = Task::new(title).with_created(created);
        let id = db.tasks().create_new(&task).await.unwrap();
        task.with_id(id)
    }

    fn list_cmd(calendar: &str, json: bool) -> ListCommand {
        ListCommand {
            calendar: calendar.to_string(),
            json,
        }
    }

    #[tokio::test]
    async fn test_list_empty_calendar() {
        let db = setup_test_db().await;
        let output = list_cmd("work", false).execute(&db).await.unwrap();
        assert_eq!(output, "No tasks found.");
    }

    #[tokio::test]
    async fn test_list_rows_follow_positions() {
        let db = setup_test_db().await;
        let base = DateTime::from_timestamp_millis(1_590_074_956_452).unwrap();
        let older = add_task(&db, "Older", base).await;
        let newer = add_task(&db, "Newer", base + Duration::hours(1)).await;
        let pinned = add_task(&db, "Pinned", base + Duration::hours(2)).await;

        let caldav = db.caldav();
        for task in [&newer, &older] {
            caldav
                .insert(&CaldavTask::new(task.id.unwrap(), "work"))
                .await
                .unwrap();
        }
        caldav
            .insert_at(&pinned, &CaldavTask::new(pinned.id.unwrap(), "work"), Placement::Top)
            .await
            .unwrap();

        let rows = list_cmd("work", false).rows(&db).await.unwrap();
        let titles: Vec<&str> = rows.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Pinned", "Older", "Newer"]);
        let positions: Vec<usize> = rows.iter().map(|r| r.position).collect();
        assert_eq!(positions, vec![1, 2, 3]);
        assert_eq!(rows[1].created, Some(base));
    }

    #[tokio::test]
    async fn test_list_json() {
        let db = setup_test_db().await;
        let task = add_task(&db, "Only", Utc::now()).await;
        db.caldav()
            .insert(&CaldavTask::new(task.id.unwrap(), "work"))
            .await
            .unwrap();

        let output = list_cmd("work", true).execute(&db).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed[0]["title"], "Only");
        assert_eq!(parsed[0]["order"], serde_json::Value::Null);
        assert_eq!(parsed[0]["position"], 1);
    }
}
