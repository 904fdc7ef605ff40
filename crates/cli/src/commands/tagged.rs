//! Tagged command for the tag-filtered listing
//!
//! Implements the `csort tagged` command: tasks filed in at least one calendar
//! that also carry at least one tag, by ascending id.

use crate::output::{format_tagged_table, to_json};
use calsort_db::{Database, DbError};
use clap::Args;
use serde::Serialize;

/// List tasks that are in a calendar and carry at least one tag
#[derive(Debug, Args)]
pub struct TaggedCommand {
    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// A task in the tag-filtered listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaggedTask {
    pub id: i64,
    pub title: String,
    pub tags: Vec<String>,
}

impl TaggedCommand {
    /// Collect the tagged tasks.
    pub async fn rows(&self, db: &Database) -> Result<Vec<TaggedTask>, DbError> {
        let ids = db.caldav().get_tasks_with_tags().await?;
        let (tasks, tag_repo) = (db.tasks(), db.tags());

        let mut rows = Vec::with_capacity(ids.len());
        for id in ids {
            let title = tasks.get(id).await?.map(|t| t.title).unwrap_or_default();
            let tags = tag_repo
                .tags_for_task(id)
                .await?
                .into_iter()
                .map(|t| t.name)
                .collect();
            rows.push(TaggedTask { id, title, tags });
        }
        Ok(rows)
    }

    /// Execute the tagged command.
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the database query fails.
    pub async fn execute(&self, db: &Database) -> Result<String, DbError> {
        let rows = self.rows(db).await?;
        if self.json {
            to_json(&rows)
        } else {
            Ok(format_tagged_table(&rows))
        }
    }
}
