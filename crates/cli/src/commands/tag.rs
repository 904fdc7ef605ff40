//! Tag command for attaching a tag to a task
//!
//! Implements the `csort tag` command.

use calsort_db::{Database, DbError, Tag, TagData};
use clap::Args;
use tracing::debug;

/// Attach a tag to a task
#[derive(Debug, Args)]
pub struct TagCommand {
    /// Task id
    pub task: i64,

    /// Tag name
    pub name: String,
}

impl TagCommand {
    /// Execute the tag command.
    ///
    /// Tagging a task twice with the same name is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `DbError::NotFound` if the task does not exist.
    /// Returns `DbError::ValidationError` if the name is empty.
    pub async fn execute(&self, db: &Database) -> Result<String, DbError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(DbError::ValidationError {
                message: "tag name required".to_string(),
            });
        }

        if !db.tasks().exists(self.task).await? {
            return Err(DbError::NotFound { task_id: self.task });
        }

        let tags = db.tags();
        if tags
            .tags_for_task(self.task)
            .await?
            .iter()
            .any(|t| t.name == name)
        {
            debug!("Task {} already tagged with {}", self.task, name);
            return Ok(format!("Task {} already tagged with {}", self.task, name));
        }

        let data = TagData::new(name);
        tags.create_tag_data(&data).await?;
        tags.insert(&Tag::new(self.task, &data)).await?;

        Ok(format!("Tagged task {} with {}", self.task, name))
    }
}
