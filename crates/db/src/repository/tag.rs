//! Tag repository
//!
//! Tag metadata and task-tag associations. Only creation and the reads used by
//! the tag-filtered listing are provided.

use super::record_number;
use crate::error::DbResult;
use crate::models::{Tag, TagData};
use serde::Deserialize;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tracing::debug;

/// Repository for tags and tag metadata
pub struct TagRepository<'a> {
    client: &'a Surreal<Db>,
}

/// Row as stored in the tag table
#[derive(Debug, Deserialize)]
struct TagRow {
    task: surrealdb::sql::Thing,
    tag_uid: String,
    name: String,
}

impl<'a> TagRepository<'a> {
    /// Create a new TagRepository with the given database client
    pub fn new(client: &'a Surreal<Db>) -> Self {
        Self { client }
    }

    /// Store tag metadata under its uid.
    pub async fn create_tag_data(&self, data: &TagData) -> DbResult<()> {
        debug!("Creating tag data: {} ({})", data.name, data.uid);
        self.client
            .query("CREATE type::thing('tag_data', $uid) SET uid = $uid, name = $name")
            .bind(("uid", data.uid.clone()))
            .bind(("name", data.name.clone()))
            .await?
            .check()?;
        Ok(())
    }

    /// Get tag metadata by uid.
    pub async fn get_tag_data(&self, uid: &str) -> DbResult<Option<TagData>> {
        let mut result = self
            .client
            .query("SELECT uid, name FROM type::thing('tag_data', $uid)")
            .bind(("uid", uid.to_string()))
            .await?;
        let data: Option<TagData> = result.take(0)?;
        Ok(data)
    }

    /// Attach a tag to a task.
    pub async fn insert(&self, tag: &Tag) -> DbResult<()> {
        debug!("Tagging task {} with {}", tag.task, tag.name);
        self.client
            .query(
                "CREATE tag SET
                    task = type::thing('task', $task),
                    tag_uid = $tag_uid,
                    name = $name",
            )
            .bind(("task", tag.task))
            .bind(("tag_uid", tag.tag_uid.clone()))
            .bind(("name", tag.name.clone()))
            .await?
            .check()?;
        Ok(())
    }

    /// All tags attached to a task, ordered by name.
    pub async fn tags_for_task(&self, task: i64) -> DbResult<Vec<Tag>> {
        let mut result = self
            .client
            .query(
                "SELECT task, tag_uid, name FROM tag
                    WHERE task = type::thing('task', $task)
                    ORDER BY name",
            )
            .bind(("task", task))
            .await?;
        let rows: Vec<TagRow> = result.take(0)?;

        rows.into_iter()
            .map(|row| {
                Ok(Tag {
                    task: record_number(&row.task)?,
                    tag_uid: row.tag_uid,
                    name: row.name,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::models::{Tag, TagData, Task};
    use crate::test_utils::create_test_db;

    #[tokio::test]
    async fn test_create_and_get_tag_data() {
        let db = create_test_db().await;
        let data = TagData::new("errands");

        db.tags().create_tag_data(&data).await.unwrap();

        let stored = db.tags().get_tag_data(&data.uid).await.unwrap();
        assert_eq!(stored, Some(data));
    }

    #[tokio::test]
    async fn test_get_missing_tag_data() {
        let db = create_test_db().await;
        assert!(db.tags().get_tag_data("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_tags_for_task() {
        let db = create_test_db().await;
        let id = db.tasks().create_new(&Task::new("Tagged")).await.unwrap();
        let work = TagData::new("work");
        let home = TagData::new("home");
        db.tags().create_tag_data(&work).await.unwrap();
        db.tags().create_tag_data(&home).await.unwrap();

        db.tags().insert(&Tag::new(id, &work)).await.unwrap();
        db.tags().insert(&Tag::new(id, &home)).await.unwrap();

        let tags = db.tags().tags_for_task(id).await.unwrap();
        let names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["home", "work"]);
        assert!(tags.iter().all(|t| t.task == id));
    }

    #[tokio::test]
    async fn test_tags_for_untagged_task() {
        let db = create_test_db().await;
        let id = db.tasks().create_new(&Task::new("Plain")).await.unwrap();
        assert!(db.tags().tags_for_task(id).await.unwrap().is_empty());
    }
}
