//! Task repository
//!
//! The task store owns task records. The ordering layer only needs to create
//! tasks and read their creation instants back.

use super::record_number;
use crate::error::{DbError, DbResult};
use crate::models::Task;
use chrono::DateTime;
use serde::Deserialize;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tokio::sync::Mutex;
use tracing::{debug, trace};

/// Repository for task records
///
/// Encapsulates database queries for tasks, providing a clean API
/// that hides the underlying SurrealDB implementation details.
pub struct TaskRepository<'a> {
    client: &'a Surreal<Db>,
    id_lock: &'a Mutex<()>,
}

/// Minimal row for checking task existence and id allocation
#[derive(Debug, Deserialize)]
struct IdOnly {
    id: surrealdb::sql::Thing,
}

/// Row as stored in the task table
#[derive(Debug, Deserialize)]
struct TaskRow {
    id: surrealdb::sql::Thing,
    #[serde(default)]
    title: String,
    created: i64,
    modified: i64,
}

impl TaskRow {
    fn into_task(self) -> DbResult<Task> {
        let id = record_number(&self.id)?;
        let invalid = |field: &str, millis: i64| DbError::ValidationError {
            message: format!("Task '{}' has an invalid {} timestamp: {}", id, field, millis),
        };
        let created =
            DateTime::from_timestamp_millis(self.created).ok_or_else(|| invalid("created", self.created))?;
        let modified = DateTime::from_timestamp_millis(self.modified)
            .ok_or_else(|| invalid("modified", self.modified))?;

        Ok(Task {
            id: Some(id),
            title: self.title,
            created,
            modified,
        })
    }
}

/// Fetch a task by id.
///
/// Shared with the calendar repository, which reads creation instants while
/// holding a calendar lock.
pub(super) async fn fetch_task(client: &Surreal<Db>, id: i64) -> DbResult<Option<Task>> {
    let mut result = client
        .query("SELECT * FROM type::thing('task', $id)")
        .bind(("id", id))
        .await?;
    let row: Option<TaskRow> = result.take(0)?;
    row.map(TaskRow::into_task).transpose()
}

impl<'a> TaskRepository<'a> {
    /// Create a new TaskRepository with the given database client
    pub fn new(client: &'a Surreal<Db>, id_lock: &'a Mutex<()>) -> Self {
        Self { client, id_lock }
    }

    /// Check if a task with the given ID exists.
    pub async fn exists(&self, id: i64) -> DbResult<bool> {
        let mut result = self
            .client
            .query("SELECT id FROM type::thing('task', $id)")
            .bind(("id", id))
            .await?;
        let rows: Vec<IdOnly> = result.take(0)?;
        Ok(!rows.is_empty())
    }

    /// Store a task and return its id.
    ///
    /// Uses `task.id` when set, otherwise assigns one more than the highest
    /// id in use.
    ///
    /// # Errors
    ///
    /// Returns `DbError::Conflict` if an explicit id is already taken.
    /// Returns `DbError::Query` if the database operation fails.
    pub async fn create_new(&self, task: &Task) -> DbResult<i64> {
        let _guard = self.id_lock.lock().await;

        let id = match task.id {
            Some(id) => {
                if self.exists(id).await? {
                    return Err(DbError::Conflict {
                        resource: format!("Task '{}'", id),
                    });
                }
                id
            }
            None => self.next_id().await?,
        };

        debug!("Creating task: {} with title: {}", id, task.title);
        trace!("Task data: {:?}", task);

        self.client
            .query(
                "CREATE type::thing('task', $id) SET
                    title = $title,
                    created = $created,
                    modified = $modified",
            )
            .bind(("id", id))
            .bind(("title", task.title.clone()))
            .bind(("created", task.created.timestamp_millis()))
            .bind(("modified", task.modified.timestamp_millis()))
            .await?
            .check()?;

        Ok(id)
    }

    /// Get a task by ID.
    ///
    /// # Returns
    ///
    /// `Some(Task)` if found, `None` otherwise.
    pub async fn get(&self, id: i64) -> DbResult<Option<Task>> {
        debug!("Fetching task: {}", id);
        let task = fetch_task(self.client, id).await?;
        if task.is_none() {
            debug!("Task not found: {}", id);
        }
        Ok(task)
    }

    /// Highest id in use plus one, or 1 for an empty table.
    async fn next_id(&self) -> DbResult<i64> {
        let mut result = self
            .client
            .query("SELECT id FROM task ORDER BY id DESC LIMIT 1")
            .await?;
        let rows: Vec<IdOnly> = result.take(0)?;
        match rows.first() {
            Some(row) => Ok(record_number(&row.id)? + 1),
            None => Ok(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::DbError;
    use crate::models::Task;
    use crate::test_utils::create_test_db;
    use chrono::{DateTime, Duration, Utc};

    #[tokio::test]
    async fn test_create_new_assigns_increasing_ids() {
        let db = create_test_db().await;

        let first = db.tasks().create_new(&Task::new("First")).await.unwrap();
        let second = db.tasks().create_new(&Task::new("Second")).await.unwrap();

        assert_eq!(first, 1);
        assert_eq!(second, 2);
    }

    #[tokio::test]
    async fn test_create_new_honors_explicit_id() {
        let db = create_test_db().await;

        let id = db
            .tasks()
            .create_new(&Task::new("Pinned").with_id(10))
            .await
            .unwrap();
        assert_eq!(id, 10);

        let next = db.tasks().create_new(&Task::new("Next")).await.unwrap();
        assert_eq!(next, 11);
    }

    #[tokio::test]
    async fn test_create_new_rejects_taken_id() {
        let db = create_test_db().await;
        db.tasks()
            .create_new(&Task::new("Original").with_id(1))
            .await
            .unwrap();

        let result = db.tasks().create_new(&Task::new("Duplicate").with_id(1)).await;
        assert!(matches!(result, Err(DbError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_get_round_trips_millisecond_timestamps() {
        let db = create_test_db().await;
        let created = DateTime::from_timestamp_millis(1_590_074_956_452).unwrap();
        let task = Task::new("Timestamped").with_created(created);

        let id = db.tasks().create_new(&task).await.unwrap();
        let stored = db.tasks().get(id).await.unwrap().unwrap();

        assert_eq!(stored.id, Some(id));
        assert_eq!(stored.title, "Timestamped");
        assert_eq!(stored.created, created);
        assert_eq!(stored.modified, created);
    }

    #[tokio::test]
    async fn test_get_missing_task() {
        let db = create_test_db().await;
        assert!(db.tasks().get(99).await.unwrap().is_none());
        assert!(!db.tasks().exists(99).await.unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_creates_get_distinct_ids() {
        let db = std::sync::Arc::new(create_test_db().await);
        let base = Utc::now();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let db = std::sync::Arc::clone(&db);
                tokio::spawn(async move {
                    let task = Task::new(format!("Task {}", i))
                        .with_created(base + Duration::milliseconds(i));
                    db.tasks().create_new(&task).await.unwrap()
                })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap());
        }
        ids.sort();
        assert_eq!(ids, (1..=8).collect::<Vec<i64>>());
    }
}
