//! Test infrastructure for integration tests
//!
//! Provides isolated database setup/teardown and CLI command execution helpers.
//! Each test gets its own database instance to ensure no shared state.

use calsort_cli::commands::{
    AccountCommand, AddCommand, CalendarCommand, ListCommand, PlaceCommand, SyncCommand,
    TagCommand,
};
use calsort_db::{Database, OrderKey};
use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// Test context containing an isolated database and temp directory
pub struct TestContext {
    pub db: Database,
    pub temp_dir: PathBuf,
}

impl TestContext {
    /// Create a new test context with an isolated database.
    ///
    /// Each call creates a uniquely named temp directory using process ID,
    /// thread ID, and nanosecond timestamp to guarantee isolation.
    pub async fn new() -> Self {
        let temp_dir = std::env::temp_dir().join(format!(
            "csort-integration-test-{}-{:?}-{}",
            std::process::id(),
            std::thread::current().id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));

        let db = Database::connect(&temp_dir).await.unwrap();
        db.init().await.unwrap();

        Self { db, temp_dir }
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.temp_dir);
    }
}

// =============================================================================
// Command Builder Helpers
// =============================================================================

/// The instant used as "A" in the ordering scenarios: 2020-05-21 15:29:16.452 UTC
pub fn reference_instant() -> DateTime<Utc> {
    DateTime::from_timestamp_millis(1_590_074_956_452).unwrap()
}

/// Create a task created at `created` and return its id.
pub async fn add_task_at(db: &Database, title: &str, created: DateTime<Utc>) -> i64 {
    AddCommand {
        title: title.to_string(),
        created: Some(created),
        id: None,
    }
    .execute(db)
    .await
    .unwrap()
}

/// Create a place command with no position flag set.
pub fn place_cmd(task: i64, calendar: &str) -> PlaceCommand {
    PlaceCommand {
        task,
        calendar: calendar.to_string(),
        top: false,
        bottom: false,
        above: None,
        below: None,
    }
}

/// Place `task` at the top of `calendar`.
pub fn place_top(task: i64, calendar: &str) -> PlaceCommand {
    PlaceCommand {
        top: true,
        ..place_cmd(task, calendar)
    }
}

/// Place `task` at the bottom of `calendar`.
pub fn place_bottom(task: i64, calendar: &str) -> PlaceCommand {
    PlaceCommand {
        bottom: true,
        ..place_cmd(task, calendar)
    }
}

/// Create a sync command without a remote id.
pub fn sync_cmd(task: i64, calendar: &str) -> SyncCommand {
    SyncCommand {
        task,
        calendar: calendar.to_string(),
        remote_id: None,
    }
}

/// Create a tag command.
pub fn tag_cmd(task: i64, name: &str) -> TagCommand {
    TagCommand {
        task,
        name: name.to_string(),
    }
}

/// Create an account with a fixed uuid.
pub async fn create_account(db: &Database, uuid: &str) {
    AccountCommand {
        name: format!("Account {}", uuid),
        url: None,
        uuid: Some(uuid.to_string()),
    }
    .execute(db)
    .await
    .unwrap();
}

/// Create a calendar with a fixed uuid under `account`.
pub async fn create_calendar(db: &Database, account: &str, uuid: &str, name: &str) {
    CalendarCommand {
        account: account.to_string(),
        name: name.to_string(),
        url: None,
        uuid: Some(uuid.to_string()),
    }
    .execute(db)
    .await
    .unwrap();
}

/// Task ids of `calendar` in display order.
pub async fn list_ids(db: &Database, calendar: &str) -> Vec<i64> {
    ListCommand {
        calendar: calendar.to_string(),
        json: false,
    }
    .rows(db)
    .await
    .unwrap()
    .into_iter()
    .map(|row| row.task)
    .collect()
}

/// Stored ordering key of `task` in `calendar`.
pub async fn stored_key(db: &Database, task: i64, calendar: &str) -> OrderKey {
    db.caldav()
        .get(task, calendar)
        .await
        .unwrap()
        .expect("entry should exist")
        .order
}
