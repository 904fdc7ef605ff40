//! Data models for calsort
//!
//! Defines Rust types that map to the SurrealDB schema for tasks, calendar
//! entries, tags, accounts and calendars.

use crate::order::OrderKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Current time truncated to the millisecond precision the store keeps.
pub fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

/// Generate a new random uid for tags, accounts and calendars
pub fn new_uid() -> String {
    Uuid::new_v4().to_string()
}

/// A task owned by the task store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Task id, `None` until the task is stored
    pub id: Option<i64>,
    /// Task title
    pub title: String,
    /// Creation instant (millisecond precision)
    pub created: DateTime<Utc>,
    /// Last modification instant (millisecond precision)
    pub modified: DateTime<Utc>,
}

impl Task {
    /// Create a new unsaved task created now
    pub fn new(title: impl Into<String>) -> Self {
        let now = now_millis();
        Self {
            id: None,
            title: title.into(),
            created: now,
            modified: now,
        }
    }

    /// Request a specific id instead of the next free one
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    /// Set the creation instant (also used as the modification instant)
    pub fn with_created(mut self, created: DateTime<Utc>) -> Self {
        self.created = created;
        self.modified = created;
        self
    }
}

/// A task's membership in a calendar, with its ordering key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaldavTask {
    /// Task id
    pub task: i64,
    /// Calendar uid
    pub calendar: String,
    /// Remote object name, set for entries that came from the server
    pub remote_id: Option<String>,
    /// Ordering key, null when unordered
    pub order: OrderKey,
}

impl CaldavTask {
    /// Create an unordered entry for `task` in `calendar`
    pub fn new(task: i64, calendar: impl Into<String>) -> Self {
        Self {
            task,
            calendar: calendar.into(),
            remote_id: None,
            order: OrderKey::UNORDERED,
        }
    }

    /// Attach a remote object name
    pub fn with_remote_id(mut self, remote_id: impl Into<String>) -> Self {
        self.remote_id = Some(remote_id.into());
        self
    }
}

/// Tag metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagData {
    pub uid: String,
    pub name: String,
}

impl TagData {
    /// Create tag metadata with a fresh uid
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            uid: new_uid(),
            name: name.into(),
        }
    }
}

/// Association between a task and a tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub task: i64,
    pub tag_uid: String,
    pub name: String,
}

impl Tag {
    /// Tag `task` with `data`
    pub fn new(task: i64, data: &TagData) -> Self {
        Self {
            task,
            tag_uid: data.uid.clone(),
            name: data.name.clone(),
        }
    }
}

/// A CalDAV account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaldavAccount {
    pub uuid: String,
    pub name: String,
    pub url: Option<String>,
}

impl CaldavAccount {
    /// Create an account with a fresh uuid
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            uuid: new_uid(),
            name: name.into(),
            url: None,
        }
    }
}

/// A calendar (task list) belonging to an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaldavCalendar {
    pub uuid: String,
    pub account: String,
    pub name: String,
    pub url: Option<String>,
}

impl CaldavCalendar {
    /// Create a calendar with a fresh uuid under `account`
    pub fn new(account: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uuid: new_uid(),
            account: account.into(),
            name: name.into(),
            url: None,
        }
    }
}

/// A calendar together with the number of entries filed in it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaldavFilter {
    pub calendar: CaldavCalendar,
    pub count: usize,
}
