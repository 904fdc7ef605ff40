//! Calendar entry repository
//!
//! Stores one entry per task and calendar together with its ordering key, and
//! decides where newly inserted entries land. Positioning inserts run under the
//! calendar's lock: the neighbor is read, the key computed and the row written
//! before another insert into the same calendar may look at it.

use super::record_number;
use super::task::fetch_task;
use crate::error::{DbError, DbResult};
use crate::locks::ListLocks;
use crate::models::{CaldavTask, Task};
use crate::order::{Neighbor, OrderKey, compute_key};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeSet;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tracing::{debug, trace};

/// Where a new entry goes in its calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Before every other entry
    Top,
    /// After every other entry
    Bottom,
    /// Directly before the entry of this task; later entries move down if
    /// there is no free key in between
    Above(i64),
    /// Directly after the entry of this task; later entries move down if
    /// there is no free key in between
    Below(i64),
}

impl Placement {
    /// `Top` when `top` is set, `Bottom` otherwise
    pub fn from_top(top: bool) -> Self {
        if top { Placement::Top } else { Placement::Bottom }
    }
}

/// Repository for calendar entries
pub struct CaldavRepository<'a> {
    client: &'a Surreal<Db>,
    locks: &'a ListLocks,
}

/// Row as stored in the caldav_task table
#[derive(Debug, Deserialize)]
struct EntryRow {
    task: surrealdb::sql::Thing,
    calendar: String,
    #[serde(default)]
    remote_id: Option<String>,
    #[serde(default)]
    sort_order: Option<i64>,
    /// Creation time of the linked task, only selected for listings
    #[serde(default)]
    created: Option<i64>,
}

impl EntryRow {
    fn into_listed(self) -> DbResult<ListedEntry> {
        let created = self.created.and_then(DateTime::from_timestamp_millis);
        Ok(ListedEntry {
            entry: CaldavTask {
                task: record_number(&self.task)?,
                calendar: self.calendar,
                remote_id: self.remote_id,
                order: OrderKey::from(self.sort_order),
            },
            created,
        })
    }
}

/// An entry together with its task's creation instant
#[derive(Debug)]
struct ListedEntry {
    entry: CaldavTask,
    created: Option<DateTime<Utc>>,
}

impl ListedEntry {
    /// Effective position; entries whose task record is gone sort last.
    fn position(&self) -> i64 {
        match self.created {
            Some(created) => self.entry.order.position(created),
            None => self.entry.order.value().unwrap_or(i64::MAX),
        }
    }

    fn sort_key(&self) -> (i64, i64) {
        (self.position(), self.entry.task)
    }
}

const ENTRY_FIELDS: &str = "task, calendar, remote_id, sort_order";

impl<'a> CaldavRepository<'a> {
    /// Create a new CaldavRepository with the given database client and locks
    pub fn new(client: &'a Surreal<Db>, locks: &'a ListLocks) -> Self {
        Self { client, locks }
    }

    /// Insert or re-insert `entry` for `task` at `placement` and return the stored key.
    ///
    /// `Above` and `Below` may rewrite the keys of later entries to make room.
    ///
    /// # Errors
    ///
    /// Returns `DbError::ValidationError` if `task` is unsaved or does not match `entry`.
    /// Returns `DbError::NotFound` if the task is not in the task store.
    /// Returns `DbError::NotInList` if an `Above`/`Below` reference has no entry
    /// in the calendar.
    /// Returns `DbError::Query` if the database operation fails.
    pub async fn insert_at(
        &self,
        task: &Task,
        entry: &CaldavTask,
        placement: Placement,
    ) -> DbResult<OrderKey> {
        let task_id = task.id.ok_or_else(|| DbError::ValidationError {
            message: "Task must be created before it can be placed".to_string(),
        })?;
        if task_id != entry.task {
            return Err(DbError::ValidationError {
                message: format!(
                    "Entry belongs to task '{}', not task '{}'",
                    entry.task, task_id
                ),
            });
        }

        let _guard = self.locks.acquire(&entry.calendar).await;

        let stored = fetch_task(self.client, task_id)
            .await?
            .ok_or(DbError::NotFound { task_id })?;

        let mut siblings = self.load_listed(&entry.calendar).await?;
        siblings.retain(|listed| listed.entry.task != task_id);
        siblings.sort_by_key(ListedEntry::sort_key);

        let slot = slot_for(&siblings, placement, &entry.calendar)?;
        if matches!(placement, Placement::Above(_) | Placement::Below(_)) {
            self.open_gap(&mut siblings, slot).await?;
        }
        let neighbor = neighbor_at(&siblings, placement, slot);
        let key = compute_key(stored.created, neighbor);
        trace!("Neighbor for task {}: {:?}", task_id, neighbor);

        self.write(entry, key).await?;
        debug!(
            "Placed task {} in {} at {:?}: order {}",
            task_id, entry.calendar, placement, key
        );

        Ok(key)
    }

    /// Insert or re-insert `entry` without a position.
    ///
    /// The stored key is always null, whatever `entry.order` holds.
    ///
    /// # Errors
    ///
    /// Returns `DbError::NotFound` if the task is not in the task store.
    /// Returns `DbError::Query` if the database operation fails.
    pub async fn insert(&self, entry: &CaldavTask) -> DbResult<()> {
        let _guard = self.locks.acquire(&entry.calendar).await;

        if fetch_task(self.client, entry.task).await?.is_none() {
            return Err(DbError::NotFound {
                task_id: entry.task,
            });
        }

        self.write(entry, OrderKey::UNORDERED).await?;
        debug!("Filed task {} in {} unordered", entry.task, entry.calendar);
        Ok(())
    }

    /// Get the entry of `task` in `calendar`.
    pub async fn get(&self, task: i64, calendar: &str) -> DbResult<Option<CaldavTask>> {
        let query = format!(
            "SELECT {} FROM type::thing('caldav_task', [$task, $calendar])",
            ENTRY_FIELDS
        );
        let mut result = self
            .client
            .query(&query)
            .bind(("task", task))
            .bind(("calendar", calendar.to_string()))
            .await?;
        let row: Option<EntryRow> = result.take(0)?;
        Ok(row.map(EntryRow::into_listed).transpose()?.map(|l| l.entry))
    }

    /// Get the first entry of `task`, by calendar id.
    pub async fn get_task(&self, task: i64) -> DbResult<Option<CaldavTask>> {
        let query = format!(
            "SELECT {} FROM caldav_task WHERE task = type::thing('task', $task) ORDER BY calendar LIMIT 1",
            ENTRY_FIELDS
        );
        let mut result = self.client.query(&query).bind(("task", task)).await?;
        let rows: Vec<EntryRow> = result.take(0)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.into_listed()?.entry)),
            None => Ok(None),
        }
    }

    /// Entry with the smallest non-null key.
    ///
    /// When every key is null, the entry whose task was created first.
    /// This looks at stored keys only, so it can differ from the first entry of
    /// [`list`](Self::list), which orders null keys by creation instant.
    pub async fn top_of(&self, calendar: &str) -> DbResult<Option<CaldavTask>> {
        let listed = self.load_listed(calendar).await?;
        let top = listed
            .iter()
            .filter(|l| !l.entry.order.is_unordered())
            .min_by_key(|l| (l.entry.order, l.entry.task))
            .or_else(|| listed.iter().min_by_key(|l| l.sort_key()));
        Ok(top.map(|l| l.entry.clone()))
    }

    /// Entry with the greatest key, null keys counting as greatest.
    ///
    /// Among null keys, the entry whose task was created last.
    pub async fn bottom_of(&self, calendar: &str) -> DbResult<Option<CaldavTask>> {
        let listed = self.load_listed(calendar).await?;
        let bottom = listed
            .into_iter()
            .max_by_key(|l| (l.entry.order, l.position(), l.entry.task));
        Ok(bottom.map(|l| l.entry))
    }

    /// All entries of `calendar` in display order.
    pub async fn list(&self, calendar: &str) -> DbResult<Vec<CaldavTask>> {
        let mut listed = self.load_listed(calendar).await?;
        listed.sort_by_key(ListedEntry::sort_key);
        Ok(listed.into_iter().map(|l| l.entry).collect())
    }

    /// Ids of tasks that have a calendar entry and at least one tag.
    ///
    /// Each id appears once, in ascending order.
    pub async fn get_tasks_with_tags(&self) -> DbResult<Vec<i64>> {
        let mut result = self
            .client
            .query(
                "LET $tagged = (SELECT VALUE task FROM tag);
                SELECT VALUE task FROM caldav_task WHERE task INSIDE $tagged;",
            )
            .await?;
        let tasks: Vec<surrealdb::sql::Thing> = result.take(1)?;

        let ids = tasks
            .iter()
            .map(record_number)
            .collect::<DbResult<BTreeSet<i64>>>()?;
        Ok(ids.into_iter().collect())
    }

    /// Upsert the row for `entry` with `key`.
    async fn write(&self, entry: &CaldavTask, key: OrderKey) -> DbResult<()> {
        self.client
            .query(
                "UPSERT type::thing('caldav_task', [$task, $calendar]) SET
                    task = type::thing('task', $task),
                    calendar = $calendar,
                    remote_id = $remote_id,
                    sort_order = $sort_order",
            )
            .bind(("task", entry.task))
            .bind(("calendar", entry.calendar.clone()))
            .bind(("remote_id", entry.remote_id.clone()))
            .bind(("sort_order", key.value()))
            .await?
            .check()?;
        Ok(())
    }

    /// Make room for one key between `siblings[slot - 1]` and `siblings[slot]`.
    ///
    /// When the two positions are less than two apart, every entry from `slot`
    /// on moves down by the same amount so their relative order is kept.
    /// Must run under the calendar's lock.
    async fn open_gap(&self, siblings: &mut [ListedEntry], slot: usize) -> DbResult<()> {
        if slot == 0 || slot >= siblings.len() {
            return Ok(());
        }
        let before = siblings[slot - 1].position();
        let after = siblings[slot].position();
        let shift = before.saturating_add(2).saturating_sub(after);
        if shift <= 0 {
            return Ok(());
        }

        for listed in &mut siblings[slot..] {
            let moved = OrderKey::new(listed.position().saturating_add(shift));
            self.write(&listed.entry, moved).await?;
            trace!(
                "Moved task {} in {}: order {} -> {}",
                listed.entry.task, listed.entry.calendar, listed.entry.order, moved
            );
            listed.entry.order = moved;
        }
        debug!(
            "Shifted {} entries of {} by {}",
            siblings.len() - slot,
            siblings[slot].entry.calendar,
            shift
        );
        Ok(())
    }

    /// Entries of `calendar` with their tasks' creation instants, unsorted.
    async fn load_listed(&self, calendar: &str) -> DbResult<Vec<ListedEntry>> {
        let query = format!(
            "SELECT {}, task.created AS created FROM caldav_task WHERE calendar = $calendar",
            ENTRY_FIELDS
        );
        let mut result = self
            .client
            .query(&query)
            .bind(("calendar", calendar.to_string()))
            .await?;
        let rows: Vec<EntryRow> = result.take(0)?;
        rows.into_iter().map(EntryRow::into_listed).collect()
    }
}

/// Index in `siblings`, sorted by position, at which `placement` puts the new entry.
fn slot_for(siblings: &[ListedEntry], placement: Placement, calendar: &str) -> DbResult<usize> {
    let find = |task_id: i64| {
        siblings
            .iter()
            .position(|l| l.entry.task == task_id)
            .ok_or_else(|| DbError::NotInList {
                task_id,
                calendar: calendar.to_string(),
            })
    };

    match placement {
        Placement::Top => Ok(0),
        Placement::Bottom => Ok(siblings.len()),
        Placement::Above(reference) => find(reference),
        Placement::Below(reference) => find(reference).map(|index| index + 1),
    }
}

/// Neighbor of the new entry at `slot` once any gap has been opened.
fn neighbor_at(siblings: &[ListedEntry], placement: Placement, slot: usize) -> Neighbor {
    match placement {
        Placement::Top | Placement::Above(_) => match siblings.get(slot) {
            Some(next) => Neighbor::Above(next.position()),
            None => Neighbor::None,
        },
        Placement::Bottom | Placement::Below(_) => match slot.checked_sub(1) {
            Some(index) => Neighbor::Below {
                reference: siblings[index].position(),
                last: slot == siblings.len(),
            },
            None => Neighbor::None,
        },
    }
}
