//! Account repository
//!
//! CalDAV accounts, their calendars, and the per-calendar entry counts shown
//! as filters.

use crate::error::{DbError, DbResult};
use crate::models::{CaldavAccount, CaldavCalendar, CaldavFilter};
use serde::Deserialize;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tracing::{debug, info};

/// Repository for accounts and calendars
pub struct AccountRepository<'a> {
    client: &'a Surreal<Db>,
}

/// Row returned by a `count()` aggregate
#[derive(Debug, Deserialize)]
struct CountRow {
    count: usize,
}

impl<'a> AccountRepository<'a> {
    /// Create a new AccountRepository with the given database client
    pub fn new(client: &'a Surreal<Db>) -> Self {
        Self { client }
    }

    /// Store a new account.
    ///
    /// # Errors
    ///
    /// Returns `DbError::Conflict` if an account with the same uuid exists.
    /// Returns `DbError::Query` if the database operation fails.
    pub async fn insert_account(&self, account: &CaldavAccount) -> DbResult<()> {
        if self.get_account(&account.uuid).await?.is_some() {
            return Err(DbError::Conflict {
                resource: format!("Account '{}'", account.uuid),
            });
        }

        info!("Creating account: {} ({})", account.name, account.uuid);
        self.create_account(account).await
    }

    /// `CREATE` the account row; a row that appeared since the lookup is a conflict.
    async fn create_account(&self, account: &CaldavAccount) -> DbResult<()> {
        let created = self
            .client
            .query(
                "CREATE type::thing('caldav_account', $uuid) SET
                    uuid = $uuid,
                    name = $name,
                    url = $url",
            )
            .bind(("uuid", account.uuid.clone()))
            .bind(("name", account.name.clone()))
            .bind(("url", account.url.clone()))
            .await?
            .check();

        match created {
            Ok(_) => Ok(()),
            Err(surrealdb::Error::Db(surrealdb::error::Db::RecordExists { .. })) => {
                Err(DbError::Conflict {
                    resource: format!("Account '{}'", account.uuid),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Get an account by uuid.
    pub async fn get_account(&self, uuid: &str) -> DbResult<Option<CaldavAccount>> {
        let mut result = self
            .client
            .query("SELECT uuid, name, url FROM type::thing('caldav_account', $uuid)")
            .bind(("uuid", uuid.to_string()))
            .await?;
        let account: Option<CaldavAccount> = result.take(0)?;
        Ok(account)
    }

    /// Insert or update a calendar.
    ///
    /// # Errors
    ///
    /// Returns `DbError::ValidationError` if the owning account does not exist.
    /// Returns `DbError::Query` if the database operation fails.
    pub async fn insert_calendar(&self, calendar: &CaldavCalendar) -> DbResult<()> {
        if self.get_account(&calendar.account).await?.is_none() {
            return Err(DbError::ValidationError {
                message: format!("Account '{}' does not exist", calendar.account),
            });
        }

        debug!(
            "Saving calendar {} ({}) for account {}",
            calendar.name, calendar.uuid, calendar.account
        );
        self.client
            .query(
                "UPSERT type::thing('caldav_calendar', $uuid) SET
                    uuid = $uuid,
                    account = $account,
                    name = $name,
                    url = $url",
            )
            .bind(("uuid", calendar.uuid.clone()))
            .bind(("account", calendar.account.clone()))
            .bind(("name", calendar.name.clone()))
            .bind(("url", calendar.url.clone()))
            .await?
            .check()?;
        Ok(())
    }

    /// Calendars of an account, ordered by name.
    pub async fn calendars(&self, account: &str) -> DbResult<Vec<CaldavCalendar>> {
        let mut result = self
            .client
            .query(
                "SELECT uuid, account, name, url FROM caldav_calendar
                    WHERE account = $account
                    ORDER BY name, uuid",
            )
            .bind(("account", account.to_string()))
            .await?;
        let calendars: Vec<CaldavCalendar> = result.take(0)?;
        Ok(calendars)
    }

    /// Calendars of an account with the number of entries filed in each.
    ///
    /// An unknown account or one without calendars yields an empty vector.
    pub async fn get_caldav_filters(&self, account: &str) -> DbResult<Vec<CaldavFilter>> {
        let calendars = self.calendars(account).await?;
        let mut filters = Vec::with_capacity(calendars.len());

        for calendar in calendars {
            let count = self.count_entries(&calendar.uuid).await?;
            filters.push(CaldavFilter { calendar, count });
        }

        Ok(filters)
    }

    async fn count_entries(&self, calendar: &str) -> DbResult<usize> {
        let mut result = self
            .client
            .query("SELECT count() AS count FROM caldav_task WHERE calendar = $calendar GROUP ALL")
            .bind(("calendar", calendar.to_string()))
            .await?;
        let row: Option<CountRow> = result.take(0)?;
        Ok(row.map(|r| r.count).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use crate::DbError;
    use crate::models::{CaldavAccount, CaldavCalendar, CaldavTask, Task};
    use crate::test_utils::create_test_db;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_create_over_existing_account_is_conflict() {
        let db = create_test_db().await;
        let account = CaldavAccount::new("Personal");
        db.accounts().insert_account(&account).await.unwrap();

        let result = db.accounts().create_account(&account).await;
        assert!(
            matches!(result, Err(DbError::Conflict { .. })),
            "Expected Conflict, got: {:?}",
            result
        );
    }

    #[tokio::test]
    async fn test_concurrent_account_inserts_with_same_uuid() {
        let db = Arc::new(create_test_db().await);
        let account = CaldavAccount::new("Shared");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let db = Arc::clone(&db);
                let account = account.clone();
                tokio::spawn(async move { db.accounts().insert_account(&account).await })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(()) => created += 1,
                Err(DbError::Conflict { .. }) => {}
                Err(other) => panic!("Expected Conflict, got: {:?}", other),
            }
        }
        assert_eq!(created, 1);
    }

    #[tokio::test]
    async fn test_insert_and_get_account() {
        let db = create_test_db().await;
        let mut account = CaldavAccount::new("Personal");
        account.url = Some("https://dav.example.com/".to_string());

        db.accounts().insert_account(&account).await.unwrap();

        let stored = db.accounts().get_account(&account.uuid).await.unwrap();
        assert_eq!(stored, Some(account));
    }

    #[tokio::test]
    async fn test_insert_duplicate_account_conflicts() {
        let db = create_test_db().await;
        let account = CaldavAccount::new("Personal");
        db.accounts().insert_account(&account).await.unwrap();

        let result = db.accounts().insert_account(&account).await;
        assert!(matches!(result, Err(DbError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_insert_calendar_requires_account() {
        let db = create_test_db().await;
        let calendar = CaldavCalendar::new("missing", "Inbox");

        let result = db.accounts().insert_calendar(&calendar).await;
        assert!(matches!(result, Err(DbError::ValidationError { .. })));
    }

    #[tokio::test]
    async fn test_insert_calendar_updates_existing() {
        let db = create_test_db().await;
        let account = CaldavAccount::new("Personal");
        db.accounts().insert_account(&account).await.unwrap();

        let mut calendar = CaldavCalendar::new(account.uuid.clone(), "Inbox");
        db.accounts().insert_calendar(&calendar).await.unwrap();
        calendar.name = "Renamed".to_string();
        db.accounts().insert_calendar(&calendar).await.unwrap();

        let calendars = db.accounts().calendars(&account.uuid).await.unwrap();
        assert_eq!(calendars, vec![calendar]);
    }

    #[tokio::test]
    async fn test_get_caldav_filters_empty_account() {
        let db = create_test_db().await;
        let account = CaldavAccount::new("Empty");
        db.accounts().insert_account(&account).await.unwrap();

        assert!(db
            .accounts()
            .get_caldav_filters(&account.uuid)
            .await
            .unwrap()
            .is_empty());
        assert!(db
            .accounts()
            .get_caldav_filters("unknown")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_get_caldav_filters_counts_entries() {
        let db = create_test_db().await;
        let account = CaldavAccount::new("Personal");
        db.accounts().insert_account(&account).await.unwrap();
        let work = CaldavCalendar::new(account.uuid.clone(), "Work");
        let home = CaldavCalendar::new(account.uuid.clone(), "Home");
        db.accounts().insert_calendar(&work).await.unwrap();
        db.accounts().insert_calendar(&home).await.unwrap();

        for title in ["One", "Two"] {
            let id = db.tasks().create_new(&Task::new(title)).await.unwrap();
            db.caldav()
                .insert(&CaldavTask::new(id, work.uuid.clone()))
                .await
                .unwrap();
        }

        let filters = db.accounts().get_caldav_filters(&account.uuid).await.unwrap();
        let summary: Vec<(&str, usize)> = filters
            .iter()
            .map(|f| (f.calendar.name.as_str(), f.count))
            .collect();
        assert_eq!(summary, vec![("Home", 0), ("Work", 2)]);
    }
}
