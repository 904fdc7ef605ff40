//! Database schema initialization for calsort
//!
//! Defines the SurrealDB schema for tasks, calendar entries, tags, accounts
//! and calendars.

use crate::error::DbError;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

/// SQL statements for schema initialization
mod sql {
    /// Define the task table. Timestamps are Unix milliseconds.
    pub const DEFINE_TASK_TABLE: &str = r#"
        DEFINE TABLE IF NOT EXISTS task SCHEMAFULL;

        DEFINE FIELD IF NOT EXISTS title ON task TYPE string DEFAULT "";

        DEFINE FIELD IF NOT EXISTS created ON task TYPE int;

        DEFINE FIELD IF NOT EXISTS modified ON task TYPE int;
    "#;

    /// Define the caldav_task table.
    ///
    /// Records are keyed `caldav_task:[task_id, calendar]`, one per task and calendar.
    /// `sort_order` holds the ordering key verbatim, NONE when unordered.
    pub const DEFINE_CALDAV_TASK_TABLE: &str = r#"
        DEFINE TABLE IF NOT EXISTS caldav_task SCHEMAFULL;

        DEFINE FIELD IF NOT EXISTS task ON caldav_task TYPE record<task>;

        DEFINE FIELD IF NOT EXISTS calendar ON caldav_task TYPE string;

        DEFINE FIELD IF NOT EXISTS remote_id ON caldav_task TYPE option<string>;

        DEFINE FIELD IF NOT EXISTS sort_order ON caldav_task TYPE option<int>;

        DEFINE INDEX IF NOT EXISTS caldav_task_calendar ON caldav_task FIELDS calendar;

        DEFINE INDEX IF NOT EXISTS caldav_task_task ON caldav_task FIELDS task;
    "#;

    /// Define the tag_data and tag tables
    pub const DEFINE_TAG_TABLES: &str = r#"
        DEFINE TABLE IF NOT EXISTS tag_data SCHEMAFULL;

        DEFINE FIELD IF NOT EXISTS uid ON tag_data TYPE string;

        DEFINE FIELD IF NOT EXISTS name ON tag_data TYPE string;

        DEFINE TABLE IF NOT EXISTS tag SCHEMAFULL;

        DEFINE FIELD IF NOT EXISTS task ON tag TYPE record<task>;

        DEFINE FIELD IF NOT EXISTS tag_uid ON tag TYPE string;

        DEFINE FIELD IF NOT EXISTS name ON tag TYPE string;

        DEFINE INDEX IF NOT EXISTS tag_task ON tag FIELDS task;
    "#;

    /// Define the caldav_account and caldav_calendar tables
    pub const DEFINE_ACCOUNT_TABLES: &str = r#"
        DEFINE TABLE IF NOT EXISTS caldav_account SCHEMAFULL;

        DEFINE FIELD IF NOT EXISTS uuid ON caldav_account TYPE string;

        DEFINE FIELD IF NOT EXISTS name ON caldav_account TYPE string DEFAULT "";

        DEFINE FIELD IF NOT EXISTS url ON caldav_account TYPE option<string>;

        DEFINE TABLE IF NOT EXISTS caldav_calendar SCHEMAFULL;

        DEFINE FIELD IF NOT EXISTS uuid ON caldav_calendar TYPE string;

        DEFINE FIELD IF NOT EXISTS account ON caldav_calendar TYPE string;

        DEFINE FIELD IF NOT EXISTS name ON caldav_calendar TYPE string DEFAULT "";

        DEFINE FIELD IF NOT EXISTS url ON caldav_calendar TYPE option<string>;

        DEFINE INDEX IF NOT EXISTS caldav_calendar_account ON caldav_calendar FIELDS account;
    "#;
}

/// Initialize the database schema.
///
/// This function is idempotent - it can be called multiple times safely
/// as it uses `IF NOT EXISTS` clauses.
///
/// # Errors
///
/// Returns `DbError::Schema` if any schema definition fails.
pub async fn init_schema(client: &Surreal<Db>) -> Result<(), DbError> {
    for statement in [
        sql::DEFINE_TASK_TABLE,
        sql::DEFINE_CALDAV_TASK_TABLE,
        sql::DEFINE_TAG_TABLES,
        sql::DEFINE_ACCOUNT_TABLES,
    ] {
        client
            .query(statement)
            .await
            .map_err(|e| DbError::Schema(Box::new(e)))?
            .check()
            .map_err(|e| DbError::Schema(Box::new(e)))?;
    }

    Ok(())
}
