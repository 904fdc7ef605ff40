//! Calendar command for creating or updating a calendar
//!
//! Implements the `csort calendar` command. Passing an existing `--uuid`
//! updates that calendar.

use calsort_db::{CaldavCalendar, Database, DbError};
use clap::Args;

/// Create or update a calendar under an account
#[derive(Debug, Args)]
pub struct CalendarCommand {
    /// Owning account uuid
    pub account: String,

    /// Display name
    pub name: String,

    /// Calendar URL on the server
    #[arg(long)]
    pub url: Option<String>,

    /// Explicit uuid (generated when omitted)
    #[arg(long)]
    pub uuid: Option<String>,
}

impl CalendarCommand {
    /// Execute the calendar command and return the calendar uuid.
    ///
    /// # Errors
    ///
    /// Returns `DbError::ValidationError` if the account does not exist.
    pub async fn execute(&self, db: &Database) -> Result<String, DbError> {
        let mut calendar = CaldavCalendar::new(self.account.clone(), self.name.clone());
        calendar.url = self.url.clone();
        if let Some(uuid) = &self.uuid {
            calendar.uuid = uuid.clone();
        }

        db.accounts().insert_calendar(&calendar).await?;
        Ok(calendar.uuid)
    }
}
