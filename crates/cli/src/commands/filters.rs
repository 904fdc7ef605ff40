//! Filters command for an account's calendars with entry counts
//!
//! Implements the `csort filters` command.

use crate::output::{format_filter_table, to_json};
use calsort_db::{Database, DbError};
use clap::Args;

/// Show an account's calendars with entry counts
#[derive(Debug, Args)]
pub struct FiltersCommand {
    /// Account uuid
    pub account: String,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

impl FiltersCommand {
    /// Execute the filters command.
    ///
    /// An unknown account prints an empty listing.
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the database query fails.
    pub async fn execute(&self, db: &Database) -> Result<String, DbError> {
        let filters = db.accounts().get_caldav_filters(&self.account).await?;
        if self.json {
            to_json(&filters)
        } else {
            Ok(format_filter_table(&filters))
        }
    }
}
