//! CLI commands for calsort
//!
//! This module contains all subcommand implementations for the csort CLI.

pub mod account;
pub mod add;
pub mod calendar;
pub mod filters;
pub mod list;
pub mod place;
pub mod show;
pub mod sync;
pub mod tag;
pub mod tagged;

pub use account::AccountCommand;
pub use add::AddCommand;
pub use calendar::CalendarCommand;
pub use filters::FiltersCommand;
pub use list::ListCommand;
pub use place::PlaceCommand;
pub use show::ShowCommand;
pub use sync::SyncCommand;
pub use tag::TagCommand;
pub use tagged::TaggedCommand;

use calsort_db::{Database, DbError};
use clap::Subcommand;

/// Available CLI commands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a new task
    Add(AddCommand),
    /// Put a task into a calendar at a position
    Place(PlaceCommand),
    /// File a task into a calendar without a position, as a server sync does
    Sync(SyncCommand),
    /// Show a task and its calendar entry
    Show(ShowCommand),
    /// List a calendar in display order
    List(ListCommand),
    /// Attach a tag to a task
    Tag(TagCommand),
    /// List tasks that are in a calendar and carry at least one tag
    Tagged(TaggedCommand),
    /// Create a CalDAV account
    Account(AccountCommand),
    /// Create or update a calendar under an account
    Calendar(CalendarCommand),
    /// Show an account's calendars with entry counts
    Filters(FiltersCommand),
}

impl Command {
    /// Execute the command with the given database connection.
    ///
    /// Returns the text to print on success.
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the command execution fails.
    pub async fn execute(&self, db: &Database) -> Result<String, DbError> {
        match self {
            Command::Add(cmd) => cmd.execute(db).await.map(|id| format!("Created task: {}", id)),
            Command::Place(cmd) => cmd.execute(db).await,
            Command::Sync(cmd) => cmd.execute(db).await,
            Command::Show(cmd) => cmd.execute(db).await,
            Command::List(cmd) => cmd.execute(db).await,
            Command::Tag(cmd) => cmd.execute(db).await,
            Command::Tagged(cmd) => cmd.execute(db).await,
            Command::Account(cmd) => cmd
                .execute(db)
                .await
                .map(|uuid| format!("Created account: {}", uuid)),
            Command::Calendar(cmd) => cmd
                .execute(db)
                .await
                .map(|uuid| format!("Saved calendar: {}", uuid)),
            Command::Filters(cmd) => cmd.execute(db).await,
        }
    }
}
