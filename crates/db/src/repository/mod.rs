//! Repository modules for database operations
//!
//! Provides repository pattern implementations for tasks, tags, calendar
//! entries and accounts, encapsulating database queries.

mod account;
mod caldav;
mod tag;
mod task;

pub use account::AccountRepository;
pub use caldav::{CaldavRepository, Placement};
pub use tag::TagRepository;
pub use task::TaskRepository;

use crate::error::{DbError, DbResult};
use surrealdb::sql::{Id, Thing};

/// Extract the numeric key of a record id such as `task:42`.
fn record_number(thing: &Thing) -> DbResult<i64> {
    match &thing.id {
        Id::Number(n) => Ok(*n),
        _ => Err(DbError::ValidationError {
            message: format!("Record '{}' does not have a numeric id", thing),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_number_reads_numeric_ids() {
        let thing = Thing::from(("task", Id::Number(42)));
        assert_eq!(record_number(&thing).unwrap(), 42);
    }

    #[test]
    fn test_record_number_rejects_string_ids() {
        let thing = Thing::from(("task", Id::String("abc".to_string())));
        assert!(matches!(
            record_number(&thing),
            Err(DbError::ValidationError { .. })
        ));
    }
}
