//! Account command for registering a CalDAV account
//!
//! Implements the `csort account` command.

use calsort_db::{CaldavAccount, Database, DbError};
use clap::Args;

/// Create a CalDAV account
#[derive(Debug, Args)]
pub struct AccountCommand {
    /// Display name
    pub name: String,

    /// Server URL
    #[arg(long)]
    pub url: Option<String>,

    /// Explicit uuid (generated when omitted)
    #[arg(long)]
    pub uuid: Option<String>,
}

impl AccountCommand {
    /// Execute the account command and return the account uuid.
    ///
    /// # Errors
    ///
    /// Returns `DbError::Conflict` if an account with the uuid exists.
    pub async fn execute(&self, db: &Database) -> Result<String, DbError> {
        let mut account = CaldavAccount::new(self.name.clone());
        account.url = self.url.clone();
        if let Some(uuid) = &self.uuid {
            account.uuid = uuid.clone();
        }

        db.accounts().insert_account(&account).await?;
        Ok(account.uuid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_test_db() -> Database {
        let db = Database::memory().await.unwrap();
        db.init().await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_account_generates_uuid() {
        let db = setup_test_db().await;
        let cmd = AccountCommand {
            name: "Personal".to_string(),
            url: Some("https://dav.example.com/".to_string()),
            uuid: None,
        };

        let uuid = cmd.execute(&db).await.unwrap();
        let stored = db.accounts().get_account(&uuid).await.unwrap().unwrap();
        assert_eq!(stored.name, "Personal");
        assert_eq!(stored.url.as_deref(), Some("https://dav.example.com/"));
    }

    #[tokio::test]
    async fn test_account_duplicate_uuid_conflicts() {
        let db = setup_test_db().await;
        let cmd = AccountCommand {
            name: "Personal".to_string(),
            url: None,
            uuid: Some("acct".to_string()),
        };

        assert_eq!(cmd.execute(&db).await.unwrap(), "acct");
        assert!(matches!(
            cmd.execute(&db).await,
            Err(DbError::Conflict { .. })
        ));
    }
}
