//! Database module for calsort
//!
//! Provides SurrealDB connection management with an embedded SurrealKV
//! backend, schema initialization, the ordering-key rules for calendar task
//! lists, and repositories for tasks, tags, calendar entries and accounts.

pub mod error;
pub mod locks;
pub mod models;
pub mod order;
pub mod repository;
pub mod schema;

pub use error::{DbError, DbResult};
pub use locks::ListLocks;
pub use models::{CaldavAccount, CaldavCalendar, CaldavFilter, CaldavTask, Tag, TagData, Task};
pub use order::{Neighbor, OrderKey, compute_key, from_apple_epoch, to_apple_epoch};
pub use repository::{AccountRepository, CaldavRepository, Placement, TagRepository, TaskRepository};

use std::path::{Path, PathBuf};
use std::process::Command;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, SurrealKv};
use tokio::sync::Mutex;
use tracing::debug;

/// Default database path relative to project root or home directory
pub const DEFAULT_DB_PATH: &str = ".csort/data";

/// SurrealDB namespace used by calsort
const NAMESPACE: &str = "calsort";

/// SurrealDB database name used by calsort
const DATABASE: &str = "main";

/// Database wrapper providing connection management for SurrealDB
pub struct Database {
    /// The underlying SurrealDB client
    client: Surreal<Db>,
    /// Path where the database is stored, `None` for in-memory databases
    path: Option<PathBuf>,
    /// Per-calendar locks for positioning inserts
    locks: ListLocks,
    /// Serializes task id allocation
    id_lock: Mutex<()>,
}

impl Database {
    /// Connect to a SurrealDB database at the specified path.
    ///
    /// Creates the database directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `DbError::CreateDirectory` if directory creation fails.
    /// Returns `DbError::Connection` if database connection fails.
    pub async fn connect(path: &Path) -> DbResult<Self> {
        let path = Self::prepare_path(path)?;
        debug!("Opening database at {}", path.display());

        let client =
            Surreal::new::<SurrealKv>(path.clone())
                .await
                .map_err(|e| DbError::Connection {
                    path: path.clone(),
                    source: Box::new(e),
                })?;

        Ok(Self::with_client(client, Some(path)))
    }

    /// Open a fresh in-memory database.
    ///
    /// Nothing is persisted; used by tests and dry runs.
    pub async fn memory() -> DbResult<Self> {
        let client = Surreal::new::<Mem>(())
            .await
            .map_err(|e| DbError::Connection {
                path: PathBuf::from(":memory:"),
                source: Box::new(e),
            })?;

        Ok(Self::with_client(client, None))
    }

    fn with_client(client: Surreal<Db>, path: Option<PathBuf>) -> Self {
        Self {
            client,
            path,
            locks: ListLocks::new(),
            id_lock: Mutex::new(()),
        }
    }

    /// Initialize the database schema.
    ///
    /// Selects the calsort namespace and database, then defines all tables.
    ///
    /// # Errors
    ///
    /// Returns `DbError::Schema` if schema initialization fails.
    pub async fn init(&self) -> DbResult<()> {
        self.client
            .use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| DbError::Schema(Box::new(e)))?;

        schema::init_schema(&self.client).await?;

        Ok(())
    }

    /// Get a reference to the underlying SurrealDB client.
    pub fn client(&self) -> &Surreal<Db> {
        &self.client
    }

    /// Get the path where the database is stored, if it is on disk.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Task store
    pub fn tasks(&self) -> TaskRepository<'_> {
        TaskRepository::new(&self.client, &self.id_lock)
    }

    /// Tag store
    pub fn tags(&self) -> TagRepository<'_> {
        TagRepository::new(&self.client)
    }

    /// Calendar entries and their ordering
    pub fn caldav(&self) -> CaldavRepository<'_> {
        CaldavRepository::new(&self.client, &self.locks)
    }

    /// Accounts, calendars and filters
    pub fn accounts(&self) -> AccountRepository<'_> {
        AccountRepository::new(&self.client)
    }

    /// Get the default database path based on project root.
    ///
    /// Uses `git rev-parse --show-toplevel` to find the project root and
    /// returns `<project_root>/.csort/data`. Outside a git repository it falls
    /// back to the home directory, then to the current working directory.
    pub fn default_path() -> PathBuf {
        let base_path = find_project_root()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        base_path.join(DEFAULT_DB_PATH)
    }

    /// Prepare the database path by validating and creating directories.
    fn prepare_path(path: &Path) -> DbResult<PathBuf> {
        let path = path.to_path_buf();

        if path.is_file() {
            return Err(DbError::InvalidPath {
                path,
                reason: "path is a file, expected a directory".to_string(),
            });
        }

        if !path.exists() {
            std::fs::create_dir_all(&path).map_err(|e| DbError::CreateDirectory {
                path: path.clone(),
                source: e,
            })?;
        }

        Ok(path)
    }
}

// Ensure Database is Send + Sync for async compatibility
static_assertions::assert_impl_all!(Database: Send, Sync);

/// Find the project root by running `git rev-parse --show-toplevel`.
///
/// Returns `None` if not in a git repository or the command fails.
pub fn find_project_root() -> Option<PathBuf> {
    let output = Command::new("git")
        .args(["rev-parse", "--show-toplevel"])
        .output()
        .ok()?;

    if output.status.success() {
        let path_str = String::from_utf8(output.stdout).ok()?;
        Some(PathBuf::from(path_str.trim()))
    } else {
        None
    }
}
