//! # Database Handle
//!
//! Opens the SQLite pool that backs [`SqliteDocumentStore`].
//!
//! ## Startup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  BillingConfig::db_config()          DbConfig::in_memory()             │
//! │       │  DbLocation::File(path)            │  DbLocation::Memory        │
//! │       └──────────────┬─────────────────────┘                            │
//! │                      ▼                                                  │
//! │  Database::new(config)                                                 │
//! │   ├── connect options (WAL for files, NORMAL sync, busy timeout)       │
//! │   ├── SqlitePool (max_connections, acquire timeout)                    │
//! │   └── embedded migrations (unless disabled)                            │
//! │                      │                                                  │
//! │                      ▼                                                  │
//! │  db.documents() ──► SqliteDocumentStore ──► DocumentService            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A file database runs in WAL mode so dashboard reads never wait on a
//! document being saved. An in-memory database lives inside a single
//! connection, so its pool is pinned to one connection that never idles out.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations::{self, MigrationStatus};
use crate::repository::sqlite::SqliteDocumentStore;

// =============================================================================
// Configuration
// =============================================================================

/// Where the documents live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbLocation {
    /// A SQLite file, created on first use.
    File(PathBuf),
    /// A private in-memory database, gone when the pool closes.
    Memory,
}

/// Pool settings.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/srv/billbook/billbook.db")
///     .max_connections(8)
///     .busy_timeout(Duration::from_secs(2));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DbConfig {
    pub location: DbLocation,

    /// Default: 5 (always 1 in memory)
    pub max_connections: u32,

    /// How long a caller waits for a free pooled connection.
    /// Default: 30 seconds
    pub acquire_timeout: Duration,

    /// How long SQLite waits on a locked database before reporting busy.
    /// Default: 5 seconds
    pub busy_timeout: Duration,

    /// Default: true
    pub run_migrations: bool,
}

impl DbConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            location: DbLocation::File(path.into()),
            max_connections: 5,
            acquire_timeout: Duration::from_secs(30),
            busy_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }

    /// A throwaway database for tests and tooling.
    pub fn in_memory() -> Self {
        DbConfig {
            location: DbLocation::Memory,
            max_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            busy_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }

    /// Ignored for in-memory databases.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    pub fn is_in_memory(&self) -> bool {
        self.location == DbLocation::Memory
    }

    /// The database file, if this is not an in-memory database.
    pub fn path(&self) -> Option<&Path> {
        match &self.location {
            DbLocation::File(path) => Some(path),
            DbLocation::Memory => None,
        }
    }

    fn connect_options(&self) -> SqliteConnectOptions {
        let options = match &self.location {
            DbLocation::File(path) => SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal),
            DbLocation::Memory => SqliteConnectOptions::new().in_memory(true),
        };
        options
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(self.busy_timeout)
    }

    fn pool_options(&self) -> SqlitePoolOptions {
        let options = SqlitePoolOptions::new().acquire_timeout(self.acquire_timeout);
        match self.location {
            DbLocation::File(_) => options.max_connections(self.max_connections),
            // closing the last connection would drop the database
            DbLocation::Memory => options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None),
        }
    }
}

// =============================================================================
// Database
// =============================================================================

/// Owns the pool. Clones share it.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the pool and, unless disabled, applies pending migrations.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        match config.path() {
            Some(path) => info!(path = %path.display(), "Opening document database"),
            None => info!("Opening in-memory document database"),
        }

        let pool = config
            .pool_options()
            .connect_with(config.connect_options())
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        debug!(
            max_connections = config.max_connections,
            in_memory = config.is_in_memory(),
            "Pool ready"
        );

        let db = Database { pool };
        if config.run_migrations {
            migrations::run_migrations(&db.pool).await?;
        }
        Ok(db)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// The document store backed by this pool.
    pub fn documents(&self) -> SqliteDocumentStore {
        SqliteDocumentStore::new(self.pool.clone())
    }

    pub async fn migration_status(&self) -> DbResult<MigrationStatus> {
        migrations::migration_status(&self.pool).await
    }

    /// After this every store operation fails with `ConnectionFailed`.
    pub async fn close(&self) {
        info!("Closing document database");
        self.pool.close().await;
    }

    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database_is_migrated() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.health_check().await);

        let status = db.migration_status().await.unwrap();
        assert!(status.is_current());
        assert!(status.applied > 0);
    }

    #[tokio::test]
    async fn test_migrations_can_be_skipped() {
        let db = Database::new(DbConfig::in_memory().run_migrations(false))
            .await
            .unwrap();
        let status = db.migration_status().await.unwrap();
        assert_eq!(status.applied, 0);
        assert!(!status.is_current());
    }

    #[tokio::test]
    async fn test_closed_pool_fails_health_check() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.close().await;
        assert!(!db.health_check().await);
    }

    #[test]
    fn test_config_builder() {
        let config = DbConfig::new("/tmp/billbook.db")
            .max_connections(10)
            .busy_timeout(Duration::from_millis(250))
            .run_migrations(false);

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.busy_timeout, Duration::from_millis(250));
        assert!(!config.run_migrations);
        assert_eq!(config.path(), Some(Path::new("/tmp/billbook.db")));
        assert!(!config.is_in_memory());

        let memory = DbConfig::in_memory();
        assert!(memory.is_in_memory());
        assert_eq!(memory.path(), None);
    }
}
