//! Storage layer for journal entries, moods, tags and the PIN credential.
//!
//! This module owns the SQLite store. The [`Database`] handle is the only
//! component that issues reads or writes against it; services receive it as
//! `Arc<Database>` and call the async operations defined in the submodules.
//!
//! # Module Structure
//!
//! - `schema`: Table definitions and schema initialization
//! - `entries`: Journal entry CRUD and date-range queries
//! - `moods`: Mood catalog and seed data
//! - `tags`: Tag taxonomy and entry/tag associations
//! - `credentials`: The single PIN credential row
//!
//! # Example
//!
//! ```no_run
//! use daybook::db::Database;
//! use std::path::Path;
//!
//! # async fn run() -> daybook::AppResult<()> {
//! let db = Database::open(Path::new("/tmp/daybook/daybook.db"))?;
//! db.initialize().await?;
//! let moods = db.list_moods().await?;
//! assert_eq!(moods.len(), 5);
//! # Ok(())
//! # }
//! ```

pub mod credentials;
pub mod entries;
pub mod moods;
pub mod schema;
pub mod tags;

use crate::constants::{BUSY_TIMEOUT_MS, LOCK_FILE_EXTENSION, POOL_MAX_SIZE};
use crate::errors::{AppError, AppResult, DatabaseError, LockError};
use fs2::FileExt;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// Type alias for a pooled SQLite connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Handle to the journal store.
///
/// Opening the handle takes an exclusive process lock and verifies the file
/// can be opened. Schema creation and mood seeding run lazily on the first
/// operation, exactly once per handle, even when several tasks race to
/// trigger them.
pub struct Database {
    pool: Pool<SqliteConnectionManager>,
    path: PathBuf,
    schema_ready: OnceCell<()>,
    _lock: StoreLock,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("schema_ready", &self.schema_ready.initialized())
            .finish()
    }
}

impl Database {
    /// Opens or creates the store at `db_path`.
    ///
    /// Missing parent directories are created.
    ///
    /// # Errors
    ///
    /// Returns `LockError::FileBusy` if another process holds the store, and
    /// `DatabaseError::Unavailable` if the file cannot be created or opened.
    pub fn open(db_path: &Path) -> AppResult<Self> {
        debug!("Opening journal store at: {:?}", db_path);

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| unavailable(db_path, e))?;
            }
        }

        let lock = StoreLock::acquire(&lock_path_for(db_path))?;

        let manager = SqliteConnectionManager::file(db_path);
        let pool = Pool::builder()
            .max_size(POOL_MAX_SIZE)
            .connection_customizer(Box::new(SqliteConfig))
            .build(manager)
            .map_err(|e| unavailable(db_path, e))?;

        // Fail fast if the file is not a usable SQLite database
        {
            let conn = pool.get().map_err(|e| unavailable(db_path, e))?;
            conn.query_row("SELECT COUNT(*) FROM sqlite_master", [], |row| {
                row.get::<_, i64>(0)
            })
            .map_err(|e| unavailable(db_path, e))?;
        }

        info!("Journal store opened");
        Ok(Database {
            pool,
            path: db_path.to_path_buf(),
            schema_ready: OnceCell::new(),
            _lock: lock,
        })
    }

    /// Path of the underlying database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets a connection from the pool.
    ///
    /// Blocks until the single shared connection is free. Prefer the async
    /// operations; this exists for synchronous callers and tests.
    ///
    /// # Errors
    ///
    /// Returns an error if no connection becomes available.
    pub fn get_conn(&self) -> AppResult<PooledConnection> {
        self.pool
            .get()
            .map_err(|e| DatabaseError::Pool(e).into())
    }

    /// Creates the schema and seeds the mood catalog.
    ///
    /// Idempotent: only the first successful call does any work, and
    /// concurrent callers wait for that call instead of repeating it. A
    /// failed initialization is retried by the next caller.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Unavailable` if the schema cannot be created.
    pub async fn initialize(&self) -> AppResult<()> {
        self.schema_ready
            .get_or_try_init(|| async {
                let pool = self.pool.clone();
                let result = tokio::task::spawn_blocking(move || -> AppResult<()> {
                    let conn = pool.get().map_err(DatabaseError::Pool)?;
                    schema::create_tables(&conn)?;
                    moods::seed_moods(&conn)?;
                    Ok(())
                })
                .await
                .map_err(DatabaseError::Task)
                .map_err(AppError::from)
                .and_then(|inner| inner);

                match result {
                    Ok(()) => {
                        info!("Journal store schema initialized");
                        Ok(())
                    }
                    Err(e) => {
                        warn!("Journal store initialization failed: {}", e);
                        Err(unavailable(&self.path, e))
                    }
                }
            })
            .await?;
        Ok(())
    }

    /// Runs `f` against the shared connection on the blocking thread pool,
    /// initializing the schema first if needed.
    pub(crate) async fn with_conn<F, T>(&self, f: F) -> AppResult<T>
    where
        F: FnOnce(&mut Connection) -> AppResult<T> + Send + 'static,
        T: Send + 'static,
    {
        self.initialize().await?;
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get().map_err(DatabaseError::Pool)?;
            f(&mut *conn)
        })
        .await
        .map_err(DatabaseError::Task)?
    }
}

fn unavailable(path: &Path, err: impl std::fmt::Display) -> AppError {
    DatabaseError::Unavailable {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
    .into()
}

fn lock_path_for(db_path: &Path) -> PathBuf {
    let mut raw = db_path.as_os_str().to_owned();
    raw.push(".");
    raw.push(LOCK_FILE_EXTENSION);
    PathBuf::from(raw)
}

/// Exclusive advisory lock held for the lifetime of a [`Database`].
#[derive(Debug)]
struct StoreLock {
    file: File,
    path: PathBuf,
}

impl StoreLock {
    fn acquire(path: &Path) -> Result<Self, LockError> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path)
            .map_err(|source| LockError::AcquisitionFailed {
                path: path.to_path_buf(),
                source,
            })?;

        match file.try_lock_exclusive() {
            Ok(()) => {
                debug!("Acquired store lock at {:?}", path);
                Ok(StoreLock {
                    file,
                    path: path.to_path_buf(),
                })
            }
            Err(e) if is_contended(&e) => Err(LockError::FileBusy {
                path: path.to_path_buf(),
            }),
            Err(source) => Err(LockError::AcquisitionFailed {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

fn is_contended(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::WouldBlock
        || err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            warn!("Failed to release store lock {:?}: {}", self.path, e);
        }
    }
}

/// Connection customizer applying per-connection pragmas.
#[derive(Debug)]
struct SqliteConfig;

impl r2d2::CustomizeConnection<Connection, rusqlite::Error> for SqliteConfig {
    fn on_acquire(&self, conn: &mut Connection) -> Result<(), rusqlite::Error> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.busy_timeout(Duration::from_millis(BUSY_TIMEOUT_MS))?;
        Ok(())
    }

    fn on_release(&self, _conn: Connection) {}
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::Database;
    use std::sync::Arc;
    use tempfile::TempDir;

    /// Opens a fresh store in a temporary directory. Keep the `TempDir`
    /// alive for as long as the database is used.
    pub fn open_temp_db() -> (Arc<Database>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::open(&temp_dir.path().join("daybook.db")).unwrap();
        (Arc::new(db), temp_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::open_temp_db;
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_database_open_and_connect() {
        let (db, _temp_dir) = open_temp_db();
        let conn = db.get_conn().unwrap();

        let result: i32 = conn
            .query_row("SELECT 1 + 1", [], |row| row.get(0))
            .unwrap();
        assert_eq!(result, 2);
    }

    #[test]
    fn test_open_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("nested").join("dir").join("daybook.db");

        let db = Database::open(&db_path).unwrap();
        assert!(db_path.exists());
        assert_eq!(db.path(), db_path.as_path());
    }

    #[test]
    fn test_second_open_is_rejected_while_locked() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("daybook.db");

        let first = Database::open(&db_path).unwrap();
        let second = Database::open(&db_path);
        assert!(matches!(
            second,
            Err(AppError::Lock(LockError::FileBusy { .. }))
        ));

        drop(first);
        assert!(Database::open(&db_path).is_ok());
    }

    #[test]
    fn test_open_non_database_file_is_unavailable() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("daybook.db");
        std::fs::write(&db_path, b"definitely not a sqlite file, just some bytes here").unwrap();

        let result = Database::open(&db_path);
        assert!(matches!(result, Err(ref e) if e.is_storage_unavailable()));
    }

    #[tokio::test]
    async fn test_initialize_idempotent() {
        let (db, _temp_dir) = open_temp_db();

        db.initialize().await.unwrap();
        db.initialize().await.unwrap();

        let moods = db.list_moods().await.unwrap();
        assert_eq!(moods.len(), 5);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_initialize_seeds_once() {
        let (db, _temp_dir) = open_temp_db();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let db = Arc::clone(&db);
            handles.push(tokio::spawn(async move { db.initialize().await }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let conn = db.get_conn().unwrap();
        let versions: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
            .unwrap();
        let moods: i64 = conn
            .query_row("SELECT COUNT(*) FROM moods", [], |row| row.get(0))
            .unwrap();
        assert_eq!(versions, 1);
        assert_eq!(moods, 5);
    }

    #[test]
    fn test_foreign_keys_enabled_on_pooled_connections() {
        let (db, _temp_dir) = open_temp_db();
        let conn = db.get_conn().unwrap();
        let enabled: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(enabled, 1);
    }
}
