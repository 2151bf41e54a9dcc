//! Database schema definitions and initialization.
//!
//! This module defines the SQLite schema for the five record kinds: entries,
//! moods, tags, entry/tag associations and the PIN credential.

use crate::errors::{AppResult, DatabaseError};
use rusqlite::Connection;
use tracing::{debug, info};

/// Current schema version.
///
/// Increment this whenever schema changes are made to support future migrations.
pub const SCHEMA_VERSION: i32 = 1;

/// Creates all database tables and indexes.
///
/// This function is idempotent - it uses `CREATE TABLE IF NOT EXISTS`
/// so it's safe to call multiple times.
///
/// # Tables
///
/// - `entries`: One journal entry per calendar date
/// - `moods`: Mood catalog used to populate choice inputs
/// - `tags`: Tag names, created on first use and never pruned
/// - `entry_tags`: Many-to-many association between entries and tags
/// - `credentials`: Singleton row holding the PIN digest
/// - `schema_version`: Applied schema versions
///
/// # Errors
///
/// Returns an error if any DDL statement fails.
pub fn create_tables(conn: &Connection) -> AppResult<()> {
    debug!("Creating database tables");

    conn.execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(DatabaseError::Sqlite)?;

    // Dates are ISO text, so UNIQUE compares whole calendar days
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS entries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            entry_date TEXT NOT NULL UNIQUE,
            title TEXT NOT NULL DEFAULT '',
            content TEXT NOT NULL DEFAULT '',
            primary_mood TEXT NOT NULL DEFAULT '',
            secondary_moods TEXT NOT NULL DEFAULT '[]',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_entries_primary_mood ON entries(primary_mood);
        "#,
    )
    .map_err(DatabaseError::Sqlite)?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS moods (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            category TEXT NOT NULL CHECK(category IN ('Positive', 'Neutral', 'Negative')),
            icon TEXT NOT NULL DEFAULT ''
        );
        "#,
    )
    .map_err(DatabaseError::Sqlite)?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS tags (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS entry_tags (
            entry_id INTEGER NOT NULL,
            tag_id INTEGER NOT NULL,
            FOREIGN KEY (entry_id) REFERENCES entries(id) ON DELETE CASCADE,
            FOREIGN KEY (tag_id) REFERENCES tags(id)
        );

        CREATE INDEX IF NOT EXISTS idx_entry_tags_entry_id ON entry_tags(entry_id);
        CREATE INDEX IF NOT EXISTS idx_entry_tags_tag_id ON entry_tags(tag_id);
        "#,
    )
    .map_err(DatabaseError::Sqlite)?;

    // Single-user: at most one credential row
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS credentials (
            id INTEGER PRIMARY KEY CHECK(id = 1),
            pin_hash TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        "#,
    )
    .map_err(DatabaseError::Sqlite)?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER NOT NULL,
            applied_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        );
        "#,
    )
    .map_err(DatabaseError::Sqlite)?;

    let current_version = get_schema_version(conn)?;
    if current_version.is_none() {
        conn.execute(
            "INSERT INTO schema_version (version) VALUES (?)",
            [SCHEMA_VERSION],
        )
        .map_err(DatabaseError::Sqlite)?;
        info!("Initialized database schema version {}", SCHEMA_VERSION);
    } else {
        debug!("Schema version already recorded: {:?}", current_version);
    }

    debug!("Database tables created successfully");
    Ok(())
}

/// Gets the current schema version from the database.
///
/// Returns `None` if the schema_version table doesn't exist or is empty.
///
/// # Errors
///
/// Returns an error if the query fails for reasons other than missing table.
pub fn get_schema_version(conn: &Connection) -> AppResult<Option<i32>> {
    let result = conn.query_row(
        "SELECT version FROM schema_version ORDER BY applied_at DESC LIMIT 1",
        [],
        |row| row.get(0),
    );

    match result {
        Ok(version) => Ok(Some(version)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) if e.to_string().contains("no such table") => Ok(None),
        Err(e) => Err(DatabaseError::Sqlite(e).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn table_exists(conn: &Connection, name: &str) -> bool {
        let count: i32 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                [name],
                |row| row.get(0),
            )
            .unwrap();
        count == 1
    }

    #[test]
    fn test_create_tables() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();

        for table in ["entries", "moods", "tags", "entry_tags", "credentials", "schema_version"] {
            assert!(table_exists(&conn, table), "missing table {}", table);
        }
    }

    #[test]
    fn test_create_tables_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        create_tables(&conn).unwrap();
        create_tables(&conn).unwrap();

        assert_eq!(get_schema_version(&conn).unwrap(), Some(SCHEMA_VERSION));
    }

    #[test]
    fn test_schema_version_missing_table() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), None);
    }

    #[test]
    fn test_entry_date_unique() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();

        let insert = "INSERT INTO entries (entry_date, created_at, updated_at) VALUES (?1, ?2, ?2)";
        conn.execute(insert, ["2024-01-01", "2024-01-01 09:00:00"])
            .unwrap();
        let result = conn.execute(insert, ["2024-01-01", "2024-01-01 10:00:00"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_credentials_singleton() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();

        conn.execute(
            "INSERT INTO credentials (id, pin_hash, created_at) VALUES (1, 'a', '2024-01-01 00:00:00')",
            [],
        )
        .unwrap();

        let result = conn.execute(
            "INSERT INTO credentials (id, pin_hash, created_at) VALUES (2, 'b', '2024-01-01 00:00:00')",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_mood_category_constraint() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();

        let result = conn.execute(
            "INSERT INTO moods (name, category, icon) VALUES ('Bored', 'Meh', '')",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_entry_tags_cascade_on_entry_delete() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();

        conn.execute_batch(
            r#"
            INSERT INTO entries (id, entry_date, created_at, updated_at)
                VALUES (1, '2024-01-01', '2024-01-01 09:00:00', '2024-01-01 09:00:00');
            INSERT INTO tags (id, name) VALUES (1, 'work');
            INSERT INTO entry_tags (entry_id, tag_id) VALUES (1, 1);
            DELETE FROM entries WHERE id = 1;
            "#,
        )
        .unwrap();

        let links: i64 = conn
            .query_row("SELECT COUNT(*) FROM entry_tags", [], |row| row.get(0))
            .unwrap();
        let tags: i64 = conn
            .query_row("SELECT COUNT(*) FROM tags", [], |row| row.get(0))
            .unwrap();
        assert_eq!(links, 0);
        assert_eq!(tags, 1);
    }
}
