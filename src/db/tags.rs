//! Tag taxonomy and entry/tag associations.
//!
//! Tags are created the first time a name is used and are never pruned,
//! even when no entry references them any more.

use crate::db::entries::{self, JournalEntry};
use crate::db::Database;
use crate::errors::{AppResult, DatabaseError};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// A tag name with its surrogate key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

/// Lists every tag, ordered by name.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn list_tags(conn: &Connection) -> AppResult<Vec<Tag>> {
    let mut stmt = conn
        .prepare("SELECT id, name FROM tags ORDER BY name")
        .map_err(DatabaseError::Sqlite)?;
    let tags = stmt
        .query_map([], |row| {
            Ok(Tag {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })
        .map_err(DatabaseError::Sqlite)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(DatabaseError::Sqlite)?;
    Ok(tags)
}

/// Lists the tags linked to an entry, ordered by name, without duplicates.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn tags_for_entry(conn: &Connection, entry_id: i64) -> AppResult<Vec<Tag>> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT DISTINCT t.id, t.name
            FROM tags t
            JOIN entry_tags et ON et.tag_id = t.id
            WHERE et.entry_id = ?1
            ORDER BY t.name
            "#,
        )
        .map_err(DatabaseError::Sqlite)?;
    let tags = stmt
        .query_map(params![entry_id], |row| {
            Ok(Tag {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })
        .map_err(DatabaseError::Sqlite)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(DatabaseError::Sqlite)?;
    Ok(tags)
}

/// Returns the id of the tag called `name`, creating it if needed.
fn find_or_create_tag(conn: &Connection, name: &str) -> AppResult<i64> {
    let existing = conn
        .query_row(
            "SELECT id FROM tags WHERE name = ?1",
            params![name],
            |row| row.get::<_, i64>(0),
        )
        .optional()
        .map_err(DatabaseError::Sqlite)?;

    match existing {
        Some(id) => Ok(id),
        None => {
            conn.execute("INSERT INTO tags (name) VALUES (?1)", params![name])
                .map_err(DatabaseError::Sqlite)?;
            debug!("Created tag '{}'", name);
            Ok(conn.last_insert_rowid())
        }
    }
}

/// Trims names, drops blanks and removes duplicates.
pub fn normalize_tag_names<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    names
        .iter()
        .map(|n| n.as_ref().trim())
        .filter(|n| !n.is_empty())
        .filter(|n| seen.insert(n.to_string()))
        .map(str::to_string)
        .collect()
}

/// Replaces the entry's tag set with `names`.
///
/// Existing associations for the entry are removed, then one association is
/// created per distinct non-blank name, creating tags that don't exist yet.
/// The caller is expected to run this inside a transaction.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn replace_tags_for_entry(
    conn: &Connection,
    entry_id: i64,
    names: &[String],
) -> AppResult<Vec<Tag>> {
    debug!("Replacing tags for entry id {}", entry_id);

    conn.execute(
        "DELETE FROM entry_tags WHERE entry_id = ?1",
        params![entry_id],
    )
    .map_err(DatabaseError::Sqlite)?;

    for name in normalize_tag_names(names) {
        let tag_id = find_or_create_tag(conn, &name)?;
        conn.execute(
            "INSERT INTO entry_tags (entry_id, tag_id) VALUES (?1, ?2)",
            params![entry_id, tag_id],
        )
        .map_err(DatabaseError::Sqlite)?;
    }

    tags_for_entry(conn, entry_id)
}

impl Database {
    /// Every tag, ordered by name.
    pub async fn list_tags(&self) -> AppResult<Vec<Tag>> {
        self.with_conn(|conn| list_tags(conn)).await
    }

    /// Tags linked to the entry with id `entry_id`.
    pub async fn get_tags_for_entry(&self, entry_id: i64) -> AppResult<Vec<Tag>> {
        self.with_conn(move |conn| tags_for_entry(conn, entry_id))
            .await
    }

    /// Atomically replaces the tag set of a saved entry.
    ///
    /// # Errors
    ///
    /// Returns an error if no entry has id `entry_id`; the previous tag set
    /// is left untouched.
    pub async fn replace_tags_for_entry(
        &self,
        entry_id: i64,
        names: &[String],
    ) -> AppResult<Vec<Tag>> {
        let names = names.to_vec();
        self.with_conn(move |conn| {
            let tx = conn.transaction().map_err(DatabaseError::Sqlite)?;
            let tags = replace_tags_for_entry(&tx, entry_id, &names)?;
            tx.commit().map_err(DatabaseError::Sqlite)?;
            Ok(tags)
        })
        .await
    }

    /// Saves `entry` and replaces its tags in one transaction, returning the
    /// entry id.
    ///
    /// On failure neither the entry nor its tags change, and `entry` is
    /// left as it was.
    pub async fn save_entry_with_tags(
        &self,
        entry: &mut JournalEntry,
        names: &[String],
    ) -> AppResult<i64> {
        let mut pending = entry.clone();
        let names = names.to_vec();
        let (id, saved) = self
            .with_conn(move |conn| {
                let tx = conn.transaction().map_err(DatabaseError::Sqlite)?;
                let id = entries::save_entry(&tx, &mut pending)?;
                replace_tags_for_entry(&tx, id, &names)?;
                tx.commit().map_err(DatabaseError::Sqlite)?;
                Ok((id, pending))
            })
            .await?;
        *entry = saved;
        Ok(id)
    }
}
