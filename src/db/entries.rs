//! Entry CRUD operations.
//!
//! This module provides the journal entry record and the functions for
//! creating, reading, updating, deleting and range-querying entries. The
//! synchronous functions take a `Connection` so they can run inside a
//! transaction; the async methods on [`Database`] are what services call.

use crate::constants::{DATE_FORMAT_ISO, MAX_SECONDARY_MOODS, TIMESTAMP_FORMAT};
use crate::db::Database;
use crate::errors::{AppError, AppResult, DatabaseError};
use crate::journal_core::month_bounds;
use chrono::{Local, NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use tracing::debug;

const ENTRY_COLUMNS: &str =
    "id, entry_date, title, content, primary_mood, secondary_moods, created_at, updated_at";

/// Up to two secondary mood names attached to an entry.
///
/// # Examples
///
/// ```
/// use daybook::db::entries::SecondaryMoods;
///
/// let moods = SecondaryMoods::try_from(vec!["Excited".to_string()]).unwrap();
/// assert_eq!(moods.len(), 1);
///
/// let too_many = vec!["Happy".to_string(), "Sad".to_string(), "Angry".to_string()];
/// assert!(SecondaryMoods::try_from(too_many).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct SecondaryMoods(Vec<String>);

impl SecondaryMoods {
    /// No secondary moods.
    pub fn none() -> Self {
        Self::default()
    }

    /// Number of moods held (0, 1 or 2).
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no secondary mood is set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `name` is one of the secondary moods.
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|m| m == name)
    }

    /// Mood names in the order they were chosen.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    fn to_column(&self) -> AppResult<String> {
        serde_json::to_string(&self.0).map_err(|e| {
            DatabaseError::Corrupt {
                column: "secondary_moods",
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Decodes the stored column. Older rows may hold a comma-separated list
    /// instead of a JSON array.
    fn from_column(raw: &str) -> Result<Self, String> {
        let trimmed = raw.trim();
        let names: Vec<String> = if trimmed.is_empty() {
            Vec::new()
        } else if trimmed.starts_with('[') {
            serde_json::from_str(trimmed).map_err(|e| e.to_string())?
        } else {
            trimmed
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        };
        SecondaryMoods::try_from(names).map_err(|e| e.to_string())
    }
}

impl TryFrom<Vec<String>> for SecondaryMoods {
    type Error = AppError;

    fn try_from(names: Vec<String>) -> Result<Self, Self::Error> {
        let names: Vec<String> = names
            .into_iter()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .collect();

        if names.len() > MAX_SECONDARY_MOODS {
            return Err(AppError::Validation(format!(
                "At most {} secondary moods are allowed, got {}",
                MAX_SECONDARY_MOODS,
                names.len()
            )));
        }
        Ok(SecondaryMoods(names))
    }
}

impl From<SecondaryMoods> for Vec<String> {
    fn from(moods: SecondaryMoods) -> Self {
        moods.0
    }
}

/// One journal entry. Exactly one may exist per calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Surrogate key; `None` until the entry is first saved.
    pub id: Option<i64>,
    pub entry_date: NaiveDate,
    pub title: String,
    pub content: String,
    /// Required before the entry is considered complete; see [`JournalEntry::validate`].
    pub primary_mood: String,
    pub secondary_moods: SecondaryMoods,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl JournalEntry {
    /// Creates an unsaved, empty entry for `entry_date`.
    pub fn new(entry_date: NaiveDate) -> Self {
        let now = Local::now().naive_local();
        JournalEntry {
            id: None,
            entry_date,
            title: String::new(),
            content: String::new(),
            primary_mood: String::new(),
            secondary_moods: SecondaryMoods::none(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Checks the mood rules an editor should enforce before saving.
    ///
    /// Storage accepts entries that fail this check (a freshly created
    /// entry has no mood yet).
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if the primary mood is empty or is
    /// repeated among the secondary moods.
    pub fn validate(&self) -> AppResult<()> {
        if self.primary_mood.trim().is_empty() {
            return Err(AppError::Validation(
                "A primary mood is required".to_string(),
            ));
        }
        if self.secondary_moods.contains(&self.primary_mood) {
            return Err(AppError::Validation(format!(
                "'{}' is already the primary mood",
                self.primary_mood
            )));
        }
        if let [first, second] = self.secondary_moods.as_slice() {
            if first == second {
                return Err(AppError::Validation(format!(
                    "Secondary mood '{}' is listed twice",
                    first
                )));
            }
        }
        Ok(())
    }
}

/// Sort direction for entry listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrder {
    Ascending,
    Descending,
}

impl DateOrder {
    fn as_sql(&self) -> &'static str {
        match self {
            DateOrder::Ascending => "ASC",
            DateOrder::Descending => "DESC",
        }
    }
}

fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

fn conversion_error(idx: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        idx,
        rusqlite::types::Type::Text,
        message.into(),
    )
}

fn parse_date_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    NaiveDate::parse_from_str(&raw, DATE_FORMAT_ISO)
        .map_err(|e| conversion_error(idx, e.to_string()))
}

fn parse_timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    let raw: String = row.get(idx)?;
    NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT)
        .map_err(|e| conversion_error(idx, e.to_string()))
}

fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<JournalEntry> {
    let secondary: String = row.get(5)?;
    Ok(JournalEntry {
        id: Some(row.get(0)?),
        entry_date: parse_date_column(row, 1)?,
        title: row.get(2)?,
        content: row.get(3)?,
        primary_mood: row.get(4)?,
        secondary_moods: SecondaryMoods::from_column(&secondary)
            .map_err(|e| conversion_error(5, e))?,
        created_at: parse_timestamp_column(row, 6)?,
        updated_at: parse_timestamp_column(row, 7)?,
    })
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

/// Lists all entries in the given date order.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn list_entries(conn: &Connection, order: DateOrder) -> AppResult<Vec<JournalEntry>> {
    debug!("Listing all entries");

    let sql = format!(
        "SELECT {} FROM entries ORDER BY entry_date {}",
        ENTRY_COLUMNS,
        order.as_sql()
    );
    let mut stmt = conn.prepare(&sql).map_err(DatabaseError::Sqlite)?;
    let entries = stmt
        .query_map([], row_to_entry)
        .map_err(DatabaseError::Sqlite)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(DatabaseError::Sqlite)?;
    Ok(entries)
}

/// Lists entries whose date lies in `start..=end`.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn list_entries_between(
    conn: &Connection,
    start: NaiveDate,
    end: NaiveDate,
    order: DateOrder,
) -> AppResult<Vec<JournalEntry>> {
    debug!("Listing entries between {} and {}", start, end);

    let sql = format!(
        "SELECT {} FROM entries WHERE entry_date BETWEEN ?1 AND ?2 ORDER BY entry_date {}",
        ENTRY_COLUMNS,
        order.as_sql()
    );
    let mut stmt = conn.prepare(&sql).map_err(DatabaseError::Sqlite)?;
    let entries = stmt
        .query_map(params![start.to_string(), end.to_string()], row_to_entry)
        .map_err(DatabaseError::Sqlite)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(DatabaseError::Sqlite)?;
    Ok(entries)
}

/// Retrieves an entry by id. Returns `Ok(None)` if it doesn't exist.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn get_entry(conn: &Connection, id: i64) -> AppResult<Option<JournalEntry>> {
    debug!("Getting entry id {}", id);

    let sql = format!("SELECT {} FROM entries WHERE id = ?1", ENTRY_COLUMNS);
    conn.query_row(&sql, params![id], row_to_entry)
        .optional()
        .map_err(|e| DatabaseError::Sqlite(e).into())
}

/// Retrieves the entry for a calendar date. Returns `Ok(None)` if no entry
/// exists for that day.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn get_entry_by_date(conn: &Connection, date: NaiveDate) -> AppResult<Option<JournalEntry>> {
    debug!("Getting entry for date {}", date);

    let sql = format!("SELECT {} FROM entries WHERE entry_date = ?1", ENTRY_COLUMNS);
    conn.query_row(&sql, params![date.to_string()], row_to_entry)
        .optional()
        .map_err(|e| DatabaseError::Sqlite(e).into())
}

/// Inserts or updates an entry and returns its id.
///
/// An entry without an id is inserted with `created_at` and `updated_at`
/// stamped to now; an entry with an id has its row updated and
/// `updated_at` stamped. `entry` is updated in place with the id and
/// timestamps that were written.
///
/// # Errors
///
/// Returns `DatabaseError::ConstraintViolation` if another entry already
/// uses the date, `DatabaseError::NotFound` if the id no longer exists, or
/// another error if the database operation fails.
pub fn save_entry(conn: &Connection, entry: &mut JournalEntry) -> AppResult<i64> {
    let now = Local::now().naive_local();
    let secondary = entry.secondary_moods.to_column()?;

    let map_write_error = |e: rusqlite::Error, date: NaiveDate| -> AppError {
        if is_unique_violation(&e) {
            DatabaseError::ConstraintViolation { date }.into()
        } else {
            DatabaseError::Sqlite(e).into()
        }
    };

    match entry.id {
        None => {
            debug!("Inserting entry for date {}", entry.entry_date);
            conn.execute(
                r#"
                INSERT INTO entries
                    (entry_date, title, content, primary_mood, secondary_moods, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
                "#,
                params![
                    entry.entry_date.to_string(),
                    entry.title,
                    entry.content,
                    entry.primary_mood,
                    secondary,
                    format_timestamp(&now),
                ],
            )
            .map_err(|e| map_write_error(e, entry.entry_date))?;

            let id = conn.last_insert_rowid();
            entry.id = Some(id);
            entry.created_at = now;
            entry.updated_at = now;
            debug!("Entry inserted with id {}", id);
            Ok(id)
        }
        Some(id) => {
            debug!("Updating entry id {}", id);
            // Keep updated_at >= created_at even if the clock went backwards
            let updated_at = now.max(entry.created_at);
            let rows_affected = conn
                .execute(
                    r#"
                    UPDATE entries SET
                        entry_date = ?1,
                        title = ?2,
                        content = ?3,
                        primary_mood = ?4,
                        secondary_moods = ?5,
                        updated_at = ?6
                    WHERE id = ?7
                    "#,
                    params![
                        entry.entry_date.to_string(),
                        entry.title,
                        entry.content,
                        entry.primary_mood,
                        secondary,
                        format_timestamp(&updated_at),
                        id,
                    ],
                )
                .map_err(|e| map_write_error(e, entry.entry_date))?;

            if rows_affected == 0 {
                return Err(
                    DatabaseError::NotFound(format!("Entry with id {} not found", id)).into(),
                );
            }

            entry.updated_at = updated_at;
            Ok(id)
        }
    }
}

/// Deletes an entry and returns the number of rows removed (0 or 1).
///
/// Tag associations go with it through the `ON DELETE CASCADE` foreign key;
/// tag rows themselves are kept.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn delete_entry(conn: &Connection, id: i64) -> AppResult<usize> {
    debug!("Deleting entry id {}", id);

    let rows = conn
        .execute("DELETE FROM entries WHERE id = ?1", params![id])
        .map_err(DatabaseError::Sqlite)?;
    Ok(rows)
}

impl Database {
    /// All entries, newest date first.
    pub async fn list_entries(&self) -> AppResult<Vec<JournalEntry>> {
        self.with_conn(|conn| list_entries(conn, DateOrder::Descending))
            .await
    }

    /// Entries whose date lies in `start..=end`, in the requested order.
    pub async fn list_entries_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        order: DateOrder,
    ) -> AppResult<Vec<JournalEntry>> {
        self.with_conn(move |conn| list_entries_between(conn, start, end, order))
            .await
    }

    /// Entries of one calendar month, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for a month outside 1..=12.
    pub async fn list_entries_for_month(
        &self,
        year: i32,
        month: u32,
    ) -> AppResult<Vec<JournalEntry>> {
        let (first, last) = month_bounds(year, month).ok_or_else(|| {
            AppError::Validation(format!("Invalid month {}-{:02}", year, month))
        })?;
        self.list_entries_between(first, last, DateOrder::Ascending)
            .await
    }

    /// Entry with the given id, if any.
    pub async fn get_entry(&self, id: i64) -> AppResult<Option<JournalEntry>> {
        self.with_conn(move |conn| get_entry(conn, id)).await
    }

    /// Entry for the given calendar date, if any.
    pub async fn get_entry_by_date(&self, date: NaiveDate) -> AppResult<Option<JournalEntry>> {
        self.with_conn(move |conn| get_entry_by_date(conn, date))
            .await
    }

    /// Inserts or updates `entry`, writing back its id and timestamps.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::ConstraintViolation` when another entry
    /// already uses the date.
    pub async fn save_entry(&self, entry: &mut JournalEntry) -> AppResult<i64> {
        let mut pending = entry.clone();
        let (id, saved) = self
            .with_conn(move |conn| {
                let id = save_entry(conn, &mut pending)?;
                Ok((id, pending))
            })
            .await?;
        *entry = saved;
        Ok(id)
    }

    /// Deletes `entry`; returns 0 when it was never saved or is already gone.
    pub async fn delete_entry(&self, entry: &JournalEntry) -> AppResult<usize> {
        match entry.id {
            Some(id) => self.with_conn(move |conn| delete_entry(conn, id)).await,
            None => Ok(0),
        }
    }
}
