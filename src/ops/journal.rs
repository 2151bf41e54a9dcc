//! Day-oriented journal operations.
//!
//! The store allows one entry per calendar date; this service adds the
//! policies around that: creating today's entry on demand, refusing entries
//! for future dates and month-based listings.

use crate::db::entries::JournalEntry;
use crate::db::moods::Mood;
use crate::db::tags::Tag;
use crate::db::Database;
use crate::errors::{AppError, AppResult};
use crate::journal_core::default_entry_title;
use chrono::{Local, NaiveDate};
use std::sync::Arc;
use tracing::{debug, info};

/// Entry lifecycle on top of the store.
#[derive(Debug, Clone)]
pub struct JournalService {
    db: Arc<Database>,
}

impl JournalService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// The entry for `date`, if one exists.
    pub async fn get_entry_for_date(&self, date: NaiveDate) -> AppResult<Option<JournalEntry>> {
        self.db.get_entry_by_date(date).await
    }

    /// The entry with id `id`, if one exists.
    pub async fn get_entry(&self, id: i64) -> AppResult<Option<JournalEntry>> {
        self.db.get_entry(id).await
    }

    /// Returns today's entry, creating and saving an empty one first if
    /// needed. Calling this repeatedly on the same day yields the same entry.
    pub async fn create_entry_for_today(&self) -> AppResult<JournalEntry> {
        let today = Local::now().date_naive();
        self.get_or_create(today).await
    }

    /// Returns the entry for `date`, creating and saving an empty one if
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if `date` is after today.
    pub async fn create_entry_for_date(&self, date: NaiveDate) -> AppResult<JournalEntry> {
        let today = Local::now().date_naive();
        if date > today {
            return Err(AppError::Validation(format!(
                "Cannot create an entry for {}, which is in the future",
                date
            )));
        }
        self.get_or_create(date).await
    }

    async fn get_or_create(&self, date: NaiveDate) -> AppResult<JournalEntry> {
        if let Some(existing) = self.db.get_entry_by_date(date).await? {
            debug!("Entry for {} already exists", date);
            return Ok(existing);
        }

        let mut entry = JournalEntry::new(date);
        entry.title = default_entry_title(date);

        match self.db.save_entry(&mut entry).await {
            Ok(id) => {
                info!("Created entry {} for {}", id, date);
                Ok(entry)
            }
            // Another caller created it between the lookup and the insert
            Err(e) if e.is_constraint_violation() => self
                .db
                .get_entry_by_date(date)
                .await?
                .ok_or(e),
            Err(e) => Err(e),
        }
    }

    /// Saves `entry`, inserting it when it has no id.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::ConstraintViolation` if another entry already
    /// uses the date.
    pub async fn save_entry(&self, entry: &mut JournalEntry) -> AppResult<i64> {
        self.db.save_entry(entry).await
    }

    /// Saves `entry` and replaces its tags atomically.
    pub async fn save_entry_with_tags(
        &self,
        entry: &mut JournalEntry,
        tag_names: &[String],
    ) -> AppResult<i64> {
        self.db.save_entry_with_tags(entry, tag_names).await
    }

    /// Deletes `entry`. Returns the number of entries removed.
    pub async fn delete_entry(&self, entry: &JournalEntry) -> AppResult<usize> {
        let removed = self.db.delete_entry(entry).await?;
        if removed > 0 {
            info!("Deleted entry for {}", entry.entry_date);
        }
        Ok(removed)
    }

    /// Entries of one calendar month, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for a month outside 1..=12.
    pub async fn get_entries_for_month(
        &self,
        year: i32,
        month: u32,
    ) -> AppResult<Vec<JournalEntry>> {
        self.db.list_entries_for_month(year, month).await
    }

    /// Every entry, newest first.
    pub async fn get_all_entries(&self) -> AppResult<Vec<JournalEntry>> {
        self.db.list_entries().await
    }

    /// Whether an entry exists for `date`.
    pub async fn has_entry_for_date(&self, date: NaiveDate) -> AppResult<bool> {
        Ok(self.db.get_entry_by_date(date).await?.is_some())
    }

    /// Replaces the tags of the entry with id `entry_id`.
    pub async fn save_tags_for_entry(
        &self,
        entry_id: i64,
        tag_names: &[String],
    ) -> AppResult<Vec<Tag>> {
        self.db.replace_tags_for_entry(entry_id, tag_names).await
    }

    /// Tags of the entry with id `entry_id`, sorted by name.
    pub async fn get_tags_for_entry(&self, entry_id: i64) -> AppResult<Vec<Tag>> {
        self.db.get_tags_for_entry(entry_id).await
    }

    /// The mood catalog.
    pub async fn list_moods(&self) -> AppResult<Vec<Mood>> {
        self.db.list_moods().await
    }

    /// Every known tag.
    pub async fn list_tags(&self) -> AppResult<Vec<Tag>> {
        self.db.list_tags().await
    }
}
