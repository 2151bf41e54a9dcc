//! Browsing past entries: filtered search, export ranges and the calendar.

use crate::db::entries::{DateOrder, JournalEntry};
use crate::db::Database;
use crate::errors::{AppError, AppResult};
use crate::journal_core::{days_of_month, month_bounds};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Criteria for [`HistoryService::search`]. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryFilter {
    /// Case-insensitive substring of the title or the content.
    pub text: Option<String>,
    /// Inclusive lower date bound.
    pub from: Option<NaiveDate>,
    /// Inclusive upper date bound.
    pub to: Option<NaiveDate>,
    /// Exact primary mood name.
    pub primary_mood: Option<String>,
}

impl EntryFilter {
    /// Whether `entry` satisfies every set criterion.
    pub fn matches(&self, entry: &JournalEntry) -> bool {
        if self.from.is_some_and(|from| entry.entry_date < from) {
            return false;
        }
        if self.to.is_some_and(|to| entry.entry_date > to) {
            return false;
        }
        if let Some(mood) = self.primary_mood.as_deref() {
            if entry.primary_mood != mood {
                return false;
            }
        }
        match self.text.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => {
                let needle = needle.to_lowercase();
                entry.title.to_lowercase().contains(&needle)
                    || entry.content.to_lowercase().contains(&needle)
            }
            _ => true,
        }
    }
}

/// One cell of a month calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub has_entry: bool,
    pub entry_id: Option<i64>,
}

/// Read-only queries over the entry history.
#[derive(Debug, Clone)]
pub struct HistoryService {
    db: Arc<Database>,
}

impl HistoryService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Entries matching `filter`, newest first.
    pub async fn search(&self, filter: &EntryFilter) -> AppResult<Vec<JournalEntry>> {
        let entries = match (filter.from, filter.to) {
            (Some(from), Some(to)) if from > to => return Ok(Vec::new()),
            (Some(from), Some(to)) => {
                self.db
                    .list_entries_between(from, to, DateOrder::Descending)
                    .await?
            }
            _ => self.db.list_entries().await?,
        };

        let matched: Vec<JournalEntry> = entries
            .into_iter()
            .filter(|entry| filter.matches(entry))
            .collect();
        debug!("History search matched {} entries", matched.len());
        Ok(matched)
    }

    /// Entries from `start` to `end` inclusive, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if `start` is after `end`.
    pub async fn entries_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<JournalEntry>> {
        if start > end {
            return Err(AppError::Validation(
                "start date cannot be after end date".to_string(),
            ));
        }
        self.db
            .list_entries_between(start, end, DateOrder::Ascending)
            .await
    }

    /// One [`CalendarDay`] per day of the month, in order.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for a month outside 1..=12.
    pub async fn month_overview(&self, year: i32, month: u32) -> AppResult<Vec<CalendarDay>> {
        if month_bounds(year, month).is_none() {
            return Err(AppError::Validation(format!(
                "Invalid month {}-{:02}",
                year, month
            )));
        }

        let entries = self.db.list_entries_for_month(year, month).await?;
        let by_date: HashMap<NaiveDate, Option<i64>> = entries
            .into_iter()
            .map(|e| (e.entry_date, e.id))
            .collect();

        Ok(days_of_month(year, month)
            .into_iter()
            .map(|date| {
                let entry_id = by_date.get(&date).copied().flatten();
                CalendarDay {
                    date,
                    has_entry: by_date.contains_key(&date),
                    entry_id,
                }
            })
            .collect())
    }

    /// The `limit` most recent entries.
    pub async fn recent_entries(&self, limit: usize) -> AppResult<Vec<JournalEntry>> {
        let mut entries = self.db.list_entries().await?;
        entries.truncate(limit);
        Ok(entries)
    }
}
