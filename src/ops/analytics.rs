//! Journal statistics: streaks, mood distribution and word totals.
//!
//! Every call reads the full entry set from the store. Nothing is cached,
//! so results always reflect the latest writes.

use crate::db::entries::JournalEntry;
use crate::db::Database;
use crate::errors::AppResult;
use crate::journal_core::{compute_streaks, count_words, tally_moods, StreakStats};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// All statistics computed from a single read of the entry set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    pub total_entries: usize,
    pub streaks: StreakStats,
    pub mood_distribution: BTreeMap<String, usize>,
    pub total_words: usize,
}

impl AnalyticsSummary {
    /// Computes the summary over `entries` as of `today`.
    pub fn from_entries(entries: &[JournalEntry], today: NaiveDate) -> Self {
        AnalyticsSummary {
            total_entries: entries.len(),
            streaks: compute_streaks(entries.iter().map(|e| e.entry_date), today),
            mood_distribution: tally_moods(entries.iter().map(|e| e.primary_mood.as_str())),
            total_words: total_words(entries),
        }
    }
}

fn total_words(entries: &[JournalEntry]) -> usize {
    entries.iter().map(|e| count_words(&e.content)).sum()
}

/// Computes statistics on demand.
#[derive(Debug, Clone)]
pub struct AnalyticsService {
    db: Arc<Database>,
}

impl AnalyticsService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Current and longest streaks as of today.
    pub async fn get_streak_stats(&self) -> AppResult<StreakStats> {
        let entries = self.db.list_entries().await?;
        let today = Local::now().date_naive();
        let stats = compute_streaks(entries.iter().map(|e| e.entry_date), today);
        debug!(
            "Streaks computed: current={}, longest={}",
            stats.current, stats.longest
        );
        Ok(stats)
    }

    /// Number of entries per primary mood. Entries without a mood are not
    /// counted.
    pub async fn get_mood_distribution(&self) -> AppResult<BTreeMap<String, usize>> {
        let entries = self.db.list_entries().await?;
        Ok(tally_moods(entries.iter().map(|e| e.primary_mood.as_str())))
    }

    /// Sum of words across all entry contents.
    pub async fn get_total_words(&self) -> AppResult<usize> {
        let entries = self.db.list_entries().await?;
        Ok(total_words(&entries))
    }

    /// Every statistic from one consistent read.
    pub async fn summary(&self) -> AppResult<AnalyticsSummary> {
        let entries = self.db.list_entries().await?;
        Ok(AnalyticsSummary::from_entries(
            &entries,
            Local::now().date_naive(),
        ))
    }
}
