/*!
# Daybook

Daybook is the local persistence and analytics engine behind a single-user
daily journal. It keeps one entry per calendar day in an embedded SQLite
store, tracks moods and tags, computes writing streaks and statistics, and
gates the journal behind a numeric PIN.

## Core Features

- Create today's entry on demand, edit and delete entries
- Primary and secondary moods from a seeded catalog, free-form tags
- Search history by text, date range and mood; month calendars
- Current and longest writing streaks, mood distribution, word totals
- PIN setup and verification

## Architecture

- `db`: The SQLite store, its schema and typed record operations
- `ops`: Services built on the store (journal, history, analytics, credentials)
- `journal_core`: Pure date and text logic used by the services
- `crypto`: PIN digest and comparison
- `config`: Configuration loading and validation
- `logging`: Tracing subscriber setup
- `errors`: Error handling infrastructure

## Usage Example

```rust,no_run
use daybook::{Config, Journal};

#[tokio::main]
async fn main() -> daybook::AppResult<()> {
    let config = Config::load()?;
    daybook::logging::init_tracing(&config);

    let journal = Journal::open(&config).await?;
    if !journal.credentials.is_configured().await? {
        journal.credentials.set_pin("1234").await?;
    }

    let mut today = journal.entries.create_entry_for_today().await?;
    today.content = "Slept well, long walk after lunch.".to_string();
    today.primary_mood = "Happy".to_string();
    journal.entries.save_entry(&mut today).await?;

    let stats = journal.analytics.get_streak_stats().await?;
    println!("Current streak: {} days", stats.current);
    Ok(())
}
```
*/

/// Facade bundling the store and services
pub mod app;
/// Configuration loading and management
pub mod config;
/// Application-wide constants
pub mod constants;
/// PIN hashing
pub mod crypto;
/// SQLite persistence
pub mod db;
/// Error types and utilities for error handling
pub mod errors;
/// Pure journal logic
pub mod journal_core;
/// Tracing setup
pub mod logging;
/// User-facing services
pub mod ops;

// Re-export important types for convenience
pub use app::Journal;
pub use config::Config;
pub use db::entries::{JournalEntry, SecondaryMoods};
pub use db::moods::{Mood, MoodCategory};
pub use db::tags::Tag;
pub use db::Database;
pub use errors::{AppError, AppResult};
pub use journal_core::StreakStats;
pub use ops::{
    AnalyticsService, AnalyticsSummary, CalendarDay, CredentialService, EntryFilter,
    HistoryService, JournalService,
};
