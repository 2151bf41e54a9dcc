//! High-level journal operations.
//!
//! Each service holds a shared handle to the store and exposes the
//! user-facing operations built on it: entry lifecycle, history browsing,
//! statistics and the PIN gate.

pub mod analytics;
pub mod credentials;
pub mod history;
pub mod journal;

// Re-export commonly used types
pub use analytics::{AnalyticsService, AnalyticsSummary};
pub use credentials::CredentialService;
pub use history::{CalendarDay, EntryFilter, HistoryService};
pub use journal::JournalService;
