//! Entry point bundling the store and every service.

use crate::config::Config;
use crate::db::Database;
use crate::errors::AppResult;
use crate::ops::{AnalyticsService, CredentialService, HistoryService, JournalService};
use std::sync::Arc;
use tracing::info;

/// An open journal: the store plus the services that operate on it.
///
/// The services share one [`Database`]; cloning them is cheap. Dropping the
/// `Journal` and every service clone releases the store lock.
#[derive(Debug, Clone)]
pub struct Journal {
    db: Arc<Database>,
    pub entries: JournalService,
    pub history: HistoryService,
    pub analytics: AnalyticsService,
    pub credentials: CredentialService,
}

impl Journal {
    /// Validates `config`, opens the store at [`Config::db_path`] and
    /// initializes it.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` for an invalid configuration,
    /// `LockError::FileBusy` if another process has the journal open, or
    /// `DatabaseError::Unavailable` if the store cannot be opened.
    pub async fn open(config: &Config) -> AppResult<Self> {
        config.validate()?;

        let db = Arc::new(Database::open(&config.db_path())?);
        db.initialize().await?;
        info!("Journal ready");

        Ok(Journal {
            entries: JournalService::new(Arc::clone(&db)),
            history: HistoryService::new(Arc::clone(&db)),
            analytics: AnalyticsService::new(Arc::clone(&db)),
            credentials: CredentialService::new(Arc::clone(&db), config.pin_length),
            db,
        })
    }

    /// The underlying store.
    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }
}
