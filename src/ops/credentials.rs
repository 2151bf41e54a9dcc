//! PIN setup and verification.

use crate::crypto::{hash_pin, validate_pin_format, verify_pin};
use crate::db::credentials::Credential;
use crate::db::Database;
use crate::errors::AppResult;
use chrono::Local;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Gatekeeper for the journal's PIN.
#[derive(Debug, Clone)]
pub struct CredentialService {
    db: Arc<Database>,
    pin_length: usize,
}

impl CredentialService {
    /// Creates a service requiring PINs of exactly `pin_length` digits.
    pub fn new(db: Arc<Database>, pin_length: usize) -> Self {
        Self { db, pin_length }
    }

    /// Whether a PIN has been set.
    pub async fn is_configured(&self) -> AppResult<bool> {
        let credential = self.db.get_credential().await?;
        Ok(credential.is_some_and(|c| !c.pin_hash.is_empty()))
    }

    /// Sets or replaces the PIN.
    ///
    /// The credential row and its `created_at` survive a replacement; only
    /// the digest changes.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::InvalidPin` if `pin` is not exactly the
    /// configured number of ASCII digits.
    pub async fn set_pin(&self, pin: &str) -> AppResult<()> {
        validate_pin_format(pin, self.pin_length)?;

        let mut credential = match self.db.get_credential().await? {
            Some(existing) => existing,
            None => Credential {
                id: None,
                pin_hash: String::new(),
                created_at: Local::now().naive_local(),
            },
        };
        credential.pin_hash = hash_pin(pin);
        self.db.save_credential(&mut credential).await?;

        info!("PIN updated");
        Ok(())
    }

    /// Checks `pin` against the stored digest. Returns `false` when no PIN
    /// has been set.
    pub async fn verify_pin(&self, pin: &str) -> AppResult<bool> {
        match self.db.get_credential().await? {
            Some(credential) => {
                let matches = verify_pin(pin, &credential.pin_hash);
                if !matches {
                    debug!("PIN verification failed");
                }
                Ok(matches)
            }
            None => Ok(false),
        }
    }

    /// Replaces the PIN after checking the current one.
    ///
    /// Returns `false` without changing anything when `current` is wrong.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::InvalidPin` if `new_pin` is malformed.
    pub async fn change_pin(&self, current: &str, new_pin: &str) -> AppResult<bool> {
        validate_pin_format(new_pin, self.pin_length)?;
        if !self.verify_pin(current).await? {
            warn!("PIN change rejected: current PIN did not match");
            return Ok(false);
        }
        self.set_pin(new_pin).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::open_temp_db;
    use crate::errors::{AppError, CredentialError};

    #[tokio::test]
    async fn test_unconfigured_store() {
        let (db, _temp_dir) = open_temp_db();
        let service = CredentialService::new(db, 4);

        assert!(!service.is_configured().await.unwrap());
        assert!(!service.verify_pin("1234").await.unwrap());
    }

    #[tokio::test]
    async fn test_set_and_verify_pin() {
        let (db, _temp_dir) = open_temp_db();
        let service = CredentialService::new(Arc::clone(&db), 4);

        service.set_pin("1234").await.unwrap();
        assert!(service.is_configured().await.unwrap());
        assert!(service.verify_pin("1234").await.unwrap());
        assert!(!service.verify_pin("4321").await.unwrap());

        let stored = db.get_credential().await.unwrap().unwrap();
        assert_eq!(stored.pin_hash, hash_pin("1234"));
    }

    #[tokio::test]
    async fn test_reset_pin_keeps_row_and_created_at() {
        let (db, _temp_dir) = open_temp_db();
        let service = CredentialService::new(Arc::clone(&db), 4);

        service.set_pin("1111").await.unwrap();
        let first = db.get_credential().await.unwrap().unwrap();

        service.set_pin("2222").await.unwrap();
        let second = db.get_credential().await.unwrap().unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.created_at, second.created_at);
        assert!(service.verify_pin("2222").await.unwrap());
        assert!(!service.verify_pin("1111").await.unwrap());
    }

    #[tokio::test]
    async fn test_set_pin_rejects_bad_format() {
        let (db, _temp_dir) = open_temp_db();
        let service = CredentialService::new(db, 4);

        let result = service.set_pin("12ab").await;
        assert!(matches!(
            result,
            Err(AppError::Credential(CredentialError::InvalidPin { .. }))
        ));
        assert!(!service.is_configured().await.unwrap());
    }

    #[tokio::test]
    async fn test_change_pin() {
        let (db, _temp_dir) = open_temp_db();
        let service = CredentialService::new(db, 6);

        service.set_pin("123456").await.unwrap();
        assert!(!service.change_pin("000000", "654321").await.unwrap());
        assert!(service.verify_pin("123456").await.unwrap());

        assert!(service.change_pin("123456", "654321").await.unwrap());
        assert!(service.verify_pin("654321").await.unwrap());

        assert!(service.change_pin("654321", "12").await.is_err());
    }
}
