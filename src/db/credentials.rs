//! Storage for the single PIN credential.

use crate::constants::TIMESTAMP_FORMAT;
use crate::db::Database;
use crate::errors::{AppResult, DatabaseError};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

/// Singleton row id. The schema rejects any other id.
const CREDENTIAL_ROW_ID: i64 = 1;

/// The stored PIN digest.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    /// `None` until first saved.
    pub id: Option<i64>,
    /// Base64 SHA-256 digest of the PIN.
    pub pin_hash: String,
    pub created_at: NaiveDateTime,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("id", &self.id)
            .field("pin_hash", &crate::constants::REDACTED_PLACEHOLDER)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Returns the stored credential, if one has been set.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn get_credential(conn: &Connection) -> AppResult<Option<Credential>> {
    let row = conn
        .query_row(
            "SELECT id, pin_hash, created_at FROM credentials LIMIT 1",
            [],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        )
        .optional()
        .map_err(DatabaseError::Sqlite)?;

    match row {
        Some((id, pin_hash, created_at)) => {
            let created_at = NaiveDateTime::parse_from_str(&created_at, TIMESTAMP_FORMAT)
                .map_err(|e| DatabaseError::Corrupt {
                    column: "created_at",
                    message: e.to_string(),
                })?;
            Ok(Some(Credential {
                id: Some(id),
                pin_hash,
                created_at,
            }))
        }
        None => Ok(None),
    }
}

/// Writes the credential, replacing the digest of an existing row.
///
/// `created_at` of an existing row is never changed. Returns the row id.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn save_credential(conn: &Connection, credential: &Credential) -> AppResult<i64> {
    let updated = conn
        .execute(
            "UPDATE credentials SET pin_hash = ?1 WHERE id = ?2",
            params![credential.pin_hash, CREDENTIAL_ROW_ID],
        )
        .map_err(DatabaseError::Sqlite)?;

    if updated == 0 {
        debug!("Inserting credential row");
        conn.execute(
            "INSERT INTO credentials (id, pin_hash, created_at) VALUES (?1, ?2, ?3)",
            params![
                CREDENTIAL_ROW_ID,
                credential.pin_hash,
                credential.created_at.format(TIMESTAMP_FORMAT).to_string(),
            ],
        )
        .map_err(DatabaseError::Sqlite)?;
    } else {
        debug!("Updated credential digest");
    }

    Ok(CREDENTIAL_ROW_ID)
}

impl Database {
    /// The stored credential, if any.
    pub async fn get_credential(&self) -> AppResult<Option<Credential>> {
        self.with_conn(|conn| get_credential(conn)).await
    }

    /// Creates or replaces the credential. `credential.id` is set on success.
    pub async fn save_credential(&self, credential: &mut Credential) -> AppResult<i64> {
        let pending = credential.clone();
        let id = self
            .with_conn(move |conn| save_credential(conn, &pending))
            .await?;
        credential.id = Some(id);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::create_tables;
    use chrono::NaiveDate;

    fn setup_test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        conn
    }

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_no_credential() {
        let conn = setup_test_db();
        assert!(get_credential(&conn).unwrap().is_none());
    }

    #[test]
    fn test_save_then_replace_keeps_single_row() {
        let conn = setup_test_db();
        let first = Credential {
            id: None,
            pin_hash: "first".to_string(),
            created_at: at(9),
        };
        assert_eq!(save_credential(&conn, &first).unwrap(), 1);

        let second = Credential {
            id: None,
            pin_hash: "second".to_string(),
            created_at: at(17),
        };
        save_credential(&conn, &second).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM credentials", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);

        let stored = get_credential(&conn).unwrap().unwrap();
        assert_eq!(stored.pin_hash, "second");
        assert_eq!(stored.created_at, at(9));
        assert_eq!(stored.id, Some(1));
    }

    #[test]
    fn test_debug_redacts_digest() {
        let credential = Credential {
            id: Some(1),
            pin_hash: "c2VjcmV0".to_string(),
            created_at: at(9),
        };
        let debug = format!("{:?}", credential);
        assert!(!debug.contains("c2VjcmV0"));
        assert!(debug.contains("REDACTED"));
    }
}
