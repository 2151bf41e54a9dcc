//! Mood catalog.
//!
//! The catalog is seeded with five moods on first initialization and is
//! read-only afterwards.

use crate::constants::SEED_MOODS;
use crate::db::Database;
use crate::errors::{AppResult, DatabaseError};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Coarse grouping for moods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoodCategory {
    Positive,
    Neutral,
    Negative,
}

impl MoodCategory {
    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            MoodCategory::Positive => "Positive",
            MoodCategory::Neutral => "Neutral",
            MoodCategory::Negative => "Negative",
        }
    }

    /// Parse from database string representation.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Positive" => Some(MoodCategory::Positive),
            "Neutral" => Some(MoodCategory::Neutral),
            "Negative" => Some(MoodCategory::Negative),
            _ => None,
        }
    }
}

/// A catalog mood.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mood {
    pub id: i64,
    pub name: String,
    pub category: MoodCategory,
    /// Display glyph, e.g. an emoji.
    pub icon: String,
}

/// Inserts the seed moods if the catalog is empty.
///
/// Returns the number of moods inserted (0 when the catalog already had
/// rows).
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn seed_moods(conn: &Connection) -> AppResult<usize> {
    let existing: i64 = conn
        .query_row("SELECT COUNT(*) FROM moods", [], |row| row.get(0))
        .map_err(DatabaseError::Sqlite)?;
    if existing > 0 {
        debug!("Mood catalog already has {} rows", existing);
        return Ok(0);
    }

    let tx = conn
        .unchecked_transaction()
        .map_err(DatabaseError::Sqlite)?;
    {
        let mut stmt = tx
            .prepare("INSERT INTO moods (name, category, icon) VALUES (?1, ?2, ?3)")
            .map_err(DatabaseError::Sqlite)?;
        for (name, category, icon) in SEED_MOODS {
            stmt.execute(params![name, category, icon])
                .map_err(DatabaseError::Sqlite)?;
        }
    }
    tx.commit().map_err(DatabaseError::Sqlite)?;

    info!("Seeded {} moods", SEED_MOODS.len());
    Ok(SEED_MOODS.len())
}

/// Lists the mood catalog in insertion order.
///
/// # Errors
///
/// Returns an error if the database operation fails or a row has an
/// unknown category.
pub fn list_moods(conn: &Connection) -> AppResult<Vec<Mood>> {
    let mut stmt = conn
        .prepare("SELECT id, name, category, icon FROM moods ORDER BY id")
        .map_err(DatabaseError::Sqlite)?;

    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })
        .map_err(DatabaseError::Sqlite)?;

    let mut moods = Vec::new();
    for row in rows {
        let (id, name, category, icon) = row.map_err(DatabaseError::Sqlite)?;
        let category = MoodCategory::from_str(&category).ok_or_else(|| DatabaseError::Corrupt {
            column: "category",
            message: format!("unknown mood category '{}'", category),
        })?;
        moods.push(Mood {
            id,
            name,
            category,
            icon,
        });
    }
    Ok(moods)
}

impl Database {
    /// The mood catalog, seeded on first use.
    pub async fn list_moods(&self) -> AppResult<Vec<Mood>> {
        self.with_conn(|conn| list_moods(conn)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::create_tables;

    fn setup_test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        conn
    }

    #[test]
    fn test_seed_moods() {
        let conn = setup_test_db();
        assert_eq!(seed_moods(&conn).unwrap(), 5);

        let moods = list_moods(&conn).unwrap();
        let names: Vec<&str> = moods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Happy", "Excited", "Neutral", "Sad", "Angry"]);
        assert_eq!(moods[0].category, MoodCategory::Positive);
        assert_eq!(moods[2].category, MoodCategory::Neutral);
        assert_eq!(moods[4].category, MoodCategory::Negative);
        assert_eq!(moods[0].icon, "😊");
    }

    #[test]
    fn test_seed_moods_skips_non_empty_catalog() {
        let conn = setup_test_db();
        seed_moods(&conn).unwrap();
        assert_eq!(seed_moods(&conn).unwrap(), 0);
        assert_eq!(list_moods(&conn).unwrap().len(), 5);
    }

    #[test]
    fn test_seed_moods_respects_existing_custom_catalog() {
        let conn = setup_test_db();
        conn.execute(
            "INSERT INTO moods (name, category, icon) VALUES ('Calm', 'Positive', '')",
            [],
        )
        .unwrap();

        assert_eq!(seed_moods(&conn).unwrap(), 0);
        let moods = list_moods(&conn).unwrap();
        assert_eq!(moods.len(), 1);
        assert_eq!(moods[0].name, "Calm");
    }

    #[test]
    fn test_category_round_trip() {
        for category in [
            MoodCategory::Positive,
            MoodCategory::Neutral,
            MoodCategory::Negative,
        ] {
            assert_eq!(MoodCategory::from_str(category.as_str()), Some(category));
        }
        assert_eq!(MoodCategory::from_str("positive"), None);
    }
}
