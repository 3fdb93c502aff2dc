//! SQLite-based recommendation history and preference storage.
//!
//! `SqliteRecommendationStore` is the local implementation of [`RecommendationStore`].
//! Two tables: `recommendation_history` (one row per showing, optional feedback) and
//! `user_preferences` (one row per user and key).

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::store::{
    validate_id, RecommendationRecord, RecommendationStore, ShownRecommendation, StoreError,
    StoreResult,
};
use crate::types::RecommendationKind;

const RECORD_COLUMNS: &str = "id, user_id, recommendation_id, recommendation_type, location_id, \
     weather_condition, temperature, timestamp, feedback";

/// SQLite-based recommendation store.
pub struct SqliteRecommendationStore {
    conn: Connection,
}

impl SqliteRecommendationStore {
    /// Open (or create) a store at the given path.
    ///
    /// Creates the database file and schema if they don't exist.
    pub fn new<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing and ephemeral sessions).
    pub fn in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> anyhow::Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS recommendation_history (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                recommendation_id TEXT NOT NULL,
                recommendation_type TEXT NOT NULL,
                location_id TEXT NOT NULL,
                weather_condition TEXT NOT NULL,
                temperature REAL NOT NULL,
                timestamp TEXT NOT NULL,
                feedback INTEGER NULL
            );

            CREATE INDEX IF NOT EXISTS idx_history_user_time
                ON recommendation_history(user_id, timestamp DESC);
            CREATE INDEX IF NOT EXISTS idx_history_user_rec
                ON recommendation_history(user_id, recommendation_id, timestamp DESC);

            CREATE TABLE IF NOT EXISTS user_preferences (
                user_id TEXT NOT NULL,
                preference_key TEXT NOT NULL,
                preference_value TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (user_id, preference_key)
            );
            "#,
        )?;
        Ok(())
    }

    /// Number of history rows (all users).
    pub fn history_count(&self) -> anyhow::Result<usize> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM recommendation_history", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn get_record(&self, id: &str) -> StoreResult<Option<RecommendationRecord>> {
        let sql = format!("SELECT {} FROM recommendation_history WHERE id = ?1", RECORD_COLUMNS);
        let raw = self
            .conn
            .query_row(&sql, params![id], RawRecord::from_row)
            .optional()
            .map_err(storage_err)?;

        raw.map(RawRecord::into_record).transpose()
    }
}

/// Fixed-width UTC timestamps so text ordering matches time ordering.
fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn storage_err(e: rusqlite::Error) -> StoreError {
    StoreError::storage(e.to_string())
}

/// Row as stored, before type conversion.
struct RawRecord {
    id: String,
    user_id: String,
    recommendation_id: String,
    recommendation_type: String,
    location_id: String,
    weather_condition: String,
    temperature: f64,
    timestamp: String,
    feedback: Option<i64>,
}

impl RawRecord {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            recommendation_id: row.get(2)?,
            recommendation_type: row.get(3)?,
            location_id: row.get(4)?,
            weather_condition: row.get(5)?,
            temperature: row.get(6)?,
            timestamp: row.get(7)?,
            feedback: row.get(8)?,
        })
    }

    fn into_record(self) -> StoreResult<RecommendationRecord> {
        let recommendation_type = RecommendationKind::parse(&self.recommendation_type).ok_or_else(|| {
            StoreError::storage(format!(
                "unknown recommendation type '{}' in record {}",
                self.recommendation_type, self.id
            ))
        })?;

        let timestamp = DateTime::parse_from_rfc3339(&self.timestamp)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                StoreError::storage(format!("bad timestamp in record {}: {}", self.id, e))
            })?;

        Ok(RecommendationRecord {
            id: self.id,
            user_id: self.user_id,
            recommendation_id: self.recommendation_id,
            recommendation_type,
            location_id: self.location_id,
            weather_condition: self.weather_condition,
            temperature: self.temperature,
            timestamp,
            feedback: self.feedback.map(|v| v != 0),
        })
    }
}

impl RecommendationStore for SqliteRecommendationStore {
    fn record_shown(&self, shown: &ShownRecommendation<'_>) -> StoreResult<RecommendationRecord> {
        validate_id("user_id", shown.user_id)?;
        validate_id("recommendation_id", shown.recommendation_id)?;

        let record = RecommendationRecord {
            id: Uuid::new_v4().to_string(),
            user_id: shown.user_id.to_string(),
            recommendation_id: shown.recommendation_id.to_string(),
            recommendation_type: shown.recommendation_type,
            location_id: shown.location_id.to_string(),
            weather_condition: shown.weather_condition.to_string(),
            temperature: shown.temperature,
            timestamp: Utc::now(),
            feedback: None,
        };

        self.conn
            .execute(
                r#"
                INSERT INTO recommendation_history
                    (id, user_id, recommendation_id, recommendation_type, location_id,
                     weather_condition, temperature, timestamp, feedback)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, NULL)
                "#,
                params![
                    record.id,
                    record.user_id,
                    record.recommendation_id,
                    record.recommendation_type.as_str(),
                    record.location_id,
                    record.weather_condition,
                    record.temperature,
                    format_timestamp(record.timestamp),
                ],
            )
            .map_err(storage_err)?;

        tracing::debug!(
            "Recorded {} recommendation {} shown to {}",
            record.recommendation_type,
            record.recommendation_id,
            record.user_id
        );
        Ok(record)
    }

    fn record_feedback(
        &self,
        user_id: &str,
        recommendation_id: &str,
        helpful: bool,
    ) -> StoreResult<RecommendationRecord> {
        validate_id("user_id", user_id)?;
        validate_id("recommendation_id", recommendation_id)?;

        let latest: Option<String> = self
            .conn
            .query_row(
                r#"
                SELECT id FROM recommendation_history
                WHERE user_id = ?1 AND recommendation_id = ?2
                ORDER BY timestamp DESC, rowid DESC
                LIMIT 1
                "#,
                params![user_id, recommendation_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(storage_err)?;

        let record_id = latest.ok_or_else(|| {
            StoreError::not_found(format!("{} for user {}", recommendation_id, user_id))
        })?;

        self.conn
            .execute(
                "UPDATE recommendation_history SET feedback = ?1 WHERE id = ?2",
                params![helpful as i32, record_id],
            )
            .map_err(storage_err)?;

        tracing::debug!("Saved feedback ({}) on record {}", helpful, record_id);

        self.get_record(&record_id)?
            .ok_or_else(|| StoreError::not_found(record_id))
    }

    fn history(&self, user_id: &str, limit: usize) -> StoreResult<Vec<RecommendationRecord>> {
        let sql = format!(
            "SELECT {} FROM recommendation_history
             WHERE user_id = ?1
             ORDER BY timestamp DESC, rowid DESC
             LIMIT ?2",
            RECORD_COLUMNS
        );
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let mut stmt = self.conn.prepare(&sql).map_err(storage_err)?;
        let rows = stmt
            .query_map(params![user_id, limit], RawRecord::from_row)
            .map_err(storage_err)?;

        let raw = rows.collect::<Result<Vec<_>, _>>().map_err(storage_err)?;
        raw.into_iter().map(RawRecord::into_record).collect()
    }

    fn load_preferences(&self, user_id: &str) -> StoreResult<HashMap<String, String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT preference_key, preference_value FROM user_preferences WHERE user_id = ?1")
            .map_err(storage_err)?;

        let rows = stmt
            .query_map(params![user_id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(storage_err)?;

        rows.collect::<Result<HashMap<_, _>, _>>().map_err(storage_err)
    }

    fn save_preference(&self, user_id: &str, key: &str, value: &str) -> StoreResult<()> {
        validate_id("user_id", user_id)?;
        validate_id("preference key", key)?;

        self.conn
            .execute(
                r#"
                INSERT INTO user_preferences (user_id, preference_key, preference_value, updated_at)
                VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT(user_id, preference_key)
                DO UPDATE SET preference_value = excluded.preference_value,
                              updated_at = excluded.updated_at
                "#,
                params![user_id, key, value, format_timestamp(Utc::now())],
            )
            .map_err(storage_err)?;

        tracing::debug!("Saved preference {} for {}", key, user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    fn create_test_store() -> SqliteRecommendationStore {
        SqliteRecommendationStore::in_memory().expect("Failed to create in-memory store")
    }

    fn shown<'a>(user_id: &'a str, recommendation_id: &'a str) -> ShownRecommendation<'a> {
        ShownRecommendation {
            user_id,
            recommendation_id,
            recommendation_type: RecommendationKind::Activity,
            location_id: "home",
            weather_condition: "Clear",
            temperature: 21.0,
        }
    }

    #[test]
    fn test_record_shown_and_history() {
        let store = create_test_store();

        let record = store.record_shown(&shown("user-1", "activity.run")).unwrap();
        assert_eq!(record.user_id, "user-1");
        assert_eq!(record.feedback, None);
        assert!(Uuid::parse_str(&record.id).is_ok());

        let history = store.history("user-1", 50).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, record.id);
        assert_eq!(history[0].recommendation_type, RecommendationKind::Activity);
        assert_eq!(history[0].temperature, 21.0);
        assert_eq!(store.history_count().unwrap(), 1);
    }

    #[test]
    fn test_history_newest_first_and_limited() {
        let store = create_test_store();

        for id in ["a", "b", "c", "d"] {
            store.record_shown(&shown("user-1", id)).unwrap();
        }
        store.record_shown(&shown("user-2", "other")).unwrap();

        let history = store.history("user-1", 3).unwrap();
        let ids: Vec<_> = history.iter().map(|r| r.recommendation_id.as_str()).collect();
        assert_eq!(ids, vec!["d", "c", "b"]);
        assert!(history.iter().all(|r| r.user_id == "user-1"));
    }

    #[test]
    fn test_feedback_updates_most_recent_showing_only() {
        let store = create_test_store();

        let first = store.record_shown(&shown("user-1", "activity.run")).unwrap();
        let second = store.record_shown(&shown("user-1", "activity.run")).unwrap();

        let updated = store.record_feedback("user-1", "activity.run", true).unwrap();
        assert_eq!(updated.id, second.id);
        assert_eq!(updated.feedback, Some(true));

        let history = store.history("user-1", 10).unwrap();
        let older = history.iter().find(|r| r.id == first.id).unwrap();
        assert_eq!(older.feedback, None);

        let flipped = store.record_feedback("user-1", "activity.run", false).unwrap();
        assert_eq!(flipped.id, second.id);
        assert_eq!(flipped.feedback, Some(false));
    }

    #[test]
    fn test_feedback_without_showing_is_not_found() {
        let store = create_test_store();
        store.record_shown(&shown("user-2", "activity.run")).unwrap();

        let result = store.record_feedback("user-1", "activity.run", true);
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_record_shown_rejects_empty_ids() {
        let store = create_test_store();
        assert!(matches!(
            store.record_shown(&shown("", "activity.run")),
            Err(StoreError::Validation(_))
        ));
        assert!(matches!(
            store.record_shown(&shown("user-1", " ")),
            Err(StoreError::Validation(_))
        ));
        assert_eq!(store.history_count().unwrap(), 0);
    }

    #[test]
    fn test_preferences_upsert() {
        let store = create_test_store();

        store.save_preference("user-1", "units", "celsius").unwrap();
        store.save_preference("user-1", "units", "fahrenheit").unwrap();
        store.save_preference("user-1", "outdoor_only", "true").unwrap();
        store.save_preference("user-2", "units", "celsius").unwrap();

        let prefs = store.load_preferences("user-1").unwrap();
        assert_eq!(prefs.len(), 2);
        assert_eq!(prefs.get("units").map(String::as_str), Some("fahrenheit"));
        assert_eq!(prefs.get("outdoor_only").map(String::as_str), Some("true"));

        assert!(store.load_preferences("nobody").unwrap().is_empty());
    }

    #[test]
    fn test_preference_key_required() {
        let store = create_test_store();
        assert!(matches!(
            store.save_preference("user-1", "", "x"),
            Err(StoreError::Validation(_))
        ));
    }

    #[test]
    fn test_corrupt_type_surfaces_storage_error() {
        let store = create_test_store();
        store
            .conn
            .execute(
                "INSERT INTO recommendation_history VALUES ('x', 'user-1', 'r', 'weather', 'home', 'Clear', 1.0, '2026-01-01T00:00:00.000000Z', NULL)",
                [],
            )
            .unwrap();

        assert!(matches!(store.history("user-1", 10), Err(StoreError::Storage(_))));
    }

    #[test]
    fn test_file_backed_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recommendations.db");

        {
            let store = SqliteRecommendationStore::new(&path).unwrap();
            store.record_shown(&shown("user-1", "activity.run")).unwrap();
            store.save_preference("user-1", "units", "celsius").unwrap();
        }

        let reopened = SqliteRecommendationStore::new(&path).unwrap();
        assert_eq!(reopened.history("user-1", 10).unwrap().len(), 1);
        assert_eq!(reopened.load_preferences("user-1").unwrap().len(), 1);
    }
}
