use crate::models::{InterviewRecord, RecentInterviewSummary, User};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{migrate::MigrateDatabase, sqlite::SqlitePoolOptions, Row, Sqlite, SqlitePool};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

// Define the database schema using CREATE TABLE IF NOT EXISTS statements
const MIGRATIONS_SQL: &str = "
-- Records Table (Key-Value)
CREATE TABLE IF NOT EXISTS records (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL
);
";

const CURRENT_USER_KEY: &str = "currentUser";
const HISTORY_KEY_PREFIX: &str = "interviewHistory_";

const MAX_RECENT_INTERVIEWS: usize = 5;

/// String-keyed blob store the record layer is written against. Injected so
/// the controller and record store can be tested against [`MemoryStore`].
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;
    async fn keys(&self) -> Result<Vec<String>>;
}

/// In-memory store, primarily for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries().remove(key);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries().keys().cloned().collect())
    }
}

/// SQLite-backed store: one key-value table, full-rewrite-on-write values.
#[derive(Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connects to the database at `db_path`, creating the file and running
    /// migrations as needed.
    pub async fn connect(db_path: &Path) -> Result<Self> {
        // Ensure the parent directory exists
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .context("Failed to create database directory")?;
        }

        let db_url = format!("sqlite://{}?mode=rwc", db_path.to_string_lossy());
        log::info!("Connecting to database: {}", db_url);

        // Create the database file if it doesn't exist
        if !Sqlite::database_exists(&db_url).await.unwrap_or(false) {
            log::info!("Database file not found, creating...");
            Sqlite::create_database(&db_url)
                .await
                .context("Failed to create database")?;
        }

        Self::open(&db_url).await
    }

    /// Private in-memory database, handy in tests.
    pub async fn in_memory() -> Result<Self> {
        Self::open("sqlite::memory:").await
    }

    async fn open(db_url: &str) -> Result<Self> {
        // A single connection keeps an in-memory database coherent and is
        // plenty for the single-flow access pattern.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(db_url)
            .await
            .context("Failed to connect to SQLite database")?;

        log::info!("Running database migrations...");
        sqlx::query(MIGRATIONS_SQL)
            .execute(&pool)
            .await
            .context("Failed to run database migrations")?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM records WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to read record from database")?;
        Ok(row.map(|r| r.get::<String, _>("value")))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO records (key, value) VALUES (?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .context("Failed to write record to database")?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM records WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .context("Failed to delete record from database")?;
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT key FROM records ORDER BY key ASC")
            .fetch_all(&self.pool)
            .await
            .context("Failed to enumerate record keys")?;
        Ok(rows.into_iter().map(|r| r.get::<String, _>("key")).collect())
    }
}

/// Persistence of user identity and interview history over a [`KeyValueStore`].
///
/// Keys: the current user under `currentUser`, each user's history under
/// `interviewHistory_<name>`, values serialized JSON. History is append-only
/// per user; writes rewrite the full list.
pub struct RecordStore {
    store: Arc<dyn KeyValueStore>,
}

impl RecordStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Loads the persisted current user, if any. A blob that no longer
    /// parses is cleared and treated as absent.
    pub async fn load_current_user(&self) -> Result<Option<User>> {
        let Some(json) = self.store.get(CURRENT_USER_KEY).await? else {
            return Ok(None);
        };
        match serde_json::from_str::<User>(&json) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                log::warn!("Failed to parse stored user, clearing it: {}", e);
                self.store.remove(CURRENT_USER_KEY).await?;
                Ok(None)
            }
        }
    }

    pub async fn save_current_user(&self, user: &User) -> Result<()> {
        let json = serde_json::to_string(user).context("Failed to serialize current user")?;
        self.store.set(CURRENT_USER_KEY, &json).await
    }

    /// Clears the active pointer only; persisted history is untouched.
    pub async fn clear_current_user(&self) -> Result<()> {
        self.store.remove(CURRENT_USER_KEY).await
    }

    /// Returns the stored history for `user_name`, oldest first. Missing or
    /// malformed history reads as empty.
    pub async fn load_history(&self, user_name: &str) -> Result<Vec<InterviewRecord>> {
        let key = history_key(user_name);
        let Some(json) = self.store.get(&key).await? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str::<Vec<InterviewRecord>>(&json) {
            Ok(records) => Ok(records),
            Err(e) => {
                log::warn!("Malformed history for '{}', treating as empty: {}", user_name, e);
                Ok(Vec::new())
            }
        }
    }

    /// Appends `record` to its user's history and writes the list back in
    /// full; this store has no partial-update capability.
    pub async fn append_record(&self, record: &InterviewRecord) -> Result<()> {
        let key = history_key(&record.user_id);
        let mut history = self.load_history(&record.user_id).await?;
        history.push(record.clone());
        let json = serde_json::to_string(&history).context("Failed to serialize history")?;
        self.store.set(&key, &json).await?;
        log::info!(
            "Appended interview record {} for '{}' ({} total)",
            record.id,
            record.user_id,
            history.len()
        );
        Ok(())
    }

    /// Scans every stored history and projects the most recent record per
    /// user, newest first, capped at 5. Malformed entries are skipped
    /// (logged), never raised.
    pub async fn list_recent_summaries(&self) -> Result<Vec<RecentInterviewSummary>> {
        let mut summaries = Vec::new();
        for key in self.store.keys().await? {
            if !key.starts_with(HISTORY_KEY_PREFIX) {
                continue;
            }
            let Some(json) = self.store.get(&key).await? else {
                continue;
            };
            let records: Vec<InterviewRecord> = match serde_json::from_str(&json) {
                Ok(records) => records,
                Err(e) => {
                    log::warn!("Skipping unparseable history entry '{}': {}", key, e);
                    continue;
                }
            };
            let Some(latest) = records.iter().max_by_key(|r| r.timestamp) else {
                continue;
            };
            summaries.push(RecentInterviewSummary {
                user_name: latest.user_id.clone(),
                user_age_at_interview: latest.user_age_at_interview,
                last_overall_score: latest.overall_score,
                last_interview_timestamp: latest.timestamp,
            });
        }
        summaries.sort_by(|a, b| b.last_interview_timestamp.cmp(&a.last_interview_timestamp));
        summaries.truncate(MAX_RECENT_INTERVIEWS);
        Ok(summaries)
    }
}

fn history_key(user_name: &str) -> String {
    format!("{}{}", HISTORY_KEY_PREFIX, user_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChatMessage, DifficultyLevel, InterviewType};
    use chrono::{Duration, Utc};

    fn record_for(name: &str, age: u8, offset_minutes: i64, score: Option<u8>) -> InterviewRecord {
        InterviewRecord {
            id: format!("{}-{}", name, offset_minutes),
            user_id: name.to_string(),
            user_age_at_interview: age,
            interview_type: InterviewType::Coding,
            difficulty_level: DifficultyLevel::Easy,
            timestamp: Utc::now() + Duration::minutes(offset_minutes),
            messages: vec![ChatMessage::ai("Welcome"), ChatMessage::user("Hello")],
            final_summary_text: Some("Overall Score: 7/10".to_string()),
            overall_score: score,
        }
    }

    fn record_store() -> RecordStore {
        RecordStore::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn memory_store_roundtrip() {
        let store = MemoryStore::new();
        store.set("a", "1").await.unwrap();
        store.set("b", "2").await.unwrap();
        assert_eq!(store.get("a").await.unwrap().as_deref(), Some("1"));
        store.remove("a").await.unwrap();
        assert_eq!(store.get("a").await.unwrap(), None);
        assert_eq!(store.keys().await.unwrap(), vec!["b".to_string()]);
    }

    #[tokio::test]
    async fn sqlite_store_roundtrip() {
        let store = SqliteStore::in_memory().await.unwrap();
        store.set("k", "v1").await.unwrap();
        store.set("k", "v2").await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v2"));
        assert_eq!(store.keys().await.unwrap(), vec!["k".to_string()]);
        store.remove("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn current_user_save_load_clear() {
        let records = record_store();
        assert!(records.load_current_user().await.unwrap().is_none());

        let user = User { name: "Ada".to_string(), age: 28 };
        records.save_current_user(&user).await.unwrap();
        assert_eq!(records.load_current_user().await.unwrap(), Some(user));

        records.clear_current_user().await.unwrap();
        assert!(records.load_current_user().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn malformed_current_user_is_cleared() {
        let store = Arc::new(MemoryStore::new());
        store.set(CURRENT_USER_KEY, "{not json").await.unwrap();
        let records = RecordStore::new(store.clone());
        assert!(records.load_current_user().await.unwrap().is_none());
        // The bad blob is gone after the failed load.
        assert_eq!(store.get(CURRENT_USER_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn append_grows_history_in_order() {
        let records = record_store();
        records.append_record(&record_for("Ada", 28, 0, Some(7))).await.unwrap();
        records.append_record(&record_for("Ada", 28, 10, Some(9))).await.unwrap();

        let history = records.load_history("Ada").await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].id, "Ada-0");
        assert_eq!(history[1].id, "Ada-10");
        // Full transcript carried through persistence.
        assert_eq!(history[0].messages.len(), 2);
    }

    #[tokio::test]
    async fn summaries_are_capped_and_descending() {
        let records = record_store();
        for (i, name) in ["A", "B", "C", "D", "E", "F", "G"].iter().enumerate() {
            records
                .append_record(&record_for(name, 30, i as i64 * 10, Some(i as u8)))
                .await
                .unwrap();
        }

        let summaries = records.list_recent_summaries().await.unwrap();
        assert_eq!(summaries.len(), MAX_RECENT_INTERVIEWS);
        assert_eq!(summaries[0].user_name, "G");
        for pair in summaries.windows(2) {
            assert!(pair[0].last_interview_timestamp > pair[1].last_interview_timestamp);
        }
    }

    #[tokio::test]
    async fn summaries_use_latest_record_per_user_and_skip_malformed() {
        let store = Arc::new(MemoryStore::new());
        let records = RecordStore::new(store.clone());
        records.append_record(&record_for("Ada", 28, 0, Some(4))).await.unwrap();
        records.append_record(&record_for("Ada", 28, 30, Some(8))).await.unwrap();
        store.set("interviewHistory_Broken", "[{]").await.unwrap();

        let summaries = records.list_recent_summaries().await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].user_name, "Ada");
        assert_eq!(summaries[0].last_overall_score, Some(8));
    }

    #[tokio::test]
    async fn summary_projection_is_idempotent() {
        let records = record_store();
        records.append_record(&record_for("Ada", 28, 0, Some(7))).await.unwrap();
        records.append_record(&record_for("Bob", 35, 5, None)).await.unwrap();

        let first = records.list_recent_summaries().await.unwrap();
        let second = records.list_recent_summaries().await.unwrap();
        let names = |s: &[RecentInterviewSummary]| {
            s.iter().map(|x| x.user_name.clone()).collect::<Vec<_>>()
        };
        assert_eq!(names(&first), names(&second));
    }
}
