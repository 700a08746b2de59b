use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use singlish_core::models::InteractionRecord;
use sqlx::{Row, SqlitePool};

/// Aggregated view over recorded interactions, served by the analytics
/// endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    pub total_interactions: u64,
    pub unique_users: u64,
    pub avg_confidence: f64,
    pub avg_processing_time: f64,
    pub intent_distribution: Vec<IntentShare>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentShare {
    pub intent: String,
    pub count: u64,
    pub percentage: f64,
}

pub trait AnalyticsRepository: Send + Sync {
    async fn record_interaction(&self, record: &InteractionRecord) -> Result<()>;
    async fn performance_summary(&self) -> Result<AnalyticsSummary>;
}

pub trait CacheRepository: Send + Sync {
    async fn cache_get(&self, key: &str) -> Result<Option<String>>;
    async fn cache_set(&self, key: &str, value: &str, ttl_seconds: i64) -> Result<()>;
}

fn summarize(records: &[InteractionRecord]) -> AnalyticsSummary {
    let total = records.len() as u64;
    if total == 0 {
        return AnalyticsSummary {
            total_interactions: 0,
            unique_users: 0,
            avg_confidence: 0.0,
            avg_processing_time: 0.0,
            intent_distribution: Vec::new(),
        };
    }

    let mut users: Vec<&str> = records
        .iter()
        .filter_map(|record| record.user_id.as_deref())
        .collect();
    users.sort_unstable();
    users.dedup();

    let mut counts: HashMap<&str, u64> = HashMap::new();
    for record in records {
        *counts.entry(record.intent.as_str()).or_insert(0) += 1;
    }
    let mut intent_distribution: Vec<IntentShare> = counts
        .into_iter()
        .map(|(intent, count)| IntentShare {
            intent: intent.to_string(),
            count,
            percentage: count as f64 * 100.0 / total as f64,
        })
        .collect();
    intent_distribution.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.intent.cmp(&b.intent)));

    AnalyticsSummary {
        total_interactions: total,
        unique_users: users.len() as u64,
        avg_confidence: records.iter().map(|r| r.confidence as f64).sum::<f64>() / total as f64,
        avg_processing_time: records.iter().map(|r| r.processing_time).sum::<f64>()
            / total as f64,
        intent_distribution,
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    interactions: Arc<RwLock<Vec<InteractionRecord>>>,
    cache: Arc<RwLock<HashMap<String, (String, DateTime<Utc>)>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AnalyticsRepository for MemoryStore {
    async fn record_interaction(&self, record: &InteractionRecord) -> Result<()> {
        self.interactions.write().push(record.clone());
        Ok(())
    }

    async fn performance_summary(&self) -> Result<AnalyticsSummary> {
        Ok(summarize(&self.interactions.read()))
    }
}

impl CacheRepository for MemoryStore {
    async fn cache_get(&self, key: &str) -> Result<Option<String>> {
        let now = Utc::now();
        let mut cache = self.cache.write();
        match cache.get(key) {
            Some((value, expires_at)) if *expires_at > now => Ok(Some(value.clone())),
            Some(_) => {
                cache.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn cache_set(&self, key: &str, value: &str, ttl_seconds: i64) -> Result<()> {
        let expires_at = Utc::now() + Duration::seconds(ttl_seconds);
        self.cache
            .write()
            .insert(key.to_string(), (value.to_string(), expires_at));
        Ok(())
    }
}

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .with_context(|| format!("failed connecting to sqlite at {}", database_url))?;

        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS ml_interactions (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              user_id TEXT,
              session_id TEXT,
              message TEXT NOT NULL,
              intent TEXT NOT NULL,
              confidence REAL NOT NULL,
              response TEXT NOT NULL,
              processing_time REAL NOT NULL,
              created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS cache_entries (
              key TEXT PRIMARY KEY,
              value TEXT NOT NULL,
              expires_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

impl AnalyticsRepository for SqliteStore {
    async fn record_interaction(&self, record: &InteractionRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO ml_interactions
              (user_id, session_id, message, intent, confidence, response, processing_time, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&record.user_id)
        .bind(&record.session_id)
        .bind(&record.message)
        .bind(&record.intent)
        .bind(record.confidence as f64)
        .bind(&record.response)
        .bind(record.processing_time)
        .bind(record.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn performance_summary(&self) -> Result<AnalyticsSummary> {
        let totals = sqlx::query(
            r#"
            SELECT
              COUNT(*) AS total,
              COUNT(DISTINCT user_id) AS users,
              COALESCE(AVG(confidence), 0.0) AS avg_confidence,
              COALESCE(AVG(processing_time), 0.0) AS avg_processing_time
            FROM ml_interactions
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let total: i64 = totals.get("total");
        let rows = sqlx::query(
            r#"
            SELECT intent, COUNT(*) AS count
            FROM ml_interactions
            GROUP BY intent
            ORDER BY count DESC, intent ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let intent_distribution = rows
            .into_iter()
            .map(|row| {
                let count: i64 = row.get("count");
                IntentShare {
                    intent: row.get("intent"),
                    count: count as u64,
                    percentage: if total == 0 {
                        0.0
                    } else {
                        count as f64 * 100.0 / total as f64
                    },
                }
            })
            .collect();

        Ok(AnalyticsSummary {
            total_interactions: total as u64,
            unique_users: totals.get::<i64, _>("users") as u64,
            avg_confidence: totals.get("avg_confidence"),
            avg_processing_time: totals.get("avg_processing_time"),
            intent_distribution,
        })
    }
}

impl CacheRepository for SqliteStore {
    async fn cache_get(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query(
            r#"
            SELECT value FROM cache_entries
            WHERE key = ?1 AND expires_at > ?2
            "#,
        )
        .bind(key)
        .bind(Utc::now().to_rfc3339())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| row.get("value")))
    }

    async fn cache_set(&self, key: &str, value: &str, ttl_seconds: i64) -> Result<()> {
        let expires_at = Utc::now() + Duration::seconds(ttl_seconds);

        sqlx::query(
            r#"
            INSERT INTO cache_entries (key, value, expires_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
              value=excluded.value,
              expires_at=excluded.expires_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(expires_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[derive(Clone)]
pub enum Store {
    Memory(MemoryStore),
    Sqlite(SqliteStore),
}

impl Store {
    pub fn memory() -> Self {
        Self::Memory(MemoryStore::new())
    }

    pub async fn sqlite(database_url: &str) -> Result<Self> {
        let sqlite = SqliteStore::connect(database_url).await?;
        Ok(Self::Sqlite(sqlite))
    }
}

impl AnalyticsRepository for Store {
    async fn record_interaction(&self, record: &InteractionRecord) -> Result<()> {
        match self {
            Store::Memory(store) => store.record_interaction(record).await,
            Store::Sqlite(store) => store.record_interaction(record).await,
        }
    }

    async fn performance_summary(&self) -> Result<AnalyticsSummary> {
        match self {
            Store::Memory(store) => store.performance_summary().await,
            Store::Sqlite(store) => store.performance_summary().await,
        }
    }
}

impl CacheRepository for Store {
    async fn cache_get(&self, key: &str) -> Result<Option<String>> {
        match self {
            Store::Memory(store) => store.cache_get(key).await,
            Store::Sqlite(store) => store.cache_get(key).await,
        }
    }

    async fn cache_set(&self, key: &str, value: &str, ttl_seconds: i64) -> Result<()> {
        match self {
            Store::Memory(store) => store.cache_set(key, value, ttl_seconds).await,
            Store::Sqlite(store) => store.cache_set(key, value, ttl_seconds).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(user: Option<&str>, intent: &str, confidence: f32) -> InteractionRecord {
        InteractionRecord {
            user_id: user.map(ToString::to_string),
            session_id: None,
            message: "kohomada".to_string(),
            intent: intent.to_string(),
            confidence,
            response: "Ayubowan!".to_string(),
            processing_time: 0.01,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn memory_summary_aggregates_interactions() {
        let store = MemoryStore::new();
        store.record_interaction(&record(Some("a"), "greeting", 0.9)).await.unwrap();
        store.record_interaction(&record(Some("a"), "greeting", 0.7)).await.unwrap();
        store.record_interaction(&record(Some("b"), "thanks", 0.8)).await.unwrap();
        store.record_interaction(&record(None, "unknown", 0.0)).await.unwrap();

        let summary = store.performance_summary().await.unwrap();
        assert_eq!(summary.total_interactions, 4);
        assert_eq!(summary.unique_users, 2);
        assert!((summary.avg_confidence - 0.6).abs() < 1e-6);
        assert_eq!(summary.intent_distribution[0].intent, "greeting");
        assert_eq!(summary.intent_distribution[0].count, 2);
        assert!((summary.intent_distribution[0].percentage - 50.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn memory_summary_is_empty_without_interactions() {
        let summary = MemoryStore::new().performance_summary().await.unwrap();
        assert_eq!(summary.total_interactions, 0);
        assert_eq!(summary.avg_confidence, 0.0);
        assert!(summary.intent_distribution.is_empty());
    }

    #[tokio::test]
    async fn memory_cache_honors_ttl() {
        let store = MemoryStore::new();
        store.cache_set("predict:kohomada", "{}", 3600).await.unwrap();
        assert_eq!(
            store.cache_get("predict:kohomada").await.unwrap(),
            Some("{}".to_string())
        );

        store.cache_set("predict:stale", "{}", -1).await.unwrap();
        assert_eq!(store.cache_get("predict:stale").await.unwrap(), None);
        assert_eq!(store.cache_get("predict:missing").await.unwrap(), None);
    }
}
