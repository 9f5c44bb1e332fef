//! Offline record storage using SQLite

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::RecordStore,
};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
    Row,
};
use std::path::{Path, PathBuf};
use tracing::debug;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS offline_records (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL,
        updated_at INTEGER NOT NULL
    )
"#;

/// Default location of the desktop database, under the user data directory.
pub fn default_database_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("tunestream")
        .join("library.db")
}

/// SQLite-backed [`RecordStore`]
pub struct SqliteRecordStore {
    pool: SqlitePool,
}

impl SqliteRecordStore {
    /// Opens (creating if needed) the database at `db_path`.
    pub async fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref();
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(BridgeError::Io)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(|e| BridgeError::DatabaseError(format!("Failed to connect to DB: {}", e)))?;

        let store = Self { pool };
        store.migrate().await?;
        debug!(path = ?db_path, "Initialized offline record store");
        Ok(store)
    }

    /// In-memory store for tests. A single connection keeps every query on
    /// the same database.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| BridgeError::DatabaseError(format!("Failed to connect to DB: {}", e)))?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| BridgeError::DatabaseError(format!("Failed to create table: {}", e)))?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn put(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO offline_records (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(chrono::Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await
        .map_err(|e| BridgeError::DatabaseError(format!("Failed to store record: {}", e)))?;

        debug!(key, "Stored record");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM offline_records WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| BridgeError::DatabaseError(format!("Failed to read record: {}", e)))?;

        Ok(row.map(|row| row.get::<String, _>("value")))
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM offline_records WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| BridgeError::DatabaseError(format!("Failed to delete record: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_all(&self) -> Result<Vec<(String, String)>> {
        let rows = sqlx::query("SELECT key, value FROM offline_records")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| BridgeError::DatabaseError(format!("Failed to list records: {}", e)))?;

        Ok(rows
            .into_iter()
            .map(|row| (row.get::<String, _>("key"), row.get::<String, _>("value")))
            .collect())
    }
}
