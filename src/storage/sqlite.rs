//! Implements the `Storage` trait on top of a single SQLite table.

use crate::storage::{migrations, Storage};
use anyhow::Context;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::PathBuf;
use tracing::{debug, trace};

/// A `Storage` backed by the `kv` table of a SQLite file.
#[derive(Debug, Clone)]
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Opens the SQLite file at `path`, creating it if needed, and migrates its schema.
    pub async fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .with_context(|| format!("Unable to open the SQLite store at {}", path.display()))?;

        let current = migrations::version(&pool).await?;
        migrations::run(&pool, current, migrations::CURRENT_VERSION)
            .await
            .context("Unable to migrate the SQLite store")?;
        debug!("Opened storage at {}", path.display());

        Ok(Self { pool })
    }
}

#[async_trait::async_trait]
impl Storage for SqliteStorage {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        trace!("get {key}");
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM kv WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Failed to read key '{key}'"))?;
        Ok(row.map(|(value,)| value))
    }

    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        trace!("set {key}");
        sqlx::query(
            "INSERT INTO kv (key, value) VALUES (?, ?) \
            ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to write key '{key}'"))?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> anyhow::Result<()> {
        trace!("remove {key}");
        sqlx::query("DELETE FROM kv WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to remove key '{key}'"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_get_set_remove() {
        let dir = TempDir::new().unwrap();
        let storage = SqliteStorage::open(dir.path().join("store.sqlite"))
            .await
            .unwrap();

        assert_eq!(storage.get("a").await.unwrap(), None);
        storage.set("a", "1").await.unwrap();
        assert_eq!(storage.get("a").await.unwrap().as_deref(), Some("1"));
        storage.set("a", "2").await.unwrap();
        assert_eq!(storage.get("a").await.unwrap().as_deref(), Some("2"));
        storage.remove("a").await.unwrap();
        assert_eq!(storage.get("a").await.unwrap(), None);
        storage.remove("a").await.unwrap();
    }

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.sqlite");
        {
            let storage = SqliteStorage::open(&path).await.unwrap();
            storage.set("@gofinances:user", "{}").await.unwrap();
            storage.pool.close().await;
        }
        let storage = SqliteStorage::open(&path).await.unwrap();
        assert_eq!(
            storage.get("@gofinances:user").await.unwrap().as_deref(),
            Some("{}")
        );
    }
}
