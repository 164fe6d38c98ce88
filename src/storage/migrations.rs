//! Schema migrations for the SQLite key-value store.
//!
//! Migration files live in `migrations/` and are named `migration_NN_up.sql`, where `NN` is the
//! schema version the file upgrades the database to.

use anyhow::{bail, Context};
use sqlx::{Executor, SqlitePool};
use tracing::debug;

/// The schema version this build of the app expects.
pub(super) const CURRENT_VERSION: i32 = 1;

struct Migration {
    version: i32,
    up_sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    up_sql: include_str!("migrations/migration_01_up.sql"),
}];

/// Creates the `schema_version` table when missing and returns the version recorded in it.
pub(super) async fn version(pool: &SqlitePool) -> anyhow::Result<i32> {
    sqlx::query("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL)")
        .execute(pool)
        .await
        .context("Failed to create schema_version table")?;
    let row: (Option<i32>,) = sqlx::query_as("SELECT MAX(version) FROM schema_version")
        .fetch_one(pool)
        .await
        .context("Failed to query schema version")?;
    Ok(row.0.unwrap_or(0))
}

/// Runs every migration after `current_ver` up to and including `target_ver`, each in its own
/// transaction together with the `schema_version` update.
pub(super) async fn run(pool: &SqlitePool, current_ver: i32, target_ver: i32) -> anyhow::Result<()> {
    if current_ver > target_ver {
        bail!(
            "The database schema version {current_ver} is newer than this program supports \
            ({target_ver}). Is a newer version of gofinances available?"
        );
    }
    for version in (current_ver + 1)..=target_ver {
        let migration = MIGRATIONS
            .iter()
            .find(|m| m.version == version)
            .with_context(|| format!("Migration {version} not found"))?;
        debug!("Running migration {version:02}");

        let mut tx = pool
            .begin()
            .await
            .context("Failed to begin migration transaction")?;
        tx.execute(migration.up_sql)
            .await
            .context("Failed to execute migration SQL")?;
        sqlx::query("DELETE FROM schema_version")
            .execute(&mut *tx)
            .await
            .context("Failed to clear schema_version")?;
        sqlx::query("INSERT INTO schema_version (version) VALUES (?)")
            .bind(version)
            .execute(&mut *tx)
            .await
            .context("Failed to update schema_version")?;
        tx.commit()
            .await
            .context("Failed to commit migration transaction")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn pool() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_migrate_from_empty() {
        let pool = pool().await;
        assert_eq!(version(&pool).await.unwrap(), 0);
        run(&pool, 0, CURRENT_VERSION).await.unwrap();
        assert_eq!(version(&pool).await.unwrap(), CURRENT_VERSION);

        let row: (i32,) =
            sqlx::query_as("SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='kv'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(row.0, 1);
    }

    #[tokio::test]
    async fn test_migrate_is_noop_at_target() {
        let pool = pool().await;
        run(&pool, 0, 1).await.unwrap();
        run(&pool, 1, 1).await.unwrap();
        assert_eq!(version(&pool).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_newer_schema_is_rejected() {
        let pool = pool().await;
        let _ = version(&pool).await.unwrap();
        assert!(run(&pool, 2, 1).await.is_err());
    }

    #[tokio::test]
    async fn test_missing_migration() {
        let pool = pool().await;
        let _ = version(&pool).await.unwrap();
        run(&pool, 0, 1).await.unwrap();
        assert!(run(&pool, 1, 2).await.is_err());
    }
}
