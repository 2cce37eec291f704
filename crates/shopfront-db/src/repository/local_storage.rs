//! # Local Storage Repository
//!
//! String key → string value, last write wins.
//!
//! ## Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  set(k, v)   INSERT ... ON CONFLICT(key) DO UPDATE   (upsert)           │
//! │  get(k)      Some(v) | None                                             │
//! │  remove(k)   true if a row was deleted                                  │
//! │                                                                         │
//! │  Values are stored verbatim. Whoever reads them validates them:         │
//! │  a corrupt value is the reader's problem, never a storage error.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;

/// Repository for the `local_storage` table.
#[derive(Debug, Clone)]
pub struct LocalStorageRepository {
    pool: SqlitePool,
}

impl LocalStorageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        LocalStorageRepository { pool }
    }

    /// Reads the value stored under `key`.
    pub async fn get(&self, key: &str) -> DbResult<Option<String>> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM local_storage WHERE key = ?1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        debug!(key = %key, found = value.is_some(), "Local storage read");
        Ok(value)
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub async fn set(&self, key: &str, value: &str) -> DbResult<()> {
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO local_storage (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(now)
        .execute(&self.pool)
        .await?;

        debug!(key = %key, bytes = value.len(), "Local storage write");
        Ok(())
    }

    /// Deletes `key`. Returns false if it was not present.
    pub async fn remove(&self, key: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM local_storage WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists stored keys in alphabetical order.
    pub async fn keys(&self) -> DbResult<Vec<String>> {
        let keys: Vec<String> = sqlx::query_scalar("SELECT key FROM local_storage ORDER BY key")
            .fetch_all(&self.pool)
            .await?;
        Ok(keys)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig, CART_KEY};

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let repo = db().await.local_storage();
        assert_eq!(repo.get(CART_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_then_overwrite() {
        let repo = db().await.local_storage();

        repo.set(CART_KEY, "[]").await.unwrap();
        assert_eq!(repo.get(CART_KEY).await.unwrap().as_deref(), Some("[]"));

        repo.set(CART_KEY, "[{\"id\":\"P1\"}]").await.unwrap();
        assert_eq!(
            repo.get(CART_KEY).await.unwrap().as_deref(),
            Some("[{\"id\":\"P1\"}]")
        );
        assert_eq!(repo.keys().await.unwrap(), vec![CART_KEY.to_string()]);
    }

    #[tokio::test]
    async fn test_corrupt_value_stored_verbatim() {
        let repo = db().await.local_storage();
        repo.set(CART_KEY, "{oops").await.unwrap();
        assert_eq!(repo.get(CART_KEY).await.unwrap().as_deref(), Some("{oops"));
    }

    #[tokio::test]
    async fn test_remove() {
        let repo = db().await.local_storage();
        repo.set("a", "1").await.unwrap();

        assert!(repo.remove("a").await.unwrap());
        assert!(!repo.remove("a").await.unwrap());
        assert_eq!(repo.get("a").await.unwrap(), None);
    }
}
