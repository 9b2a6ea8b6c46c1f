//! Key-value storage for the forecast cache
//!
//! Three backends selected once at startup by probing availability:
//! PostgreSQL, a directory of files, or process memory as the last resort.
//! Durability is best-effort; the forecast cache tolerates losing entries.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};

/// Minimal string key-value capability.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> AppResult<()>;

    /// Backend label for logging.
    fn backend_name(&self) -> &'static str;
}

/// In-memory store, the fallback of last resort.
#[derive(Default)]
pub struct MemoryKvStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| AppError::Storage("Key-value store lock poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| AppError::Storage("Key-value store lock poisoned".to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

/// One file per key under a cache directory.
pub struct FileKvStore {
    dir: PathBuf,
}

impl FileKvStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Keys map to filenames, so anything outside [A-Za-z0-9._-] is replaced.
    fn path_for(&self, key: &str) -> PathBuf {
        let sanitized: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{}.json", sanitized))
    }
}

#[async_trait]
impl KvStore for FileKvStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Storage(format!("Failed to read cache file: {}", e))),
        }
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to create cache dir: {}", e)))?;
        tokio::fs::write(self.path_for(key), value)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write cache file: {}", e)))
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}

/// PostgreSQL-backed store using a single upsert table.
pub struct PostgresKvStore {
    pool: PgPool,
}

impl PostgresKvStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl KvStore for PostgresKvStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let value = sqlx::query_scalar::<_, String>(
            "SELECT value FROM service_cache WHERE cache_key = $1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO service_cache (cache_key, value, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (cache_key)
            DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}

/// Pick the best available backend: database, then writable directory,
/// then memory. Runs once at startup; no runtime re-selection.
pub async fn select_kv_store(pool: Option<PgPool>, cache_dir: &Path) -> Arc<dyn KvStore> {
    if let Some(pool) = pool {
        match sqlx::query("SELECT 1").execute(&pool).await {
            Ok(_) => {
                tracing::info!("Forecast cache backed by PostgreSQL");
                return Arc::new(PostgresKvStore::new(pool));
            }
            Err(e) => {
                tracing::warn!("Database probe failed, trying file cache: {}", e);
            }
        }
    }

    let probe = cache_dir.join(".probe");
    let writable = tokio::fs::create_dir_all(cache_dir).await.is_ok()
        && tokio::fs::write(&probe, b"ok").await.is_ok();
    if writable {
        let _ = tokio::fs::remove_file(&probe).await;
        tracing::info!(dir = %cache_dir.display(), "Forecast cache backed by files");
        return Arc::new(FileKvStore::new(cache_dir));
    }

    tracing::warn!("No durable cache backend available, using in-memory store");
    Arc::new(MemoryKvStore::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemoryKvStore::new();
        assert_eq!(store.get("missing").await.unwrap(), None);

        store.set("k", "v1").await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v1"));

        store.set("k", "v2").await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v2"));
    }

    #[tokio::test]
    async fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKvStore::new(dir.path());

        assert_eq!(store.get("astral.daily_forecast.v1").await.unwrap(), None);
        store
            .set("astral.daily_forecast.v1", r#"{"forecast":"x"}"#)
            .await
            .unwrap();
        assert_eq!(
            store.get("astral.daily_forecast.v1").await.unwrap().as_deref(),
            Some(r#"{"forecast":"x"}"#)
        );
    }

    #[test]
    fn test_file_store_key_sanitization() {
        let store = FileKvStore::new("/tmp/cache");
        let path = store.path_for("a/b:c d");
        assert_eq!(path.file_name().unwrap().to_str().unwrap(), "a_b_c_d.json");
    }
}
