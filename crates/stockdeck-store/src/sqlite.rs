//! SQLite-based store implementation.

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::Mutex;
use stockdeck_core::{Error, KeyValueStore, Result};
use tracing::{debug, instrument};

/// SQLite-based key-value store.
///
/// Values are kept in a single `kv_store` table, so state survives
/// application restarts. Writes to the same key replace each other.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a store at the given path.
    ///
    /// # Arguments
    /// * `path` - Path to the SQLite database file
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or schema creation fails.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path).map_err(storage)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Create an in-memory SQLite store.
    ///
    /// Useful for testing; data is lost when the store is dropped.
    ///
    /// # Errors
    /// Returns an error if schema creation fails.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(storage)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema.
    fn initialize_schema(&self) -> Result<()> {
        let conn = self.conn.lock().map_err(|e| Error::Storage(e.to_string()))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )
        .map_err(storage)?;

        debug!("SQLite store schema initialized");
        Ok(())
    }
}

fn storage(e: rusqlite::Error) -> Error {
    Error::Storage(e.to_string())
}

/// Escapes `LIKE` wildcards so `prefix` matches literally.
fn like_prefix(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for c in prefix.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().map_err(|e| Error::Storage(e.to_string()))?;

        conn.query_row(
            "SELECT value FROM kv_store WHERE key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        )
        .optional()
        .map_err(storage)
    }

    #[instrument(skip(self, value), fields(bytes = value.len()))]
    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let updated_at = Utc::now().to_rfc3339();
        let conn = self.conn.lock().map_err(|e| Error::Storage(e.to_string()))?;

        conn.execute(
            "INSERT OR REPLACE INTO kv_store (key, value, updated_at)
             VALUES (?1, ?2, ?3)",
            params![key, value, updated_at],
        )
        .map_err(storage)?;

        debug!("Stored value");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove(&self, key: &str) -> Result<()> {
        let conn = self.conn.lock().map_err(|e| Error::Storage(e.to_string()))?;

        let deleted = conn
            .execute("DELETE FROM kv_store WHERE key = ?1", params![key])
            .map_err(storage)?;

        if deleted > 0 {
            debug!("Removed value");
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        let conn = self.conn.lock().map_err(|e| Error::Storage(e.to_string()))?;

        let mut stmt = conn
            .prepare(
                "SELECT key FROM kv_store
                 WHERE key LIKE ?1 ESCAPE '\\'
                 ORDER BY key ASC",
            )
            .map_err(storage)?;

        let rows = stmt
            .query_map(params![like_prefix(prefix)], |row| row.get::<_, String>(0))
            .map_err(storage)?;

        let mut keys = Vec::new();
        for row in rows {
            let key = row.map_err(storage)?;
            // LIKE is case-insensitive for ASCII; keys are not.
            if key.starts_with(prefix) {
                keys.push(key);
            }
        }
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sqlite_store_initialization() {
        let store = SqliteStore::in_memory();
        assert!(store.is_ok());
    }

    #[tokio::test]
    async fn test_sqlite_store_round_trip() {
        let store = SqliteStore::in_memory().unwrap();

        // Initially no data
        assert!(store.get("watchlist-names-index").await.unwrap().is_none());

        store
            .set("watchlist-names-index", r#"["Tech","Energy"]"#)
            .await
            .unwrap();
        assert_eq!(
            store.get("watchlist-names-index").await.unwrap().as_deref(),
            Some(r#"["Tech","Energy"]"#)
        );

        store.set("watchlist-names-index", "[]").await.unwrap();
        assert_eq!(
            store.get("watchlist-names-index").await.unwrap().as_deref(),
            Some("[]")
        );

        store.remove("watchlist-names-index").await.unwrap();
        assert!(store.get("watchlist-names-index").await.unwrap().is_none());
        assert!(store.remove("watchlist-names-index").await.is_ok());
    }

    #[tokio::test]
    async fn test_sqlite_store_keys_match_prefix_literally() {
        let store = SqliteStore::in_memory().unwrap();
        store.set("cache:OVERVIEW:symbol=IBM", "{}").await.unwrap();
        store.set("cache:TOP_GAINERS_LOSERS", "{}").await.unwrap();
        store.set("CACHE:shouting", "{}").await.unwrap();
        store.set("cacheXother", "{}").await.unwrap();
        store.set("watchlist:my_list", "[]").await.unwrap();
        store.set("watchlist:myXlist", "[]").await.unwrap();

        assert_eq!(
            store.keys("cache:").await.unwrap(),
            vec!["cache:OVERVIEW:symbol=IBM", "cache:TOP_GAINERS_LOSERS"]
        );
        assert_eq!(
            store.keys("watchlist:my_").await.unwrap(),
            vec!["watchlist:my_list"]
        );
    }

    #[tokio::test]
    async fn test_sqlite_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stockdeck.db");

        {
            let store = SqliteStore::new(&path).unwrap();
            store.set("watchlist:Tech", r#"["AAPL","MSFT"]"#).await.unwrap();
        }

        let reopened = SqliteStore::new(&path).unwrap();
        assert_eq!(
            reopened.get("watchlist:Tech").await.unwrap().as_deref(),
            Some(r#"["AAPL","MSFT"]"#)
        );
    }
}
