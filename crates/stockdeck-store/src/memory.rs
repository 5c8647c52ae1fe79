//! In-memory store implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use stockdeck_core::{KeyValueStore, Result};
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// Stored value with the time it was last written.
#[derive(Debug, Clone)]
struct Entry {
    value: String,
    written_at: DateTime<Utc>,
}

/// Simple in-memory store for testing and previews.
///
/// Data lives in a `RwLock`-protected `BTreeMap` and is lost when the store
/// is dropped.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: RwLock<BTreeMap<String, Entry>>,
}

impl InMemoryStore {
    /// Create a new empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `entries`.
    #[must_use]
    pub fn with_entries<K: Into<String>, V: Into<String>>(
        entries: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        let now = Utc::now();
        let entries = entries
            .into_iter()
            .map(|(k, v)| {
                (
                    k.into(),
                    Entry {
                        value: v.into(),
                        written_at: now,
                    },
                )
            })
            .collect();
        Self {
            entries: RwLock::new(entries),
        }
    }

    /// Returns the number of stored keys.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns true if nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Returns when `key` was last written.
    pub async fn written_at(&self, key: &str) -> Option<DateTime<Utc>> {
        self.entries.read().await.get(key).map(|e| e.written_at)
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).map(|e| e.value.clone()))
    }

    #[instrument(skip(self, value), fields(bytes = value.len()))]
    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                written_at: Utc::now(),
            },
        );
        debug!("Stored value");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove(&self, key: &str) -> Result<()> {
        if self.entries.write().await.remove(key).is_some() {
            debug!("Removed value");
        }
        Ok(())
    }

    async fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        let entries = self.entries.read().await;
        Ok(entries
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, _)| k.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = InMemoryStore::new();

        // Initially no data
        assert!(store.get("watchlist:Tech").await.unwrap().is_none());

        store.set("watchlist:Tech", r#"["AAPL"]"#).await.unwrap();
        assert_eq!(
            store.get("watchlist:Tech").await.unwrap().as_deref(),
            Some(r#"["AAPL"]"#)
        );
        assert!(store.written_at("watchlist:Tech").await.is_some());

        // Overwrite wins
        store.set("watchlist:Tech", "[]").await.unwrap();
        assert_eq!(store.get("watchlist:Tech").await.unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_memory_store_remove_missing_key() {
        let store = InMemoryStore::new();
        assert!(store.remove("nothing-here").await.is_ok());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_memory_store_keys_by_prefix() {
        let store = InMemoryStore::with_entries([
            ("cache:OVERVIEW:symbol=IBM", "{}"),
            ("cache:TOP_GAINERS_LOSERS", "{}"),
            ("watchlist-names-index", "[]"),
            ("watchlist:Tech", "[]"),
        ]);

        assert_eq!(store.len().await, 4);
        assert_eq!(
            store.keys("cache:").await.unwrap(),
            vec!["cache:OVERVIEW:symbol=IBM", "cache:TOP_GAINERS_LOSERS"]
        );
        assert_eq!(store.keys("watchlist:").await.unwrap(), vec!["watchlist:Tech"]);
        assert_eq!(store.keys("").await.unwrap().len(), 4);
    }
}
