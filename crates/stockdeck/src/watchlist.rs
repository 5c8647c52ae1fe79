//! Named watchlists persisted in a [`KeyValueStore`].
//!
//! Layout:
//!
//! - `watchlist-names-index` holds a JSON array of watchlist names in
//!   creation order.
//! - `watchlist:<name>` holds a JSON array of canonical tickers.
//!
//! A name in the index whose list is missing reads as empty, so a crash
//! between the two writes of [`WatchlistStore::create`] is harmless.

use std::sync::Arc;

use futures::future::try_join_all;
use tracing::{debug, instrument, warn};

use stockdeck_core::{KeyValueStore, Result, Symbol, Watchlist};

/// Key of the ordered list of watchlist names.
pub const NAMES_INDEX_KEY: &str = "watchlist-names-index";

/// Prefix of per-watchlist ticker keys.
pub const WATCHLIST_KEY_PREFIX: &str = "watchlist:";

/// Returns the key holding the tickers of watchlist `name`.
#[must_use]
pub fn watchlist_key(name: &str) -> String {
    format!("{WATCHLIST_KEY_PREFIX}{name}")
}

/// Watchlist operations over a shared store.
#[derive(Debug, Clone)]
pub struct WatchlistStore {
    store: Arc<dyn KeyValueStore>,
}

impl WatchlistStore {
    /// Create a watchlist store over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Returns watchlist names in creation order.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read.
    pub async fn names(&self) -> Result<Vec<String>> {
        self.read_list(NAMES_INDEX_KEY).await
    }

    /// Returns the tickers of watchlist `name`, empty if it has none.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read.
    pub async fn tickers(&self, name: &str) -> Result<Vec<String>> {
        self.read_list(&watchlist_key(name)).await
    }

    /// Returns every watchlist with its tickers, in index order.
    ///
    /// Ticker lists are read concurrently.
    ///
    /// # Errors
    /// Returns an error if any read fails.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Watchlist>> {
        let names = self.names().await?;
        let tickers = try_join_all(names.iter().map(|name| self.tickers(name))).await?;

        Ok(names
            .into_iter()
            .zip(tickers)
            .map(|(name, tickers)| Watchlist::new(name, tickers))
            .collect())
    }

    /// Creates an empty watchlist named `name` (trimmed).
    ///
    /// Returns `false` without writing when the trimmed name is empty or
    /// already exists.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read or written.
    #[instrument(skip(self))]
    pub async fn create(&self, name: &str) -> Result<bool> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(false);
        }

        let mut names = self.names().await?;
        if names.iter().any(|n| n == name) {
            debug!("Watchlist already exists");
            return Ok(false);
        }
        names.push(name.to_string());

        let key = watchlist_key(name);
        futures::try_join!(
            self.write_list(NAMES_INDEX_KEY, &names),
            self.write_list(&key, &[]),
        )?;
        debug!("Created watchlist");
        Ok(true)
    }

    /// Deletes watchlist `name` and its tickers. Unknown names succeed.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read or written.
    #[instrument(skip(self))]
    pub async fn delete(&self, name: &str) -> Result<()> {
        let mut names = self.names().await?;
        names.retain(|n| n != name);

        let key = watchlist_key(name);
        futures::try_join!(
            self.write_list(NAMES_INDEX_KEY, &names),
            self.store.remove(&key),
        )?;
        debug!("Deleted watchlist");
        Ok(())
    }

    /// Appends `ticker` (canonicalized) to watchlist `name`.
    ///
    /// Returns `false` without writing when the ticker is blank, already
    /// present, or the watchlist does not exist.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read or written.
    #[instrument(skip(self))]
    pub async fn add_ticker(&self, name: &str, ticker: &str) -> Result<bool> {
        let symbol = Symbol::new(ticker);
        if symbol.is_empty() {
            return Ok(false);
        }

        if !self.names().await?.iter().any(|n| n == name) {
            debug!("Watchlist does not exist");
            return Ok(false);
        }

        let mut tickers = self.tickers(name).await?;
        if tickers.iter().any(|t| t == symbol.as_str()) {
            return Ok(false);
        }
        tickers.push(symbol.into_inner());

        self.write_list(&watchlist_key(name), &tickers).await?;
        Ok(true)
    }

    /// Removes `ticker` (canonicalized) from watchlist `name`.
    ///
    /// Returns `false` without writing when the ticker was not present.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read or written.
    #[instrument(skip(self))]
    pub async fn remove_ticker(&self, name: &str, ticker: &str) -> Result<bool> {
        let symbol = Symbol::new(ticker);
        let mut tickers = self.tickers(name).await?;

        let before = tickers.len();
        tickers.retain(|t| t != symbol.as_str());
        if tickers.len() == before {
            return Ok(false);
        }

        self.write_list(&watchlist_key(name), &tickers).await?;
        Ok(true)
    }

    /// Returns true if any watchlist contains `ticker` (canonicalized).
    ///
    /// # Errors
    /// Returns an error if the store cannot be read.
    pub async fn is_in_watchlist(&self, ticker: &str) -> Result<bool> {
        let symbol = Symbol::new(ticker);
        for name in self.names().await? {
            if self.tickers(&name).await?.iter().any(|t| t == symbol.as_str()) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Returns the names of watchlists containing `ticker`, in index order.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read.
    pub async fn list_containing(&self, ticker: &str) -> Result<Vec<String>> {
        let symbol = Symbol::new(ticker);
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|w| w.contains(symbol.as_str()))
            .map(|w| w.name)
            .collect())
    }

    async fn read_list(&self, key: &str) -> Result<Vec<String>> {
        let Some(raw) = self.store.get(key).await? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str(&raw) {
            Ok(list) => Ok(list),
            Err(e) => {
                warn!(key, error = %e, "Corrupt watchlist entry, treating as empty");
                Ok(Vec::new())
            }
        }
    }

    async fn write_list(&self, key: &str, list: &[String]) -> Result<()> {
        let raw = serde_json::to_string(list)?;
        self.store.set(key, &raw).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use stockdeck_core::Error;
    use stockdeck_store::InMemoryStore;

    fn setup() -> (Arc<InMemoryStore>, WatchlistStore) {
        let store = Arc::new(InMemoryStore::new());
        (store.clone(), WatchlistStore::new(store))
    }

    /// Store whose reads and writes always fail.
    #[derive(Debug)]
    struct BrokenStore;

    #[async_trait]
    impl KeyValueStore for BrokenStore {
        async fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(Error::Storage("disk unavailable".to_string()))
        }

        async fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(Error::Storage("disk unavailable".to_string()))
        }

        async fn remove(&self, _key: &str) -> Result<()> {
            Err(Error::Storage("disk unavailable".to_string()))
        }

        async fn keys(&self, _prefix: &str) -> Result<Vec<String>> {
            Err(Error::Storage("disk unavailable".to_string()))
        }
    }

    #[tokio::test]
    async fn test_empty_store_has_no_watchlists() {
        let (_, watchlists) = setup();
        assert!(watchlists.list().await.unwrap().is_empty());
        assert!(watchlists.tickers("Tech").await.unwrap().is_empty());
        assert!(!watchlists.is_in_watchlist("AAPL").await.unwrap());
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let (store, watchlists) = setup();

        assert!(watchlists.create("  Tech ").await.unwrap());
        assert!(watchlists.create("Energy").await.unwrap());

        let lists = watchlists.list().await.unwrap();
        assert_eq!(
            lists,
            vec![Watchlist::new("Tech", vec![]), Watchlist::new("Energy", vec![])]
        );
        assert_eq!(
            store.get(NAMES_INDEX_KEY).await.unwrap().as_deref(),
            Some(r#"["Tech","Energy"]"#)
        );
        assert_eq!(store.get("watchlist:Tech").await.unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_create_rejects_blank_and_duplicate() {
        let (store, watchlists) = setup();

        assert!(!watchlists.create("   ").await.unwrap());
        assert!(store.is_empty().await);

        assert!(watchlists.create("Tech").await.unwrap());
        watchlists.add_ticker("Tech", "AAPL").await.unwrap();
        assert!(!watchlists.create("Tech ").await.unwrap());

        // Existing tickers are untouched.
        assert_eq!(watchlists.tickers("Tech").await.unwrap(), vec!["AAPL"]);
        assert_eq!(watchlists.names().await.unwrap(), vec!["Tech"]);
    }

    #[tokio::test]
    async fn test_add_ticker_canonicalizes_and_dedups() {
        let (_, watchlists) = setup();
        watchlists.create("Tech").await.unwrap();

        assert!(watchlists.add_ticker("Tech", " aapl ").await.unwrap());
        assert!(watchlists.add_ticker("Tech", "msft").await.unwrap());
        assert!(!watchlists.add_ticker("Tech", "AAPL").await.unwrap());
        assert!(!watchlists.add_ticker("Tech", "  ").await.unwrap());

        assert_eq!(watchlists.tickers("Tech").await.unwrap(), vec!["AAPL", "MSFT"]);
    }

    #[tokio::test]
    async fn test_add_ticker_to_missing_watchlist_is_noop() {
        let (store, watchlists) = setup();

        assert!(!watchlists.add_ticker("Ghost", "AAPL").await.unwrap());
        assert!(store.get("watchlist:Ghost").await.unwrap().is_none());

        // Deleted lists stay deleted.
        watchlists.create("Tech").await.unwrap();
        watchlists.delete("Tech").await.unwrap();
        assert!(!watchlists.add_ticker("Tech", "AAPL").await.unwrap());
        assert!(store.keys(WATCHLIST_KEY_PREFIX).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_ticker() {
        let (store, watchlists) = setup();
        watchlists.create("Tech").await.unwrap();
        watchlists.add_ticker("Tech", "AAPL").await.unwrap();
        watchlists.add_ticker("Tech", "MSFT").await.unwrap();

        assert!(watchlists.remove_ticker("Tech", "aapl").await.unwrap());
        assert_eq!(watchlists.tickers("Tech").await.unwrap(), vec!["MSFT"]);

        let written = store.written_at("watchlist:Tech").await;
        assert!(!watchlists.remove_ticker("Tech", "NVDA").await.unwrap());
        assert!(!watchlists.remove_ticker("Ghost", "MSFT").await.unwrap());
        assert_eq!(store.written_at("watchlist:Tech").await, written);
        assert!(store.get("watchlist:Ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete() {
        let (store, watchlists) = setup();
        watchlists.create("Tech").await.unwrap();
        watchlists.create("Energy").await.unwrap();
        watchlists.add_ticker("Tech", "AAPL").await.unwrap();

        watchlists.delete("Tech").await.unwrap();

        assert_eq!(watchlists.names().await.unwrap(), vec!["Energy"]);
        assert!(store.get("watchlist:Tech").await.unwrap().is_none());
        assert!(!watchlists.is_in_watchlist("AAPL").await.unwrap());

        // Unknown names succeed silently.
        watchlists.delete("Nope").await.unwrap();
        assert_eq!(watchlists.names().await.unwrap(), vec!["Energy"]);
    }

    #[tokio::test]
    async fn test_membership_queries() {
        let (_, watchlists) = setup();
        for name in ["Tech", "Dividends", "Energy"] {
            watchlists.create(name).await.unwrap();
        }
        watchlists.add_ticker("Tech", "MSFT").await.unwrap();
        watchlists.add_ticker("Dividends", "XOM").await.unwrap();
        watchlists.add_ticker("Dividends", "MSFT").await.unwrap();
        watchlists.add_ticker("Energy", "XOM").await.unwrap();

        assert!(watchlists.is_in_watchlist("msft").await.unwrap());
        assert!(!watchlists.is_in_watchlist("NVDA").await.unwrap());
        assert_eq!(
            watchlists.list_containing("MSFT").await.unwrap(),
            vec!["Tech", "Dividends"]
        );
        assert_eq!(
            watchlists.list_containing(" xom").await.unwrap(),
            vec!["Dividends", "Energy"]
        );
        assert!(watchlists.list_containing("NVDA").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_or_corrupt_entries_read_as_empty() {
        let store = Arc::new(InMemoryStore::with_entries([
            (NAMES_INDEX_KEY, r#"["Tech","Orphan"]"#),
            ("watchlist:Tech", "not json"),
        ]));
        let watchlists = WatchlistStore::new(store);

        let lists = watchlists.list().await.unwrap();
        assert_eq!(
            lists,
            vec![Watchlist::new("Tech", vec![]), Watchlist::new("Orphan", vec![])]
        );

        // A corrupt list is replaced on the next write.
        assert!(watchlists.add_ticker("Tech", "AAPL").await.unwrap());
        assert_eq!(watchlists.tickers("Tech").await.unwrap(), vec!["AAPL"]);
    }

    #[tokio::test]
    async fn test_corrupt_index_reads_as_empty() {
        let store = Arc::new(InMemoryStore::with_entries([(NAMES_INDEX_KEY, "{")]));
        let watchlists = WatchlistStore::new(store);

        assert!(watchlists.names().await.unwrap().is_empty());
        assert!(watchlists.create("Tech").await.unwrap());
        assert_eq!(watchlists.names().await.unwrap(), vec!["Tech"]);
    }

    #[tokio::test]
    async fn test_store_errors_propagate() {
        let watchlists = WatchlistStore::new(Arc::new(BrokenStore));

        let err = watchlists.list().await.unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
        assert!(watchlists.create("Tech").await.is_err());
        assert!(watchlists.delete("Tech").await.is_err());
        assert!(watchlists.add_ticker("Tech", "AAPL").await.is_err());
        assert!(watchlists.remove_ticker("Tech", "AAPL").await.is_err());
        assert!(watchlists.is_in_watchlist("AAPL").await.is_err());
        assert!(watchlists.list_containing("AAPL").await.is_err());
    }

    #[tokio::test]
    async fn test_concurrent_clones_share_store() {
        let (_, watchlists) = setup();
        let other = watchlists.clone();

        watchlists.create("Tech").await.unwrap();
        assert!(other.add_ticker("Tech", "AAPL").await.unwrap());
        assert!(watchlists.is_in_watchlist("AAPL").await.unwrap());
    }
}
