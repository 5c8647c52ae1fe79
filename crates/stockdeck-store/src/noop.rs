//! No-op store implementation.

use async_trait::async_trait;
use stockdeck_core::{KeyValueStore, Result};
use tracing::trace;

/// A no-op store that doesn't keep anything.
///
/// `get` always returns `Ok(None)` and writes always succeed. Useful for
/// disabling response caching.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopStore;

impl NoopStore {
    /// Create a new no-op store.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl KeyValueStore for NoopStore {
    async fn get(&self, _key: &str) -> Result<Option<String>> {
        trace!("NoopStore: get called, returning None");
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<()> {
        trace!("NoopStore: set called, doing nothing");
        Ok(())
    }

    async fn remove(&self, _key: &str) -> Result<()> {
        trace!("NoopStore: remove called, doing nothing");
        Ok(())
    }

    async fn keys(&self, _prefix: &str) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_store_forgets_writes() {
        let store = NoopStore::new();

        assert!(store.set("cache:TOP_GAINERS_LOSERS", "{}").await.is_ok());
        assert!(store.get("cache:TOP_GAINERS_LOSERS").await.unwrap().is_none());
        assert!(store.keys("cache:").await.unwrap().is_empty());
        assert!(store.remove("cache:TOP_GAINERS_LOSERS").await.is_ok());
    }
}
