//! Response cache for fetched market data.
//!
//! This module defines [`Fingerprint`], the cache key derived from a request,
//! and [`ResponseCache`], which persists raw JSON payloads in a
//! [`KeyValueStore`]. Entries never expire; they are overwritten by the next
//! successful fetch of the same request.

use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::{endpoint::Endpoint, error::Result, store::KeyValueStore};

/// Prefix shared by every response cache key.
pub const CACHE_KEY_PREFIX: &str = "cache:";

/// Deterministic cache key for an `(endpoint, params)` request.
///
/// Parameters are sorted by key, then value, so insertion order never
/// changes the fingerprint.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Derives the fingerprint of a request.
    #[must_use]
    pub fn new<K: AsRef<str>, V: AsRef<str>>(endpoint: Endpoint, params: &[(K, V)]) -> Self {
        let mut pairs: Vec<(&str, &str)> = params
            .iter()
            .map(|(k, v)| (k.as_ref(), v.as_ref()))
            .collect();
        pairs.sort_unstable();

        let mut key = format!("{CACHE_KEY_PREFIX}{}", endpoint.function());
        if !pairs.is_empty() {
            let query = pairs
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join("&");
            key.push(':');
            key.push_str(&query);
        }
        Self(key)
    }

    /// Returns the fingerprint as a store key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Cache of raw provider responses keyed by [`Fingerprint`].
#[derive(Clone, Debug)]
pub struct ResponseCache {
    store: Arc<dyn KeyValueStore>,
}

impl ResponseCache {
    /// Creates a cache on top of `store`.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Returns the cached payload for `fingerprint`.
    ///
    /// An entry that is not valid JSON counts as a miss.
    ///
    /// # Errors
    /// Propagates store read failures.
    #[instrument(skip_all, fields(key = %fingerprint))]
    pub async fn get(&self, fingerprint: &Fingerprint) -> Result<Option<Value>> {
        let Some(raw) = self.store.get(fingerprint.as_str()).await? else {
            debug!("Cache miss");
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(value) => {
                debug!("Cache hit");
                Ok(Some(value))
            }
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable cache entry");
                Ok(None)
            }
        }
    }

    /// Stores `payload` under `fingerprint`, replacing any previous entry.
    ///
    /// # Errors
    /// Propagates serialization and store write failures.
    #[instrument(skip_all, fields(key = %fingerprint))]
    pub async fn put(&self, fingerprint: &Fingerprint, payload: &Value) -> Result<()> {
        let raw = serde_json::to_string(payload)?;
        self.store.set(fingerprint.as_str(), &raw).await?;
        debug!(bytes = raw.len(), "Cached response");
        Ok(())
    }

    /// Removes the entry for `fingerprint`.
    ///
    /// # Errors
    /// Propagates store failures.
    pub async fn evict(&self, fingerprint: &Fingerprint) -> Result<()> {
        self.store.remove(fingerprint.as_str()).await
    }

    /// Removes every cached response, returning how many were removed.
    ///
    /// # Errors
    /// Propagates store failures.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<usize> {
        let keys = self.store.keys(CACHE_KEY_PREFIX).await?;
        for key in &keys {
            self.store.remove(key).await?;
        }
        debug!("Cleared {} cached responses", keys.len());
        Ok(keys.len())
    }
}
