//! Key-value store trait for persisted client state.
//!
//! This module defines the [`KeyValueStore`] trait that both the response
//! cache and the watchlist store are built on. Backends live in the
//! `stockdeck-store` crate.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::error::Result;

/// Durable, string-keyed storage.
///
/// Implementations serialize conflicting writes to the same key; callers do
/// not coordinate beyond that.
#[async_trait]
pub trait KeyValueStore: Send + Sync + Debug {
    /// Returns the value stored at `key`, or `Ok(None)` if there is none.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` at `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing a missing key succeeds.
    async fn remove(&self, key: &str) -> Result<()>;

    /// Returns every stored key starting with `prefix`, in ascending order.
    async fn keys(&self, prefix: &str) -> Result<Vec<String>>;
}
