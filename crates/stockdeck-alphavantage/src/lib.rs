#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/stockdeck/stockdeck/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Alpha Vantage market data client.
//!
//! This crate implements the stockdeck-core provider traits for the
//! [Alpha Vantage](https://www.alphavantage.co/) API.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use stockdeck_alphavantage::{AlphaVantageClient, AlphaVantageConfig};
//! use stockdeck_core::{Endpoint, MarketDataProvider, Symbol};
//! use stockdeck_store::SqliteStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(SqliteStore::new("stockdeck.db")?);
//!     let client = AlphaVantageClient::new(AlphaVantageConfig::from_env(), store);
//!
//!     let movers = client.top_gainers_losers().await;
//!     let overview = client.overview(&Symbol::new("ibm")).await;
//!     let raw = client.fetch(Endpoint::SymbolSearch, &[("keywords", "tesco")]).await;
//!
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use rand::Rng;
use reqwest::Client;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use stockdeck_core::{
    DataProvider, Endpoint, Error, Fingerprint, KeyValueStore, MarketDataProvider, Payload,
    ResponseCache, Result, ResultEnvelope, SchemaValidationError, schema,
};
use tracing::{debug, instrument, warn};

/// Default Alpha Vantage host.
const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co";

/// Path of the single query endpoint.
const QUERY_PATH: &str = "/query";

/// Environment variable holding the comma-separated API key pool.
pub const API_KEY_VAR: &str = "ALPHAVANTAGE_API_KEY";

/// Environment variable overriding the provider host.
pub const BASE_URL_VAR: &str = "ALPHAVANTAGE_BASE_URL";

/// Message used when a transport failure carries no text of its own.
const UNKNOWN_ERROR: &str = "Unknown error occurred";

/// Connection settings for [`AlphaVantageClient`].
#[derive(Clone)]
pub struct AlphaVantageConfig {
    api_keys: Option<String>,
    base_url: String,
}

impl fmt::Debug for AlphaVantageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlphaVantageConfig")
            .field("api_keys", &self.api_keys.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl Default for AlphaVantageConfig {
    fn default() -> Self {
        Self {
            api_keys: None,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl AlphaVantageConfig {
    /// Create a config with no API key and the default host.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the config from `ALPHAVANTAGE_API_KEY` and `ALPHAVANTAGE_BASE_URL`.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(keys) = std::env::var(API_KEY_VAR) {
            config.api_keys = Some(keys);
        }
        if let Ok(base_url) = std::env::var(BASE_URL_VAR) {
            config = config.with_base_url(base_url);
        }
        config
    }

    /// Set the comma-separated API key pool.
    #[must_use]
    pub fn with_api_keys(mut self, keys: impl Into<String>) -> Self {
        self.api_keys = Some(keys.into());
        self
    }

    /// Set the provider host, e.g. `https://www.alphavantage.co`.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Returns true if a non-empty key pool is configured.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.api_keys.as_deref().is_some_and(|k| !k.is_empty())
    }

    /// Returns the provider host.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Pick one key uniformly at random from the pool.
    ///
    /// Returns `None` when no key is configured. Entries are trimmed; a
    /// blank entry is still sent as an empty key.
    fn select_api_key(&self) -> Option<String> {
        let pool = self.api_keys.as_deref().filter(|k| !k.is_empty())?;
        let keys: Vec<&str> = pool.split(',').map(str::trim).collect();
        let index = rand::thread_rng().gen_range(0..keys.len());
        Some(keys.get(index).copied().unwrap_or_default().to_string())
    }
}

/// Alpha Vantage market data client.
///
/// Single entry point for all market-data reads:
/// - Top gainers/losers and most active tickers
/// - Symbol search
/// - Company overview
/// - Intraday, daily, weekly and monthly time series
///
/// Responses are cached in the injected [`KeyValueStore`] and validated
/// against the schema registry both on the way in and on the way out.
#[derive(Clone)]
pub struct AlphaVantageClient {
    client: Client,
    config: AlphaVantageConfig,
    cache: ResponseCache,
}

impl fmt::Debug for AlphaVantageClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlphaVantageClient")
            .field("config", &self.config)
            .finish()
    }
}

impl AlphaVantageClient {
    /// Create a client caching responses in `store`.
    #[must_use]
    pub fn new(config: AlphaVantageConfig, store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_client(Client::new(), config, store)
    }

    /// Create a client with a custom HTTP client.
    #[must_use]
    pub fn with_client(
        client: Client,
        config: AlphaVantageConfig,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            client,
            config,
            cache: ResponseCache::new(store),
        }
    }

    /// Create a client configured from the environment.
    #[must_use]
    pub fn from_env(store: Arc<dyn KeyValueStore>) -> Self {
        Self::new(AlphaVantageConfig::from_env(), store)
    }

    /// Returns the response cache backing this client.
    #[must_use]
    pub const fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Build the query URL.
    fn url(&self) -> String {
        format!("{}{QUERY_PATH}", self.config.base_url)
    }

    /// Fetch `endpoint` with `params`.
    ///
    /// A cached payload that still validates is returned immediately. A miss
    /// goes to the network with a randomly selected API key; a valid response
    /// is cached before being returned. Never fails outright: errors are
    /// reported in the envelope.
    #[instrument(skip(self, params), fields(endpoint = %endpoint))]
    pub async fn fetch(
        &self,
        endpoint: Endpoint,
        params: &[(&str, &str)],
    ) -> ResultEnvelope<Payload> {
        let fingerprint = Fingerprint::new(endpoint, params);

        if let Some(payload) = self.cached(endpoint, &fingerprint).await {
            return ResultEnvelope::cached(payload);
        }

        let Some(api_key) = self.config.select_api_key() else {
            warn!("No API key configured");
            return Error::NotConfigured.into();
        };

        let value = match self.request(endpoint, params, &api_key).await {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Request failed");
                return e.into();
            }
        };

        let payload = match schema::validate(endpoint, &value) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "Response failed validation");
                return Error::from(e).into();
            }
        };

        if let Err(e) = self.cache.put(&fingerprint, &value).await {
            warn!(error = %e, "Failed to cache response");
        }

        ResultEnvelope::fetched(payload)
    }

    /// Look up a cached payload that still passes validation.
    async fn cached(&self, endpoint: Endpoint, fingerprint: &Fingerprint) -> Option<Payload> {
        let value = match self.cache.get(fingerprint).await {
            Ok(value) => value?,
            Err(e) => {
                warn!(error = %e, "Cache read failed, fetching instead");
                return None;
            }
        };

        match schema::validate(endpoint, &value) {
            Ok(payload) => {
                debug!("Serving response from cache");
                Some(payload)
            }
            Err(e) => {
                debug!(error = %e, "Cached response is stale, refetching");
                None
            }
        }
    }

    /// Make a GET request and parse the JSON body.
    async fn request(
        &self,
        endpoint: Endpoint,
        params: &[(&str, &str)],
        api_key: &str,
    ) -> Result<Value> {
        let mut query: Vec<(&str, &str)> = Vec::with_capacity(params.len() + 2);
        query.push(("function", endpoint.function()));
        query.push(("apikey", api_key));
        query.extend_from_slice(params);

        debug!("Alpha Vantage request: {}", endpoint);

        let response = self
            .client
            .get(self.url())
            .query(&query)
            .send()
            .await
            .map_err(network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let text = response.text().await.map_err(network)?;

        let value: Value = serde_json::from_str(&text).map_err(|e| {
            SchemaValidationError::new(endpoint, format!("response body is not valid JSON: {e}"))
        })?;

        if let Some(message) = schema::provider_message(&value) {
            return Err(Error::Provider(message));
        }

        Ok(value)
    }
}

/// Convert a transport error, keeping the API key out of the message.
fn network(e: reqwest::Error) -> Error {
    let message = e.without_url().to_string();
    if message.is_empty() {
        Error::Network(UNKNOWN_ERROR.to_string())
    } else {
        Error::Network(message)
    }
}

impl DataProvider for AlphaVantageClient {
    fn name(&self) -> &str {
        "Alpha Vantage"
    }

    fn description(&self) -> &str {
        "Alpha Vantage - Stock market data and company fundamentals API"
    }

    fn supported_endpoints(&self) -> &[Endpoint] {
        Endpoint::ALL
    }
}

#[async_trait]
impl MarketDataProvider for AlphaVantageClient {
    async fn fetch(
        &self,
        endpoint: Endpoint,
        params: &[(&str, &str)],
    ) -> ResultEnvelope<Payload> {
        Self::fetch(self, endpoint, params).await
    }
}
