#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/stockdeck/stockdeck/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core traits and types for stockdeck.
//!
//! This crate provides the foundational abstractions:
//!
//! - [`Endpoint`](endpoint::Endpoint) - Closed set of provider functions
//! - [`validate`](schema::validate) - Schema registry shared by live and cached responses
//! - [`ResultEnvelope`](envelope::ResultEnvelope) - Uniform `{ data, error, fromCache }` shape
//! - [`KeyValueStore`](store::KeyValueStore) - Storage abstraction
//! - [`ResponseCache`](cache::ResponseCache) - Fingerprint-keyed response cache
//! - [`MarketDataProvider`](provider::MarketDataProvider) - Market data source

/// Response cache and request fingerprints.
pub mod cache;
/// Endpoint and timeframe definitions.
pub mod endpoint;
/// Uniform result envelope.
pub mod envelope;
/// Error types.
pub mod error;
/// Provider traits for fetching market data.
pub mod provider;
/// Schema registry.
pub mod schema;
/// Key-value store trait.
pub mod store;
/// Core data types (Symbol, Watchlist, payloads).
pub mod types;

// Re-export commonly used items at crate root
pub use cache::{Fingerprint, ResponseCache};
pub use endpoint::{Endpoint, Timeframe};
pub use envelope::ResultEnvelope;
pub use error::{Error, Result};
pub use provider::{DataProvider, MarketDataProvider};
pub use schema::SchemaValidationError;
pub use store::KeyValueStore;
pub use types::{
    CompanyOverview, MoverRow, Payload, Symbol, SymbolSearch, TimeSeries, TopMovers, Watchlist,
};
