#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/stockdeck/stockdeck/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Market data, chart series and watchlists for stock browsing clients.
//!
//! This crate re-exports the core types, store backends and the Alpha
//! Vantage client, and adds the client-facing pieces built on top of them:
//! [`ChartSeries`] for plotting, [`WatchlistStore`] for named watchlists and
//! [`StockInfoLoader`] for the stock detail view.
//!
//! # Features
//!
//! - `alphavantage` - Alpha Vantage market data client
//! - `store-sqlite` - SQLite-backed persistent store
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use stockdeck::{AlphaVantageClient, MarketDataProvider, SqliteStore, WatchlistStore};
//!
//! #[tokio::main]
//! async fn main() -> stockdeck::Result<()> {
//!     let store = Arc::new(SqliteStore::new("stockdeck.db")?);
//!     let client = AlphaVantageClient::from_env(store.clone());
//!
//!     let movers = client.top_gainers_losers().await;
//!     println!("{:?}", movers.data);
//!
//!     let watchlists = WatchlistStore::new(store);
//!     watchlists.create("Tech").await?;
//!     watchlists.add_ticker("Tech", "aapl").await?;
//!
//!     Ok(())
//! }
//! ```

// Core types and traits
pub use stockdeck_core::*;

// Stores
#[cfg(feature = "store-sqlite")]
pub use stockdeck_store::SqliteStore;
pub use stockdeck_store::{InMemoryStore, NoopStore};

// Providers
#[cfg(feature = "alphavantage")]
pub use stockdeck_alphavantage::{AlphaVantageClient, AlphaVantageConfig};

/// Time-series to chart transform.
pub mod chart;
/// Combined loader for the stock detail view.
pub mod stock_info;
/// Named watchlists.
pub mod watchlist;

pub use chart::{ChartPoint, ChartSeries, sample_labels, value_range};
pub use stock_info::{StockInfo, StockInfoLoader};
pub use watchlist::WatchlistStore;
