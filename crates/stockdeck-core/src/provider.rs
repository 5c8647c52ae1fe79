//! Provider traits for fetching market data.
//!
//! This module defines the core provider traits:
//!
//! - [`DataProvider`] - Base trait for all data providers
//! - [`MarketDataProvider`] - Endpoint fetches returning a [`ResultEnvelope`]

use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    endpoint::{Endpoint, Timeframe},
    envelope::ResultEnvelope,
    types::{CompanyOverview, Payload, Symbol, SymbolSearch, TimeSeries, TopMovers},
};

/// Base trait for all data providers.
pub trait DataProvider: Send + Sync + Debug {
    /// Returns the name of this provider (e.g., "Alpha Vantage").
    fn name(&self) -> &str;

    /// Returns a description of this provider.
    fn description(&self) -> &str;

    /// Returns the endpoints this provider can serve.
    fn supported_endpoints(&self) -> &[Endpoint];
}

/// Provider of validated market data.
///
/// `fetch` never fails outright: every failure is carried in the envelope's
/// `error` field.
#[async_trait]
pub trait MarketDataProvider: DataProvider {
    /// Fetches `endpoint` with `params`, validated against the schema registry.
    async fn fetch(
        &self,
        endpoint: Endpoint,
        params: &[(&str, &str)],
    ) -> ResultEnvelope<Payload>;

    /// Fetches the top gainers, losers and most active tickers.
    async fn top_gainers_losers(&self) -> ResultEnvelope<TopMovers> {
        self.fetch(Endpoint::TopGainersLosers, &[])
            .await
            .and_then(|| mismatch(Endpoint::TopGainersLosers), Payload::into_top_movers)
    }

    /// Searches tickers by keywords.
    async fn symbol_search(&self, keywords: &str) -> ResultEnvelope<SymbolSearch> {
        self.fetch(Endpoint::SymbolSearch, &[("keywords", keywords)])
            .await
            .and_then(|| mismatch(Endpoint::SymbolSearch), Payload::into_symbol_search)
    }

    /// Fetches company fundamentals for `symbol`.
    async fn overview(&self, symbol: &Symbol) -> ResultEnvelope<CompanyOverview> {
        self.fetch(Endpoint::Overview, &[("symbol", symbol.as_str())])
            .await
            .and_then(|| mismatch(Endpoint::Overview), Payload::into_overview)
    }

    /// Fetches the price history of `symbol` at `timeframe` granularity.
    async fn time_series(
        &self,
        symbol: &Symbol,
        timeframe: Timeframe,
    ) -> ResultEnvelope<TimeSeries> {
        let endpoint = timeframe.endpoint();
        let mut params = vec![("symbol", symbol.as_str())];
        params.extend_from_slice(timeframe.params());

        self.fetch(endpoint, &params)
            .await
            .and_then(|| mismatch(endpoint), Payload::into_time_series)
    }
}

fn mismatch(endpoint: Endpoint) -> String {
    format!("Unexpected payload type for {endpoint}")
}
