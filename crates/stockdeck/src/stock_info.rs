//! Combined loader for the stock detail view.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, instrument, warn};

use stockdeck_core::{
    CompanyOverview, MarketDataProvider, ResultEnvelope, Symbol, TimeSeries, Timeframe,
};

use crate::chart::ChartSeries;

/// Everything the stock detail view shows for one ticker.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockInfo {
    /// Ticker the data was loaded for.
    pub symbol: Symbol,
    /// Granularity of `series` and `chart`.
    pub timeframe: Timeframe,
    /// Company fundamentals.
    pub overview: ResultEnvelope<CompanyOverview>,
    /// Raw price history.
    pub series: ResultEnvelope<TimeSeries>,
    /// Chart derived from `series`; empty when the series failed.
    pub chart: ChartSeries,
}

impl StockInfo {
    /// Returns true if both requests succeeded.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.overview.is_ok() && self.series.is_ok()
    }
}

/// Loads overview and price history for a ticker from one provider.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use stockdeck::{StockInfoLoader, SqliteStore, Symbol, Timeframe};
///
/// let store = Arc::new(SqliteStore::new("stockdeck.db")?);
/// let loader = StockInfoLoader::alphavantage_from_env(store);
///
/// let info = loader.load(&Symbol::new("ibm"), Timeframe::Weekly).await;
/// println!("{:?}", info.chart.percent_change);
/// ```
#[derive(Clone)]
pub struct StockInfoLoader {
    provider: Arc<dyn MarketDataProvider>,
}

impl std::fmt::Debug for StockInfoLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StockInfoLoader")
            .field("provider", &self.provider.name())
            .finish()
    }
}

impl StockInfoLoader {
    /// Create a loader over `provider`.
    #[must_use]
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        debug!(provider = provider.name(), "Registering market data provider");
        Self { provider }
    }

    /// Returns the underlying provider.
    #[must_use]
    pub fn provider(&self) -> &Arc<dyn MarketDataProvider> {
        &self.provider
    }

    /// Loads overview and time series concurrently and derives the chart.
    ///
    /// Never fails: each half reports its own error in its envelope.
    #[instrument(skip(self), fields(provider = self.provider.name()))]
    pub async fn load(&self, symbol: &Symbol, timeframe: Timeframe) -> StockInfo {
        let (overview, series) = tokio::join!(
            self.provider.overview(symbol),
            self.provider.time_series(symbol, timeframe),
        );

        if let Some(error) = &overview.error {
            warn!(error = %error, "Overview request failed");
        }
        if let Some(error) = &series.error {
            warn!(error = %error, "Time series request failed");
        }

        let chart = series
            .data
            .as_ref()
            .map(|ts| ChartSeries::from_time_series(ts, timeframe))
            .unwrap_or_default();

        StockInfo {
            symbol: symbol.clone(),
            timeframe,
            overview,
            series,
            chart,
        }
    }

    /// Loads only the chart, e.g. after the user switches timeframe.
    pub async fn chart(
        &self,
        symbol: &Symbol,
        timeframe: Timeframe,
    ) -> ResultEnvelope<ChartSeries> {
        self.provider
            .time_series(symbol, timeframe)
            .await
            .map(|ts| ChartSeries::from_time_series(&ts, timeframe))
    }

    /// Create a loader backed by an Alpha Vantage client.
    #[cfg(feature = "alphavantage")]
    #[must_use]
    pub fn alphavantage(
        config: stockdeck_alphavantage::AlphaVantageConfig,
        store: Arc<dyn stockdeck_core::KeyValueStore>,
    ) -> Self {
        Self::new(Arc::new(stockdeck_alphavantage::AlphaVantageClient::new(
            config, store,
        )))
    }

    /// Create a loader backed by an Alpha Vantage client configured from the
    /// environment.
    #[cfg(feature = "alphavantage")]
    #[must_use]
    pub fn alphavantage_from_env(store: Arc<dyn stockdeck_core::KeyValueStore>) -> Self {
        Self::new(Arc::new(stockdeck_alphavantage::AlphaVantageClient::from_env(
            store,
        )))
    }
}
