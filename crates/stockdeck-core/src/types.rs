//! Core data types for market data and watchlists.
//!
//! This module defines the fundamental data structures:
//!
//! - [`Symbol`] - Canonical ticker symbol
//! - [`Watchlist`] - Named collection of tickers
//! - [`Payload`] - Validated response, one variant per endpoint family
//! - [`TopMovers`], [`SymbolSearch`], [`CompanyOverview`], [`TimeSeries`] - typed responses

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A trading symbol/ticker.
///
/// Symbols are trimmed and uppercased on creation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Symbol(String);

impl Symbol {
    /// Creates a new symbol from a string, trimming and converting to uppercase.
    #[must_use]
    pub fn new(s: impl AsRef<str>) -> Self {
        Self(s.as_ref().trim().to_uppercase())
    }

    /// Returns the symbol as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if nothing is left after trimming.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes the symbol and returns the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Symbol {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl PartialEq<str> for Symbol {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

/// A named, user-curated list of tickers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Watchlist {
    /// Unique, trimmed, non-empty name.
    pub name: String,
    /// Uppercased tickers in insertion order, without duplicates.
    pub tickers: Vec<String>,
}

impl Watchlist {
    /// Creates a watchlist.
    #[must_use]
    pub fn new(name: impl Into<String>, tickers: Vec<String>) -> Self {
        Self {
            name: name.into(),
            tickers,
        }
    }

    /// Returns true if the canonical form of `ticker` is in this list.
    #[must_use]
    pub fn contains(&self, ticker: &str) -> bool {
        let symbol = Symbol::new(ticker);
        self.tickers.iter().any(|t| symbol == *t.as_str())
    }
}

/// One row of the gainers/losers/most-active tables.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoverRow {
    /// Ticker symbol.
    pub ticker: String,
    /// Last price.
    pub price: String,
    /// Absolute change.
    pub change_amount: String,
    /// Percentage change, e.g. `"12.5%"`.
    pub change_percentage: String,
    /// Traded volume.
    pub volume: String,
}

/// Response of `TOP_GAINERS_LOSERS`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopMovers {
    /// Largest gainers.
    pub top_gainers: Vec<MoverRow>,
    /// Largest losers.
    pub top_losers: Vec<MoverRow>,
    /// Highest volume.
    pub most_actively_traded: Vec<MoverRow>,
}

/// Response of `SYMBOL_SEARCH`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolSearch {
    /// Matches as provider field name to value, e.g. `"1. symbol" -> "AAPL"`.
    #[serde(rename = "bestMatches")]
    pub best_matches: Vec<BTreeMap<String, String>>,
}

impl SymbolSearch {
    /// Returns the symbol of every match that carries one.
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.best_matches
            .iter()
            .filter_map(|m| m.get("1. symbol").map(String::as_str))
    }
}

/// Response of `OVERVIEW`: a flat map of fundamentals.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompanyOverview(pub BTreeMap<String, String>);

impl CompanyOverview {
    /// Returns a field by its provider name (e.g. `"Name"`, `"Sector"`).
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Returns the company name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.get("Name")
    }

    /// Returns true for the empty object the provider sends for unknown symbols.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Response of the `TIME_SERIES_*` endpoints.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSeries {
    /// `Meta Data` block.
    pub meta_data: BTreeMap<String, String>,
    /// Name of the field the series was read from.
    pub series_field: String,
    /// Timestamp to observation record (`"4. close" -> "187.44"`, ...).
    pub series: BTreeMap<String, BTreeMap<String, String>>,
}

/// A schema-validated response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    /// `TOP_GAINERS_LOSERS`.
    TopGainersLosers(TopMovers),
    /// `SYMBOL_SEARCH`.
    SymbolSearch(SymbolSearch),
    /// `OVERVIEW`.
    Overview(CompanyOverview),
    /// Any `TIME_SERIES_*` endpoint.
    TimeSeries(TimeSeries),
}

impl Payload {
    /// Returns the top movers, if this is that variant.
    #[must_use]
    pub fn into_top_movers(self) -> Option<TopMovers> {
        match self {
            Self::TopGainersLosers(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the search results, if this is that variant.
    #[must_use]
    pub fn into_symbol_search(self) -> Option<SymbolSearch> {
        match self {
            Self::SymbolSearch(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the overview, if this is that variant.
    #[must_use]
    pub fn into_overview(self) -> Option<CompanyOverview> {
        match self {
            Self::Overview(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the time series, if this is that variant.
    #[must_use]
    pub fn into_time_series(self) -> Option<TimeSeries> {
        match self {
            Self::TimeSeries(v) => Some(v),
            _ => None,
        }
    }
}
