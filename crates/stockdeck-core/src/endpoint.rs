//! Endpoint and timeframe definitions.
//!
//! This module defines [`Endpoint`], the closed set of provider functions the
//! client knows how to call and validate, and [`Timeframe`], the chart
//! granularity selected by the user.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A logical market-data query type.
///
/// Every variant has a fixed provider function name and a declared response
/// shape in the [schema registry](crate::schema).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Endpoint {
    /// Top gainers, top losers and most actively traded tickers.
    TopGainersLosers,
    /// Ticker lookup by keywords.
    SymbolSearch,
    /// Company fundamentals.
    Overview,
    /// Intraday bars.
    TimeSeriesIntraday,
    /// Daily bars.
    TimeSeriesDaily,
    /// Weekly bars.
    TimeSeriesWeekly,
    /// Monthly bars.
    TimeSeriesMonthly,
}

impl Endpoint {
    /// All endpoints, in declaration order.
    pub const ALL: &'static [Self] = &[
        Self::TopGainersLosers,
        Self::SymbolSearch,
        Self::Overview,
        Self::TimeSeriesIntraday,
        Self::TimeSeriesDaily,
        Self::TimeSeriesWeekly,
        Self::TimeSeriesMonthly,
    ];

    /// Returns the provider `function` query value for this endpoint.
    #[must_use]
    pub const fn function(&self) -> &'static str {
        match self {
            Self::TopGainersLosers => "TOP_GAINERS_LOSERS",
            Self::SymbolSearch => "SYMBOL_SEARCH",
            Self::Overview => "OVERVIEW",
            Self::TimeSeriesIntraday => "TIME_SERIES_INTRADAY",
            Self::TimeSeriesDaily => "TIME_SERIES_DAILY",
            Self::TimeSeriesWeekly => "TIME_SERIES_WEEKLY",
            Self::TimeSeriesMonthly => "TIME_SERIES_MONTHLY",
        }
    }

    /// Returns the top-level field holding the series, for time-series endpoints.
    #[must_use]
    pub const fn series_field(&self) -> Option<&'static str> {
        match self {
            Self::TimeSeriesIntraday => Some("Time Series (5min)"),
            Self::TimeSeriesDaily => Some("Time Series (Daily)"),
            Self::TimeSeriesWeekly => Some("Time Series (Weekly)"),
            Self::TimeSeriesMonthly => Some("Time Series (Monthly)"),
            _ => None,
        }
    }

    /// Returns true for the four time-series endpoints.
    #[must_use]
    pub const fn is_time_series(&self) -> bool {
        self.series_field().is_some()
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.function())
    }
}

impl FromStr for Endpoint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|e| e.function().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown endpoint: {s}"))
    }
}

/// Chart granularity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    /// Intraday bars, labelled `HH:MM`.
    Intraday,
    /// Daily bars, labelled `M/D`.
    #[default]
    Daily,
    /// Weekly bars, labelled with short month and day.
    Weekly,
    /// Monthly bars, labelled with short month and two-digit year.
    Monthly,
}

impl Timeframe {
    /// Interval requested for intraday series.
    pub const INTRADAY_INTERVAL: &'static str = "5min";

    /// Returns the endpoint that serves this timeframe.
    #[must_use]
    pub const fn endpoint(&self) -> Endpoint {
        match self {
            Self::Intraday => Endpoint::TimeSeriesIntraday,
            Self::Daily => Endpoint::TimeSeriesDaily,
            Self::Weekly => Endpoint::TimeSeriesWeekly,
            Self::Monthly => Endpoint::TimeSeriesMonthly,
        }
    }

    /// Returns the extra request parameters this timeframe needs beyond `symbol`.
    #[must_use]
    pub const fn params(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Intraday => &[("interval", Self::INTRADAY_INTERVAL)],
            _ => &[],
        }
    }

    /// Returns the lowercase name of this timeframe.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Intraday => "intraday",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized names fall back to [`Timeframe::Daily`].
impl From<&str> for Timeframe {
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "intraday" => Self::Intraday,
            "weekly" => Self::Weekly,
            "monthly" => Self::Monthly,
            _ => Self::Daily,
        }
    }
}
