//! Time-series to chart transform.
//!
//! Pure functions turning a provider time-series payload into chart points,
//! axis labels and the price change over the visible window.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use stockdeck_core::{TimeSeries, Timeframe};

/// Number of most recent observations kept for a chart.
pub const MAX_POINTS: usize = 60;

/// Observation fields holding the closing price, in lookup order.
const CLOSE_FIELDS: &[&str] = &["4. close", "close"];

/// One plotted observation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct ChartPoint {
    /// Closing price.
    pub value: f64,
}

/// Chart-ready view of a time series.
///
/// `points` and `labels` are `None` when the payload had no usable series,
/// and have equal length otherwise, ordered oldest first.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    /// Closing prices, oldest first.
    pub points: Option<Vec<ChartPoint>>,
    /// Axis label per point.
    pub labels: Option<Vec<String>>,
    /// Last closing price.
    pub current_price: f64,
    /// Last close minus first close.
    pub price_change: f64,
    /// `price_change` relative to the first close, in percent.
    pub percent_change: f64,
}

impl ChartSeries {
    /// Builds a chart from a raw time-series payload.
    ///
    /// The series is read from the timeframe endpoint's declared field. When
    /// that field is absent, the first field whose name contains `time` or
    /// `series` is used, and failing that the whole payload.
    #[must_use]
    pub fn from_payload(payload: Option<&Value>, timeframe: Timeframe) -> Self {
        let Some(series) = payload.and_then(|p| select_series(p, timeframe)) else {
            return Self::default();
        };
        let Some(series) = series.as_object() else {
            return Self::default();
        };

        Self::build(
            series.iter().map(|(ts, obs)| (ts.as_str(), close_from_value(obs))),
            timeframe,
        )
    }

    /// Builds a chart from a validated [`TimeSeries`].
    #[must_use]
    pub fn from_time_series(series: &TimeSeries, timeframe: Timeframe) -> Self {
        Self::build(
            series
                .series
                .iter()
                .map(|(ts, obs)| (ts.as_str(), close_from_record(obs))),
            timeframe,
        )
    }

    fn build<'a>(entries: impl Iterator<Item = (&'a str, f64)>, timeframe: Timeframe) -> Self {
        let mut entries: Vec<(Option<NaiveDateTime>, f64)> = entries
            .map(|(ts, close)| (parse_timestamp(ts), close))
            .collect();
        // Stable: equal timestamps keep their input order.
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        let window = &entries[entries.len().saturating_sub(MAX_POINTS)..];

        let points: Vec<ChartPoint> = window
            .iter()
            .map(|&(_, value)| ChartPoint { value })
            .collect();
        let labels: Vec<String> = window
            .iter()
            .map(|(ts, _)| ts.map(|ts| format_label(ts, timeframe)).unwrap_or_default())
            .collect();

        let current_price = points.last().map_or(0.0, |p| p.value);
        let previous_price = points.first().map_or(0.0, |p| p.value);
        let price_change = current_price - previous_price;
        let percent_change = if previous_price == 0.0 {
            0.0
        } else {
            price_change / previous_price * 100.0
        };

        Self {
            points: Some(points),
            labels: Some(labels),
            current_price,
            price_change,
            percent_change,
        }
    }

    /// Returns true if there is nothing to plot.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.as_ref().is_none_or(Vec::is_empty)
    }
}

fn select_series(payload: &Value, timeframe: Timeframe) -> Option<&Value> {
    let root: &Map<String, Value> = payload.as_object()?;

    if let Some(field) = timeframe.endpoint().series_field() {
        if let Some(series) = root.get(field) {
            return Some(series);
        }
    }

    let guessed = root.iter().find_map(|(key, value)| {
        let key = key.to_lowercase();
        (key.contains("time") || key.contains("series")).then_some(value)
    });
    Some(guessed.unwrap_or(payload))
}

fn close_from_value(observation: &Value) -> f64 {
    CLOSE_FIELDS
        .iter()
        .find_map(|field| observation.get(*field).filter(|v| !v.is_null()))
        .map_or(0.0, |close| match close {
            Value::String(s) => parse_price(s),
            Value::Number(n) => n.as_f64().filter(|v| v.is_finite()).unwrap_or(0.0),
            _ => 0.0,
        })
}

fn close_from_record(observation: &BTreeMap<String, String>) -> f64 {
    CLOSE_FIELDS
        .iter()
        .find_map(|field| observation.get(*field))
        .map_or(0.0, |close| parse_price(close))
}

fn parse_price(s: &str) -> f64 {
    s.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Parses provider timestamps: `YYYY-MM-DD[ HH:MM[:SS]]`.
fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn format_label(ts: NaiveDateTime, timeframe: Timeframe) -> String {
    match timeframe {
        Timeframe::Intraday => ts.format("%H:%M").to_string(),
        Timeframe::Daily => format!("{}/{}", ts.month(), ts.day()),
        Timeframe::Weekly => ts.format("%b %-d").to_string(),
        Timeframe::Monthly => ts.format("%b %y").to_string(),
    }
}

/// Thins axis labels so they fit in `container_width` pixels.
///
/// Labels are kept as-is when they all fit. Otherwise every label except the
/// first, the last and every `step`-th is blanked, where `step` spreads the
/// kept labels evenly. Returns `None` for no labels.
#[must_use]
pub fn sample_labels(
    labels: &[String],
    container_width: f64,
    timeframe: Timeframe,
) -> Option<Vec<String>> {
    if labels.is_empty() {
        return None;
    }

    let label_width = if timeframe == Timeframe::Daily { 50.0 } else { 70.0 };
    let max_labels = (container_width / label_width).floor().max(0.0) as usize;

    if labels.len() <= max_labels {
        return Some(labels.to_vec());
    }

    let step = if max_labels == 0 {
        usize::MAX
    } else {
        labels.len().div_ceil(max_labels)
    };
    let last = labels.len() - 1;

    Some(
        labels
            .iter()
            .enumerate()
            .map(|(i, label)| {
                if i == 0 || i == last || i % step == 0 {
                    label.clone()
                } else {
                    String::new()
                }
            })
            .collect(),
    )
}

/// Returns the lowest and highest point values.
#[must_use]
pub fn value_range(points: &[ChartPoint]) -> Option<(f64, f64)> {
    let first = points.first()?.value;
    Some(
        points
            .iter()
            .fold((first, first), |(lo, hi), p| (lo.min(p.value), hi.max(p.value))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn close(v: &str) -> Value {
        json!({"1. open": v, "4. close": v, "5. volume": "100"})
    }

    fn daily_payload(days: u32) -> Value {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut series = Map::new();
        for i in (0..days).rev() {
            let date = start + chrono::Days::new(u64::from(i));
            series.insert(date.format("%Y-%m-%d").to_string(), close(&i.to_string()));
        }
        json!({
            "Meta Data": {"2. Symbol": "IBM"},
            "Time Series (Daily)": series
        })
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_absent_or_non_object_payload() {
        assert_eq!(ChartSeries::from_payload(None, Timeframe::Daily), ChartSeries::default());
        assert_eq!(
            ChartSeries::from_payload(Some(&json!([1, 2, 3])), Timeframe::Daily),
            ChartSeries::default()
        );

        let bad_series = json!({"Meta Data": {}, "Time Series (Daily)": "oops"});
        let chart = ChartSeries::from_payload(Some(&bad_series), Timeframe::Daily);
        assert!(chart.points.is_none());
        assert!(chart.labels.is_none());
        assert_eq!(chart.current_price, 0.0);
    }

    #[test]
    fn test_keeps_last_sixty_in_order() {
        let payload = daily_payload(70);
        let chart = ChartSeries::from_payload(Some(&payload), Timeframe::Daily);

        let points = chart.points.unwrap();
        let labels = chart.labels.unwrap();
        assert_eq!(points.len(), MAX_POINTS);
        assert_eq!(labels.len(), MAX_POINTS);
        assert_eq!(points[0].value, 10.0);
        assert_eq!(points[59].value, 69.0);
        assert!(points.windows(2).all(|w| w[0].value < w[1].value));
        assert_eq!(labels[0], "1/11");
        assert_eq!(labels[59], "3/10");

        assert_eq!(chart.current_price, 69.0);
        assert_eq!(chart.price_change, 59.0);
        assert!(approx(chart.percent_change, 590.0));
    }

    #[test]
    fn test_single_point_has_no_change() {
        let payload = daily_payload(1);
        let chart = ChartSeries::from_payload(Some(&payload), Timeframe::Daily);
        assert_eq!(chart.points.as_ref().map(Vec::len), Some(1));
        assert_eq!(chart.price_change, 0.0);
        assert_eq!(chart.percent_change, 0.0);
    }

    #[test]
    fn test_empty_series() {
        let payload = json!({"Meta Data": {}, "Time Series (Daily)": {}});
        let chart = ChartSeries::from_payload(Some(&payload), Timeframe::Daily);
        assert_eq!(chart.points, Some(Vec::new()));
        assert!(chart.is_empty());
        assert_eq!(chart.current_price, 0.0);
        assert_eq!(chart.percent_change, 0.0);
    }

    #[test]
    fn test_zero_previous_price_guards_division() {
        let payload = json!({
            "Time Series (Daily)": {
                "2024-01-02": close("0"),
                "2024-01-03": close("5.5")
            }
        });
        let chart = ChartSeries::from_payload(Some(&payload), Timeframe::Daily);
        assert_eq!(chart.price_change, 5.5);
        assert_eq!(chart.percent_change, 0.0);
        assert!(chart.percent_change.is_finite());
    }

    #[test]
    fn test_percent_change() {
        let payload = json!({
            "Time Series (Daily)": {
                "2024-01-03": close("110"),
                "2024-01-02": close("100")
            }
        });
        let chart = ChartSeries::from_payload(Some(&payload), Timeframe::Daily);
        assert_eq!(chart.current_price, 110.0);
        assert!(approx(chart.price_change, 10.0));
        assert!(approx(chart.percent_change, 10.0));
    }

    #[test]
    fn test_close_field_variants() {
        let payload = json!({
            "Time Series (Daily)": {
                "2024-01-02": {"close": "12.5"},
                "2024-01-03": {"close": 13},
                "2024-01-04": {"4. close": "n/a"},
                "2024-01-05": {"1. open": "14"}
            }
        });
        let chart = ChartSeries::from_payload(Some(&payload), Timeframe::Daily);
        let values: Vec<f64> = chart.points.unwrap().iter().map(|p| p.value).collect();
        assert_eq!(values, vec![12.5, 13.0, 0.0, 0.0]);
    }

    #[test]
    fn test_labels_per_timeframe() {
        let intraday = json!({
            "Time Series (5min)": {
                "2024-01-05 09:35:00": close("1"),
                "2024-01-05 16:00:00": close("2")
            }
        });
        let chart = ChartSeries::from_payload(Some(&intraday), Timeframe::Intraday);
        assert_eq!(chart.labels.unwrap(), vec!["09:35", "16:00"]);

        let weekly = json!({"Time Series (Weekly)": {"2024-01-05": close("1")}});
        let chart = ChartSeries::from_payload(Some(&weekly), Timeframe::Weekly);
        assert_eq!(chart.labels.unwrap(), vec!["Jan 5"]);

        let monthly = json!({"Time Series (Monthly)": {"2024-01-31": close("1")}});
        let chart = ChartSeries::from_payload(Some(&monthly), Timeframe::Monthly);
        assert_eq!(chart.labels.unwrap(), vec!["Jan 24"]);

        let chart = ChartSeries::from_payload(Some(&monthly), Timeframe::from("quarterly"));
        assert_eq!(chart.labels.unwrap(), vec!["1/31"]);
    }

    #[test]
    fn test_falls_back_to_named_series_field() {
        let payload = json!({
            "Meta Data": {"2. Symbol": "IBM"},
            "Weekly Time Series": {
                "2024-01-05": close("150"),
                "2024-01-12": close("165")
            }
        });
        let chart = ChartSeries::from_payload(Some(&payload), Timeframe::Weekly);
        assert_eq!(chart.points.unwrap().len(), 2);
        assert_eq!(chart.current_price, 165.0);
    }

    #[test]
    fn test_falls_back_to_whole_payload() {
        let payload = json!({
            "2024-01-02": {"close": "1"},
            "2024-01-03": {"close": "3"}
        });
        let chart = ChartSeries::from_payload(Some(&payload), Timeframe::Daily);
        assert_eq!(chart.current_price, 3.0);
        assert_eq!(chart.labels.unwrap(), vec!["1/2", "1/3"]);
    }

    #[test]
    fn test_unparseable_timestamps_sort_first() {
        let payload = json!({
            "Time Series (Daily)": {
                "2024-01-02": close("2"),
                "yesterday": close("1")
            }
        });
        let chart = ChartSeries::from_payload(Some(&payload), Timeframe::Daily);
        assert_eq!(chart.labels.unwrap(), vec!["", "1/2"]);
        assert_eq!(chart.current_price, 2.0);
    }

    #[test]
    fn test_typed_series_matches_raw_payload() {
        let payload = daily_payload(65);
        let typed = stockdeck_core::schema::validate(
            stockdeck_core::Endpoint::TimeSeriesDaily,
            &payload,
        )
        .unwrap()
        .into_time_series()
        .unwrap();

        assert_eq!(
            ChartSeries::from_time_series(&typed, Timeframe::Daily),
            ChartSeries::from_payload(Some(&payload), Timeframe::Daily)
        );
    }

    #[test]
    fn test_sample_labels_fit() {
        let labels: Vec<String> = (1..=5).map(|d| format!("1/{d}")).collect();
        assert_eq!(sample_labels(&labels, 400.0, Timeframe::Daily), Some(labels.clone()));
        assert_eq!(sample_labels(&[], 400.0, Timeframe::Daily), None);
    }

    #[test]
    fn test_sample_labels_thins_evenly() {
        let labels: Vec<String> = (0..10).map(|i| i.to_string()).collect();
        // 280 / 70 = 4 labels, step = ceil(10 / 4) = 3
        let sampled = sample_labels(&labels, 280.0, Timeframe::Weekly).unwrap();
        assert_eq!(
            sampled,
            vec!["0", "", "", "3", "", "", "6", "", "", "9"]
        );

        // Too narrow for any label: only the ends survive.
        let sampled = sample_labels(&labels, 10.0, Timeframe::Daily).unwrap();
        assert_eq!(sampled[0], "0");
        assert_eq!(sampled[9], "9");
        assert!(sampled[1..9].iter().all(String::is_empty));
    }

    #[test]
    fn test_value_range() {
        let points = [2.0, 7.5, -1.0, 3.0].map(|value| ChartPoint { value });
        assert_eq!(value_range(&points), Some((-1.0, 7.5)));
        assert_eq!(value_range(&[]), None);
    }
}
