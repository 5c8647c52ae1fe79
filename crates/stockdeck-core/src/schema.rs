//! Structural contracts per endpoint.
//!
//! [`validate`] is the single gate every payload passes through, whether it
//! came from the network or from the response cache. Parsing is strict: a
//! payload either matches its endpoint's declared shape completely or is
//! rejected with a [`SchemaValidationError`]. Unknown extra fields are
//! ignored.

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::endpoint::Endpoint;
use crate::types::{CompanyOverview, Payload, SymbolSearch, TimeSeries, TopMovers};

/// Fields the provider uses to report soft errors with a 200 status.
const PROVIDER_MESSAGE_FIELDS: &[&str] = &["Information", "Note", "Error Message"];

/// Top-level metadata block of every time-series response.
const META_DATA_FIELD: &str = "Meta Data";

/// A payload does not match its endpoint's declared shape.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid {endpoint} response: {message}")]
pub struct SchemaValidationError {
    /// Endpoint whose contract was violated.
    pub endpoint: Endpoint,
    /// Human-readable description of the mismatch.
    pub message: String,
}

impl SchemaValidationError {
    /// Creates a validation error for `endpoint`.
    #[must_use]
    pub fn new(endpoint: Endpoint, message: impl Into<String>) -> Self {
        Self {
            endpoint,
            message: message.into(),
        }
    }
}

/// Validates `payload` against the contract of `endpoint`.
///
/// # Errors
/// Returns a [`SchemaValidationError`] naming the first mismatch found.
pub fn validate(endpoint: Endpoint, payload: &Value) -> Result<Payload, SchemaValidationError> {
    if !payload.is_object() {
        return Err(SchemaValidationError::new(
            endpoint,
            format!("expected a JSON object, got {}", kind(payload)),
        ));
    }

    match endpoint {
        Endpoint::TopGainersLosers => {
            parse::<TopMovers>(endpoint, payload, None).map(Payload::TopGainersLosers)
        }
        Endpoint::SymbolSearch => {
            parse::<SymbolSearch>(endpoint, payload, None).map(Payload::SymbolSearch)
        }
        Endpoint::Overview => {
            parse::<CompanyOverview>(endpoint, payload, None).map(Payload::Overview)
        }
        Endpoint::TimeSeriesIntraday
        | Endpoint::TimeSeriesDaily
        | Endpoint::TimeSeriesWeekly
        | Endpoint::TimeSeriesMonthly => validate_time_series(endpoint, payload),
    }
}

fn validate_time_series(
    endpoint: Endpoint,
    payload: &Value,
) -> Result<Payload, SchemaValidationError> {
    let Some(series_field) = endpoint.series_field() else {
        return Err(SchemaValidationError::new(endpoint, "not a time-series endpoint"));
    };

    let meta_data = required(endpoint, payload, META_DATA_FIELD)?;
    let meta_data = parse::<BTreeMap<String, String>>(endpoint, meta_data, Some(META_DATA_FIELD))?;

    let series = required(endpoint, payload, series_field)?;
    let series =
        parse::<BTreeMap<String, BTreeMap<String, String>>>(endpoint, series, Some(series_field))?;

    Ok(Payload::TimeSeries(TimeSeries {
        meta_data,
        series_field: series_field.to_string(),
        series,
    }))
}

/// Returns the provider's soft-error text, if `payload` is one.
///
/// The provider answers rate limits and malformed requests with HTTP 200 and
/// a single explanatory field instead of data.
#[must_use]
pub fn provider_message(payload: &Value) -> Option<String> {
    let object = payload.as_object()?;
    PROVIDER_MESSAGE_FIELDS.iter().find_map(|field| {
        object.get(*field).map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    })
}

fn required<'a>(
    endpoint: Endpoint,
    payload: &'a Value,
    field: &str,
) -> Result<&'a Value, SchemaValidationError> {
    payload
        .get(field)
        .ok_or_else(|| SchemaValidationError::new(endpoint, format!("missing field `{field}`")))
}

fn parse<'a, T: Deserialize<'a>>(
    endpoint: Endpoint,
    value: &'a Value,
    field: Option<&str>,
) -> Result<T, SchemaValidationError> {
    T::deserialize(value).map_err(|e| {
        let message = match field {
            Some(field) => format!("field `{field}`: {e}"),
            None => e.to_string(),
        };
        SchemaValidationError::new(endpoint, message)
    })
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
