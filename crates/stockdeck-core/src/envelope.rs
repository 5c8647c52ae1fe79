//! The uniform return shape of every market-data call.

use serde::Serialize;

use crate::error::Error;

/// Result of a market-data call: either data or an error message.
///
/// `data` is `None` exactly when `error` is set, so callers can render the
/// message without handling errors themselves. Serializes as
/// `{ "data": ..., "error"?: ..., "fromCache"?: true }`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultEnvelope<T> {
    /// Payload on success.
    pub data: Option<T>,
    /// Human-readable failure message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// True when the payload was served from the response cache.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub from_cache: bool,
}

impl<T> ResultEnvelope<T> {
    /// A freshly fetched payload.
    #[must_use]
    pub const fn fetched(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            from_cache: false,
        }
    }

    /// A payload served from the response cache.
    #[must_use]
    pub const fn cached(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            from_cache: true,
        }
    }

    /// A failure carrying only its message.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            data: None,
            error: Some(message.into()),
            from_cache: false,
        }
    }

    /// Returns true if this envelope carries data.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.data.is_some()
    }

    /// Maps the payload, keeping the error and cache flag.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ResultEnvelope<U> {
        ResultEnvelope {
            data: self.data.map(f),
            error: self.error,
            from_cache: self.from_cache,
        }
    }

    /// Narrows the payload with `f`, turning `None` into an error with `message`.
    pub fn and_then<U>(
        self,
        message: impl FnOnce() -> String,
        f: impl FnOnce(T) -> Option<U>,
    ) -> ResultEnvelope<U> {
        match self.data {
            Some(data) => match f(data) {
                Some(narrowed) => ResultEnvelope {
                    data: Some(narrowed),
                    error: None,
                    from_cache: self.from_cache,
                },
                None => ResultEnvelope::failed(message()),
            },
            None => ResultEnvelope {
                data: None,
                error: self.error,
                from_cache: self.from_cache,
            },
        }
    }

    /// Converts into a plain `Result`, keeping only the message on failure.
    ///
    /// # Errors
    /// Returns the envelope's error message when it carries no data.
    pub fn into_result(self) -> Result<T, String> {
        match (self.data, self.error) {
            (Some(data), _) => Ok(data),
            (None, Some(error)) => Err(error),
            (None, None) => Err("Unknown error occurred".to_string()),
        }
    }
}

impl<T> From<Error> for ResultEnvelope<T> {
    fn from(err: Error) -> Self {
        Self::failed(err.to_string())
    }
}
