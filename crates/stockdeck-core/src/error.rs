//! Error types for market data and storage operations.
//!
//! This module defines [`Error`] which covers every failure the client, the
//! response cache and the watchlist store can run into.

use thiserror::Error;

use crate::schema::SchemaValidationError;

/// Errors that can occur while fetching, validating, or storing data.
#[derive(Error, Debug)]
pub enum Error {
    /// No API key is configured for the provider.
    #[error("API key is not configured")]
    NotConfigured,

    /// Network-related errors (DNS failures, timeouts, connection resets).
    #[error("{0}")]
    Network(String),

    /// The provider answered with a non-success HTTP status.
    #[error("HTTP {status}: {reason}")]
    Http {
        /// Numeric status code.
        status: u16,
        /// Canonical reason phrase for the status.
        reason: String,
    },

    /// The payload does not match the endpoint's declared shape.
    #[error(transparent)]
    Schema(#[from] SchemaValidationError),

    /// The provider returned a soft error message (rate limit, bad request).
    #[error("{0}")]
    Provider(String),

    /// Error interacting with the key-value store.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Error encoding or decoding persisted JSON.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
