//! Error types for index access and filter construction.

use thiserror::Error;

/// Errors raised while building a metadata filter.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    /// Field path is empty or contains characters outside `[A-Za-z0-9_.]`.
    #[error("invalid filter field path: {0:?}")]
    InvalidField(String),

    /// Numeric bound is NaN or infinite.
    #[error("filter bound for {field} must be finite, got {value}")]
    NonFiniteBound {
        /// Field the bound applies to.
        field: String,
        /// The rejected value.
        value: f64,
    },
}

/// Errors raised by a [`VectorIndex`](crate::VectorIndex) implementation.
#[derive(Debug, Error)]
pub enum IndexError {
    /// The HTTP request could not be sent or its body could not be read.
    #[error("index request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The index answered with a non-success status.
    #[error("index returned {status}: {message}")]
    Upstream {
        /// HTTP status code.
        status: u16,
        /// Error message reported by the index.
        message: String,
    },

    /// The response body did not have the expected shape.
    #[error("unexpected index response: {0}")]
    Decode(String),

    /// A filter could not be constructed from the search options.
    #[error(transparent)]
    Filter(#[from] FilterError),
}

/// Convenience alias.
pub type IndexResult<T> = Result<T, IndexError>;
