// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for remote transaction sources.
//!
//! These cover failures talking to a block explorer. An empty page is never an
//! error: it is how a source signals that pagination is complete.

/// Errors that can occur while fetching a page of transactions.
///
/// # Examples
///
/// ```rust
/// use petroscan::RemoteError;
///
/// let error = RemoteError::rate_limited("Max rate limit reached");
/// assert!(error.is_rate_limited());
/// ```
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// Network or transport failure: connection refused, timeout, or a
    /// non-success HTTP status.
    #[error("Remote source unavailable during {operation}")]
    Unavailable {
        /// Description of the request that failed
        operation: String,
        /// The underlying transport error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The provider signalled throttling.
    #[error("Remote source rate limited: {details}")]
    RateLimited {
        /// Provider message, if any
        details: String,
    },

    /// The response could not be parsed into well-formed records.
    #[error("Malformed remote data: {details}")]
    Data {
        /// What was wrong with the response
        details: String,
    },
}

impl RemoteError {
    /// Helper to create an `Unavailable` error from any error type.
    pub fn unavailable(
        operation: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        RemoteError::Unavailable {
            operation: operation.into(),
            source: Box::new(source),
        }
    }

    /// Create a `RateLimited` error.
    pub fn rate_limited(details: impl Into<String>) -> Self {
        RemoteError::RateLimited {
            details: details.into(),
        }
    }

    /// Create a `Data` error.
    pub fn data(details: impl Into<String>) -> Self {
        RemoteError::Data {
            details: details.into(),
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, RemoteError::RateLimited { .. })
    }
}
