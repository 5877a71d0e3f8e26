// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for local transaction stores.

/// Errors that can occur while loading or persisting a transaction store.
///
/// Both variants are treated as fatal for the affected cache key. Nothing is
/// repaired automatically: a corrupt file stays on disk for inspection.
///
/// # Examples
///
/// ```rust
/// use petroscan::StoreError;
///
/// let error = StoreError::corrupt("cache/0xabc-sent.json", "version 7 is not supported", None);
/// assert!(error.to_string().contains("0xabc-sent.json"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Persisted data exists but cannot be parsed, or belongs to another
    /// cache key or format version.
    #[error("Corrupt transaction store at {path}: {details}")]
    Corrupt {
        /// Path to the store file
        path: String,
        /// What was wrong with the data
        details: String,
        /// The underlying parse or read error, if any
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A durable write could not be completed.
    ///
    /// Writes go through a temp file and an atomic rename, so the previous
    /// contents of the store are still intact when this is returned.
    #[error("Failed to write transaction store at {path}: {details}")]
    Write {
        /// Path to the store file
        path: String,
        /// What failed
        details: String,
        /// The underlying error, if any
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl StoreError {
    /// Create a `Corrupt` error.
    pub fn corrupt(
        path: impl Into<String>,
        details: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        StoreError::Corrupt {
            path: path.into(),
            details: details.into(),
            source,
        }
    }

    /// Create a `Write` error.
    pub fn write(
        path: impl Into<String>,
        details: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        StoreError::Write {
            path: path.into(),
            details: details.into(),
            source,
        }
    }
}
