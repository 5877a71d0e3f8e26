// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Strong types for configuration values
//!
//! These types ensure configuration values are not confused with
//! blockchain values (block numbers, transaction indices, etc.).

use serde::{Deserialize, Serialize};

/// Number of transactions requested per page from a remote source
///
/// Block explorers cap the page size: Etherscan rejects `offset` values whose
/// `page * offset` exceeds 10,000. Values are clamped into `1..=MAX`.
///
/// # Examples
///
/// ```
/// use petroscan::PageSize;
///
/// assert_eq!(PageSize::DEFAULT.as_usize(), 100);
/// assert_eq!(PageSize::new(0).as_usize(), 1);
/// assert_eq!(PageSize::new(50_000), PageSize::MAX);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "usize")]
pub struct PageSize(usize);

impl PageSize {
    /// Page size used by the original explorer integration
    pub const DEFAULT: Self = Self(100);

    /// Largest page an explorer will serve in one request
    pub const MAX: Self = Self(10_000);

    /// Create a new page size, clamped into `1..=MAX`
    pub const fn new(size: usize) -> Self {
        if size == 0 {
            Self(1)
        } else if size > Self::MAX.0 {
            Self::MAX
        } else {
            Self(size)
        }
    }

    /// Get the inner value
    pub const fn as_usize(&self) -> usize {
        self.0
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<usize> for PageSize {
    fn from(value: usize) -> Self {
        Self::new(value)
    }
}

impl std::fmt::Display for PageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} transactions", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_clamps() {
        let zero: PageSize = serde_json::from_str("0").unwrap();
        let huge: PageSize = serde_json::from_str("50000").unwrap();
        let normal: PageSize = serde_json::from_str("250").unwrap();

        assert_eq!(zero, PageSize::new(1));
        assert_eq!(huge, PageSize::MAX);
        assert_eq!(normal.as_usize(), 250);
        assert_eq!(serde_json::to_string(&normal).unwrap(), "250");
    }
}
