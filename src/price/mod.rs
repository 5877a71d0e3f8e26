// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Daily ETH/USD prices for valuing gas costs
//!
//! A [`EthPriceSource`] yields one closing price per UTC day. Reports look a
//! day up in the resulting [`EthPrices`]; days without a price simply have no
//! USD value.
//!
//! # Example: Implementing EthPriceSource
//!
//! ```rust,ignore
//! use async_trait::async_trait;
//! use petroscan::price::{EthPriceSource, EthPrices};
//! use petroscan::RemoteError;
//!
//! struct FixedPrices(EthPrices);
//!
//! #[async_trait]
//! impl EthPriceSource for FixedPrices {
//!     async fn daily_prices(&self) -> Result<EthPrices, RemoteError> {
//!         Ok(self.0.clone())
//!     }
//!
//!     fn name(&self) -> &'static str {
//!         "FixedPrices"
//!     }
//! }
//! ```

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::RemoteError;
use crate::types::wei::WeiAmount;

mod etherscan;

pub use etherscan::EtherscanPriceSource;

/// Source of historical ETH/USD prices
#[async_trait]
pub trait EthPriceSource: Send + Sync {
    /// Fetches every known daily price
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] when the prices cannot be fetched or parsed.
    async fn daily_prices(&self) -> Result<EthPrices, RemoteError>;

    /// Human-readable source name, used in logs
    fn name(&self) -> &'static str;
}

/// ETH/USD price per UTC calendar day
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EthPrices {
    by_day: BTreeMap<NaiveDate, f64>,
}

impl EthPrices {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `usd` as the price of one ETH on `date`, replacing any earlier one
    pub fn insert(&mut self, date: NaiveDate, usd: f64) {
        self.by_day.insert(date, usd);
    }

    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.by_day.get(&date).copied()
    }

    /// USD value of `amount` at the price of `date`
    pub fn value_of(&self, date: NaiveDate, amount: &WeiAmount) -> Option<f64> {
        self.get(date).map(|usd| amount.to_ether() * usd)
    }

    pub fn len(&self) -> usize {
        self.by_day.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_day.is_empty()
    }
}

impl FromIterator<(NaiveDate, f64)> for EthPrices {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, f64)>>(iter: I) -> Self {
        Self {
            by_day: iter.into_iter().collect(),
        }
    }
}
