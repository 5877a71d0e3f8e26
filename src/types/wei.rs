// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Strong types for native currency amounts
//!
//! Gas costs are always denominated in wei. This wrapper keeps them apart
//! from raw gas units and gas prices.

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::Add;

/// Represents an amount of native currency (ETH) in wei
///
/// # Examples
///
/// ```
/// use alloy_primitives::U256;
/// use petroscan::WeiAmount;
///
/// let gas_cost = WeiAmount::new(U256::from(1_000_000_000_000_000u64)); // 0.001 ETH
/// let eth = gas_cost.to_ether();
/// assert!((eth - 0.001).abs() < 0.0000001);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct WeiAmount(U256);

impl WeiAmount {
    /// Zero wei amount
    pub const ZERO: Self = Self(U256::ZERO);

    /// Create a new wei amount
    pub const fn new(wei: U256) -> Self {
        Self(wei)
    }

    /// Get the inner U256 value (in wei)
    pub const fn as_u256(&self) -> U256 {
        self.0
    }

    /// Check if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Integer mean over `count` items, truncating toward zero
    ///
    /// Returns `None` when `count` is zero so callers never divide by zero.
    ///
    /// ```
    /// use petroscan::WeiAmount;
    ///
    /// assert_eq!(WeiAmount::from(10u64).checked_mean(3), Some(WeiAmount::from(3u64)));
    /// assert_eq!(WeiAmount::from(10u64).checked_mean(0), None);
    /// ```
    pub fn checked_mean(&self, count: usize) -> Option<Self> {
        if count == 0 {
            return None;
        }
        Some(Self(self.0 / U256::from(count)))
    }

    /// Convert to ether (1 ETH = 10^18 wei)
    ///
    /// Returns f64 for display purposes. This is a lossy conversion.
    pub fn to_ether(&self) -> f64 {
        self.0.to_string().parse::<f64>().unwrap_or(0.0) / 1e18
    }
}

impl From<u64> for WeiAmount {
    fn from(value: u64) -> Self {
        Self(U256::from(value))
    }
}

impl From<U256> for WeiAmount {
    fn from(value: U256) -> Self {
        Self(value)
    }
}

impl Add for WeiAmount {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sum for WeiAmount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a WeiAmount> for WeiAmount {
    fn sum<I: Iterator<Item = &'a WeiAmount>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl std::fmt::Display for WeiAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.8} ETH", self.to_ether())
    }
}
