// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Gas usage reporting over cached transactions.
//!
//! ## Public API
//!
//! - [`aggregate`] - Groups transactions by UTC day and totals their gas cost
//! - [`GasUsageReport`] - Per-day breakdown plus grand totals
//! - [`DailyGasUsage`] - One row of the breakdown
//!
//! Aggregation is pure: it neither fetches nor caches anything, so it can run
//! over fresh or stale data alike.

mod aggregate;

pub use aggregate::{aggregate, DailyGasUsage, GasUsageReport};
