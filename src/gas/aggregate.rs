// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use alloy_primitives::U256;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::tracing::spans;
use crate::types::gas::GasPrice;
use crate::types::transaction::Transaction;
use crate::types::wei::WeiAmount;

/// Gas usage for one UTC calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyGasUsage {
    pub date: NaiveDate,
    pub transaction_count: usize,
    /// Transactions that reverted (they still paid for gas)
    pub failed_count: usize,
    /// Integer mean of gas prices, truncated to whole wei
    pub average_gas_price: GasPrice,
    /// Integer mean of per-transaction cost, truncated to whole wei
    pub average_gas_cost: WeiAmount,
    pub total_gas_cost: WeiAmount,
}

impl DailyGasUsage {
    /// Share of failed transactions, in percent
    pub fn failed_percentage(&self) -> f64 {
        if self.transaction_count == 0 {
            return 0.0;
        }
        self.failed_count as f64 * 100.0 / self.transaction_count as f64
    }
}

/// Per-day gas usage plus grand totals
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasUsageReport {
    /// Ascending by date; days without transactions are absent
    pub days: Vec<DailyGasUsage>,
    pub transaction_count: usize,
    pub failed_count: usize,
    pub total_gas_cost: WeiAmount,
}

impl GasUsageReport {
    pub fn is_empty(&self) -> bool {
        self.transaction_count == 0
    }
}

#[derive(Default)]
struct DayAccumulator {
    count: usize,
    failed: usize,
    gas_price_sum: U256,
    cost_sum: WeiAmount,
}

impl DayAccumulator {
    fn add(&mut self, tx: &Transaction) {
        self.count += 1;
        if tx.is_error() {
            self.failed += 1;
        }
        self.gas_price_sum = self.gas_price_sum.saturating_add(tx.gas_price().as_u256());
        self.cost_sum = self.cost_sum + tx.gas_cost();
    }

    fn finish(self, date: NaiveDate) -> DailyGasUsage {
        // count >= 1 for every accumulator that exists
        let divisor = U256::from(self.count.max(1));
        DailyGasUsage {
            date,
            transaction_count: self.count,
            failed_count: self.failed,
            average_gas_price: GasPrice::from(self.gas_price_sum / divisor),
            average_gas_cost: self.cost_sum.checked_mean(self.count).unwrap_or_default(),
            total_gas_cost: self.cost_sum,
        }
    }
}

/// Aggregates gas usage per UTC calendar day
///
/// Input order does not matter. An empty slice yields an empty report.
///
/// # Examples
///
/// ```rust,ignore
/// use petroscan::aggregate;
///
/// let report = aggregate(&transactions);
/// for day in &report.days {
///     println!("{}: {} tx, {}", day.date, day.transaction_count, day.total_gas_cost);
/// }
/// ```
pub fn aggregate(transactions: &[Transaction]) -> GasUsageReport {
    let _guard = spans::aggregate(transactions.len()).entered();

    let mut by_day: BTreeMap<NaiveDate, DayAccumulator> = BTreeMap::new();
    for tx in transactions {
        by_day.entry(tx.date()).or_default().add(tx);
    }

    let days: Vec<DailyGasUsage> = by_day
        .into_iter()
        .map(|(date, acc)| acc.finish(date))
        .collect();

    let report = GasUsageReport {
        transaction_count: days.iter().map(|d| d.transaction_count).sum(),
        failed_count: days.iter().map(|d| d.failed_count).sum(),
        total_gas_cost: days.iter().map(|d| &d.total_gas_cost).sum(),
        days,
    };

    debug!(
        days = report.days.len(),
        transactions = report.transaction_count,
        total_gas_cost = %report.total_gas_cost,
        "Aggregated gas usage"
    );
    report
}
