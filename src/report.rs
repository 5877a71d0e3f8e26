// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Rendering of gas usage reports
//!
//! Two output forms are supported: an aligned text table for terminals
//! ([`render_table`]) and JSON for downstream tooling ([`to_json`],
//! [`write_json`]).

use std::fmt::Write as _;
use std::path::Path;

use crate::errors::PetroscanError;
use crate::gas::{DailyGasUsage, GasUsageReport};
use crate::price::EthPrices;

const HEADERS: [&str; 7] = [
    "Day",
    "All tx",
    "Failed tx",
    "(%)",
    "Average gas price",
    "Average tx cost",
    "Total tx cost",
];

const PRICED_HEADERS: [&str; 9] = [
    "Day",
    "All tx",
    "Failed tx",
    "(%)",
    "Average gas price",
    "Average tx cost",
    "($)",
    "Total tx cost",
    "($)",
];

/// Formats a dollar amount as `$#,##0.00`
///
/// ```rust
/// assert_eq!(petroscan::format_usd(1234.5), "$1,234.50");
/// ```
pub fn format_usd(usd: f64) -> String {
    let cents = (usd * 100.0).round().max(0.0) as u64;
    let dollars = (cents / 100).to_string();

    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, digit) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    format!("${grouped}.{:02}", cents % 100)
}

/// `($…)` for a known value, an empty cell otherwise
fn usd_cell(usd: Option<f64>) -> String {
    usd.map(|v| format!("({})", format_usd(v))).unwrap_or_default()
}

fn row(day: &DailyGasUsage, prices: Option<&EthPrices>) -> Vec<String> {
    let mut cells = vec![
        day.date.format("%Y-%m-%d").to_string(),
        day.transaction_count.to_string(),
        day.failed_count.to_string(),
        format!("({:.1} %)", day.failed_percentage()),
        format!("{:.1} GWei", day.average_gas_price.to_gwei()),
        day.average_gas_cost.to_string(),
    ];
    match prices {
        Some(prices) => {
            cells.push(usd_cell(prices.value_of(day.date, &day.average_gas_cost)));
            cells.push(day.total_gas_cost.to_string());
            cells.push(usd_cell(prices.value_of(day.date, &day.total_gas_cost)));
        }
        None => cells.push(day.total_gas_cost.to_string()),
    }
    cells
}

/// Renders `report` as a text table with a title line and a summary
///
/// `subject` names what the report is about, typically an address and
/// direction. With `prices`, USD columns follow both cost columns and the
/// summary carries a USD total over the days that have a price.
pub fn render_table(subject: &str, report: &GasUsageReport, prices: Option<&EthPrices>) -> String {
    let headers: Vec<String> = match prices {
        Some(_) => PRICED_HEADERS.iter().map(|h| h.to_string()).collect(),
        None => HEADERS.iter().map(|h| h.to_string()).collect(),
    };
    let rows: Vec<Vec<String>> = report.days.iter().map(|day| row(day, prices)).collect();

    let mut widths: Vec<usize> = headers.iter().map(String::len).collect();
    for cells in &rows {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.len());
        }
    }

    let separator = widths
        .iter()
        .map(|w| "-".repeat(w + 2))
        .collect::<Vec<_>>()
        .join("+");
    let separator = format!("+{separator}+");

    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(out, "Gas usage summary for: {subject}");
    let _ = writeln!(out);
    let _ = writeln!(out, "{separator}");
    let _ = writeln!(out, "{}", format_line(&headers, &widths));
    let _ = writeln!(out, "{}", separator.replace('-', "="));
    for cells in &rows {
        let _ = writeln!(out, "{}", format_line(cells, &widths));
    }
    let _ = writeln!(out, "{separator}");
    let _ = writeln!(out);
    let _ = writeln!(out, "Number of transactions: {}", report.transaction_count);
    match prices {
        Some(prices) => {
            let total_usd: f64 = report
                .days
                .iter()
                .filter_map(|day| prices.value_of(day.date, &day.total_gas_cost))
                .sum();
            let _ = writeln!(
                out,
                "Total gas cost: {} ({})",
                report.total_gas_cost,
                format_usd(total_usd)
            );
        }
        None => {
            let _ = writeln!(out, "Total gas cost: {}", report.total_gas_cost);
        }
    }
    out
}

/// Left-aligns the date column and right-aligns the numeric ones
fn format_line(cells: &[String], widths: &[usize]) -> String {
    let body = cells
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(i, (cell, &width))| {
            if i == 0 {
                format!(" {cell:<width$} ")
            } else {
                format!(" {cell:>width$} ")
            }
        })
        .collect::<Vec<_>>()
        .join("|");
    format!("|{body}|")
}

/// Serializes `report` as pretty-printed JSON
///
/// # Errors
///
/// Returns [`PetroscanError::Serialization`] if serialization fails.
pub fn to_json(report: &GasUsageReport) -> Result<String, PetroscanError> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Writes `report` as JSON to `path`, replacing any existing file
pub async fn write_json(report: &GasUsageReport, path: impl AsRef<Path>) -> Result<(), PetroscanError> {
    let json = to_json(report)?;
    tokio::fs::write(path.as_ref(), json).await?;
    tracing::info!(path = %path.as_ref().display(), "Wrote gas usage report");
    Ok(())
}
