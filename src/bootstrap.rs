// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use alloy_primitives::Address;
use anyhow::Context;
use clap::{Parser, ValueEnum};
use dotenvy::dotenv;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use url::Url;

use crate::config::constants::CACHE_DIR_NAME;
use crate::{
    aggregate, render_table, to_json, write_json, Direction, DiskStore, EthPriceSource, EthPrices,
    EtherscanPriceSource, EtherscanSource, GasUsageReport, PetroscanConfigBuilder, Reconciler,
};

/// Which transaction histories to report on
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DirectionArg {
    Sent,
    Received,
    Both,
}

impl DirectionArg {
    fn directions(self) -> &'static [Direction] {
        match self {
            DirectionArg::Sent => &[Direction::Sent],
            DirectionArg::Received => &[Direction::Received],
            DirectionArg::Both => &Direction::ALL,
        }
    }
}

/// Daily gas usage report for an Ethereum address, backed by a local cache
#[derive(Debug, Parser)]
#[command(name = "petroscan", version, about)]
pub struct Cli {
    /// Ethereum address to report on
    pub address: Address,

    /// Etherscan API key
    #[arg(long, env = "ETHERSCAN_API_KEY", hide_env_values = true)]
    pub etherscan_api_key: Option<String>,

    /// Etherscan-compatible API endpoint
    #[arg(long, env = "ETHERSCAN_API_URL")]
    pub api_url: Option<Url>,

    /// Transaction direction to report on
    #[arg(long, value_enum, default_value_t = DirectionArg::Sent)]
    pub direction: DirectionArg,

    /// Cache directory (defaults to the OS cache dir)
    #[arg(long, env = "PETROSCAN_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Records requested per page
    #[arg(long, default_value_t = crate::PageSize::DEFAULT.as_usize())]
    pub page_size: usize,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,

    /// Skip the ETH/USD price download and the USD columns
    #[arg(long)]
    pub no_usd: bool,

    /// Also write the JSON report to this file
    #[arg(long)]
    pub output: Option<PathBuf>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn default_cache_dir() -> anyhow::Result<PathBuf> {
    dirs::cache_dir()
        .map(|dir| dir.join(CACHE_DIR_NAME))
        .context("No OS cache directory available, pass --cache-dir")
}

/// Per-direction file name when several reports share one `--output`
fn output_path(base: &Path, direction: Direction, several: bool) -> PathBuf {
    if !several {
        return base.to_path_buf();
    }
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string());
    let extension = base
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "json".to_string());
    base.with_file_name(format!("{stem}-{direction}.{extension}"))
}

/// Writes one JSON report, logging a failure instead of aborting the run
async fn write_report_file(report: &GasUsageReport, path: &Path) -> bool {
    match write_json(report, path).await {
        Ok(()) => true,
        Err(e) => {
            error!(path = %path.display(), error = %e, "Failed to write report file");
            false
        }
    }
}

/// Downloads daily ETH/USD prices, or `None` with a warning when unavailable
async fn load_prices(source: &impl EthPriceSource) -> Option<EthPrices> {
    match source.daily_prices().await {
        Ok(prices) => {
            info!(source = source.name(), days = prices.len(), "Loaded ETH/USD prices");
            Some(prices)
        }
        Err(e) => {
            warn!(source = source.name(), error = %e, "ETH/USD prices unavailable, omitting USD columns");
            None
        }
    }
}

/// Main entry point for the application.
///
/// Returns a failure exit code when any history could not be brought up to
/// date, even if a stale report was printed for it.
pub async fn run() -> anyhow::Result<ExitCode> {
    // Load environment variables
    dotenv().ok();
    let cli = Cli::parse();
    init_tracing();

    let cache_dir = match cli.cache_dir {
        Some(dir) => dir,
        None => default_cache_dir()?,
    };

    let mut builder = PetroscanConfigBuilder::with_defaults().page_size(cli.page_size);
    if let Some(key) = cli.etherscan_api_key {
        builder = builder.api_key(key);
    }
    if let Some(url) = cli.api_url {
        builder = builder.api_url(url);
    }
    let config = builder.build();

    let store = DiskStore::new(&cache_dir)
        .validate()
        .with_context(|| format!("Cache directory {} is not usable", cache_dir.display()))?;
    let source = EtherscanSource::new(&config)?;
    let reconciler = Reconciler::new(store, source, config.page_size);

    info!(address = %cli.address, cache_dir = %cache_dir.display(), "Starting petroscan");

    let prices = if cli.json || cli.no_usd {
        None
    } else {
        load_prices(&EtherscanPriceSource::new(&config)?).await
    };

    let directions = cli.direction.directions();
    let mut failed = false;

    for &direction in directions {
        let transactions = match reconciler.reconcile_with_report(cli.address, direction).await {
            Ok(report) => {
                info!(
                    direction = %direction,
                    cached_before = report.cached_before,
                    appended = report.appended,
                    total = report.transactions.len(),
                    "Cache up to date"
                );
                report.transactions
            }
            Err(e) => {
                failed = true;
                error!(key = %e.key, error = %e.cause, "Failed to update transaction cache");
                match reconciler.cached(cli.address, direction).await {
                    Ok(stale) => {
                        warn!(key = %e.key, transactions = stale.len(), "Reporting stale cached data");
                        stale
                    }
                    Err(e) => {
                        error!(key = %e.key, error = %e.cause, "Cached data unavailable, skipping");
                        continue;
                    }
                }
            }
        };

        let report = aggregate(&transactions);
        if cli.json {
            println!("{}", to_json(&report)?);
        } else {
            println!();
            let subject = format!("{:#x} ({direction})", cli.address);
            print!("{}", render_table(&subject, &report, prices.as_ref()));
            println!();
        }

        if let Some(base) = &cli.output {
            let path = output_path(base, direction, directions.len() > 1);
            if !write_report_file(&report, &path).await {
                failed = true;
            }
        }
    }

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
