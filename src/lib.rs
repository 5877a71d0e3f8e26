// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! # petroscan
//!
//! Incremental, cached retrieval of Ethereum transaction histories from block
//! explorers, with daily gas usage reports.
//!
//! ## Overview
//!
//! - **Store**: one append-only, ordered collection per (address, direction)
//! - **Source**: paged access to a block explorer (Etherscan `txlist`)
//! - **Reconciler**: fetches only records newer than the cache and persists
//!   each page as it arrives
//! - **Aggregation**: per-day transaction counts, average gas price and cost
//! - **Pricing**: optional USD valuation from daily ETH/USD prices
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use petroscan::{aggregate, render_table, Direction, DiskStore, EtherscanSource,
//!     PetroscanConfigBuilder, Reconciler};
//!
//! let config = PetroscanConfigBuilder::with_defaults().api_key(api_key).build();
//! let reconciler = Reconciler::new(
//!     DiskStore::new(cache_dir).validate()?,
//!     EtherscanSource::new(&config)?,
//!     config.page_size,
//! );
//!
//! let transactions = reconciler.reconcile(address, Direction::Sent).await?;
//! println!("{}", render_table("my wallet", &aggregate(&transactions), None));
//! ```

pub mod bootstrap;
pub mod config;
pub mod errors;
pub mod gas;
pub mod price;
pub mod reconcile;
pub mod report;
pub mod source;
pub mod store;
mod tracing;
pub mod types;

pub use config::{PetroscanConfig, PetroscanConfigBuilder};
pub use errors::{PetroscanError, ReconcileCause, ReconcileError, RemoteError, StoreError};
pub use gas::{aggregate, DailyGasUsage, GasUsageReport};
pub use price::{EthPriceSource, EthPrices, EtherscanPriceSource};
pub use reconcile::{ReconcileReport, Reconciler};
pub use report::{format_usd, render_table, to_json, write_json};
pub use source::{EtherscanSource, TransactionSource};
pub use store::{AppendOutcome, DiskStore, MemoryStore, StoreStats, TransactionStore};
pub use types::cache::{CacheKey, Direction};
pub use types::config::PageSize;
pub use types::gas::{GasAmount, GasPrice};
pub use types::transaction::{Marker, Transaction, TransactionParts};
pub use types::wei::WeiAmount;
