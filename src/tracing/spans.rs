// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Span creation helpers for petroscan operations.
//!
//! Telemetry is kept apart from business logic: instead of `#[instrument]`
//! attributes, each instrumented operation has a span helper here.
//!
//! Usage pattern:
//! ```rust,ignore
//! pub async fn my_operation(&self, param: Type) -> Result<T> {
//!     async {
//!         // Business logic here
//!     }
//!     .instrument(spans::my_operation(param_value))
//!     .await
//! }
//! ```

use alloy_primitives::Address;
use tracing::{Level, Span};

use crate::types::cache::{CacheKey, Direction};

/// Create span for bringing one cache key up to date.
///
/// Parent: None (root span for this operation)
/// Children: fetch_page and append spans (one per page)
#[inline]
pub(crate) fn reconcile(key: &CacheKey, source: &'static str, store: &'static str) -> Span {
    tracing::span!(
        Level::INFO,
        "petroscan.reconcile",
        address = %key.address(),
        direction = %key.direction(),
        source = source,
        store = store,
    )
}

/// Create span for requesting one page from a transaction source.
///
/// Parent: reconcile span
/// Children: fetch_txlist_page spans
#[inline]
pub(crate) fn fetch_page(key: &CacheKey, marker: Option<String>, page_number: usize) -> Span {
    tracing::debug_span!(
        "petroscan.fetch_page",
        address = %key.address(),
        direction = %key.direction(),
        after = marker.as_deref().unwrap_or("start"),
        page_number = page_number,
    )
}

/// Create span for one raw Etherscan `txlist` request.
///
/// Parent: fetch_page span
/// Children: None
#[inline]
pub(crate) fn fetch_txlist_page(
    address: Address,
    direction: Direction,
    start_block: u64,
    page: usize,
) -> Span {
    tracing::trace_span!(
        "petroscan.fetch_txlist_page",
        address = %address,
        direction = %direction,
        start_block = start_block,
        page = page,
    )
}

/// Create span for persisting a fetched page.
///
/// Parent: reconcile span
/// Children: None
#[inline]
pub(crate) fn append(key: &CacheKey, records: usize) -> Span {
    tracing::debug_span!(
        "petroscan.append",
        address = %key.address(),
        direction = %key.direction(),
        records = records,
    )
}

/// Create span for aggregating gas usage.
#[inline]
pub(crate) fn aggregate(transactions: usize) -> Span {
    tracing::debug_span!("petroscan.aggregate", transactions = transactions)
}

/// Create span for downloading historical ETH/USD prices.
///
/// Parent: None
/// Children: None
#[inline]
pub(crate) fn fetch_prices(source: &'static str) -> Span {
    tracing::debug_span!("petroscan.fetch_prices", source = source)
}
