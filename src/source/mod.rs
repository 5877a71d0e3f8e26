// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Remote transaction sources
//!
//! This module provides a trait-based boundary around block explorers. The
//! [`Reconciler`](crate::Reconciler) only ever talks to a [`TransactionSource`],
//! so tests can substitute a scripted source and other explorers can be added
//! without touching the reconciliation logic.
//!
//! # Contract
//!
//! [`TransactionSource::fetch_page`] returns records for one address and
//! direction that are strictly after the given marker, ascending, and at most
//! `page_size` long. An empty page means there is nothing more to fetch.
//!
//! # Example: a fixed in-memory source
//!
//! ```rust,ignore
//! use petroscan::{Direction, Marker, PageSize, RemoteError, Transaction, TransactionSource};
//!
//! struct FixedSource(Vec<Transaction>);
//!
//! #[async_trait::async_trait]
//! impl TransactionSource for FixedSource {
//!     async fn fetch_page(
//!         &self,
//!         address: Address,
//!         direction: Direction,
//!         after: Option<Marker>,
//!         page_size: PageSize,
//!     ) -> Result<Vec<Transaction>, RemoteError> {
//!         Ok(self.0.iter()
//!             .filter(|tx| direction.matches(address, tx))
//!             .filter(|tx| after.is_none_or(|m| tx.marker() > m))
//!             .take(page_size.as_usize())
//!             .cloned()
//!             .collect())
//!     }
//!
//!     fn name(&self) -> &'static str { "FixedSource" }
//! }
//! ```

use alloy_primitives::Address;
use async_trait::async_trait;

use crate::errors::RemoteError;
use crate::types::cache::Direction;
use crate::types::config::PageSize;
use crate::types::transaction::{Marker, Transaction};

pub mod etherscan;

pub use etherscan::EtherscanSource;

/// Trait for fetching transaction pages from a remote data source
///
/// Implementations are read-only: no caching, no retries. Those concerns
/// belong to the store and to the caller respectively.
#[async_trait]
pub trait TransactionSource: Send + Sync {
    /// Fetches the next page of transactions after `after` (exclusive)
    ///
    /// `None` means "from the beginning of history".
    ///
    /// # Errors
    ///
    /// - [`RemoteError::Unavailable`] on transport failure
    /// - [`RemoteError::RateLimited`] when the provider throttles
    /// - [`RemoteError::Data`] when the response is malformed
    async fn fetch_page(
        &self,
        address: Address,
        direction: Direction,
        after: Option<Marker>,
        page_size: PageSize,
    ) -> Result<Vec<Transaction>, RemoteError>;

    /// Returns a human-readable name for this source
    ///
    /// Used for logging and debugging.
    fn name(&self) -> &'static str;
}
