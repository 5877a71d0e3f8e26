// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Incremental cache reconciliation
//!
//! The [`Reconciler`] brings a local [`TransactionStore`] up to date with a
//! [`TransactionSource`] by fetching only what is newer than the last cached
//! record. Each page is persisted before the next is requested, so an
//! interrupted run keeps everything it fetched.
//!
//! # Examples
//!
//! ```rust,ignore
//! use petroscan::{Direction, DiskStore, EtherscanSource, PageSize, Reconciler};
//!
//! let store = DiskStore::new(cache_dir).validate()?;
//! let source = EtherscanSource::new(&config)?;
//! let reconciler = Reconciler::new(store, source, PageSize::DEFAULT);
//!
//! let transactions = reconciler.reconcile(address, Direction::Sent).await?;
//! ```

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn, Instrument};

use crate::errors::{ReconcileCause, ReconcileError, RemoteError};
use crate::source::TransactionSource;
use crate::store::TransactionStore;
use crate::tracing::spans;
use crate::types::cache::{CacheKey, Direction};
use crate::types::config::PageSize;
use crate::types::transaction::{Marker, Transaction};

/// Pagination state for one reconciliation
#[derive(Debug)]
enum ReconcileState {
    /// Next request starts after `marker` (`None` = from genesis)
    Fetching { marker: Option<Marker> },
    Done,
    Failed(ReconcileCause),
}

/// Summary of a reconciliation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport {
    /// Full ordered sequence after the run
    pub transactions: Vec<Transaction>,
    /// Requests made, including the final empty one
    pub pages_fetched: usize,
    /// Records received from the source
    pub fetched: usize,
    /// Records newly persisted
    pub appended: usize,
    /// Received records that were already cached
    pub duplicates: usize,
    /// Size of the cache before the run
    pub cached_before: usize,
}

/// Keeps a local transaction store in sync with a remote source
pub struct Reconciler<S, R> {
    store: S,
    source: R,
    page_size: PageSize,
}

impl<S, R> Reconciler<S, R>
where
    S: TransactionStore,
    R: TransactionSource,
{
    pub fn new(store: S, source: R, page_size: PageSize) -> Self {
        Self {
            store,
            source,
            page_size,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn source(&self) -> &R {
        &self.source
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    /// Brings the cache for `(address, direction)` up to date and returns the
    /// full ordered transaction sequence
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError`] naming the cache key when the store cannot
    /// be read or written, or when the source fails. Pages persisted before
    /// the failure stay cached.
    pub async fn reconcile(
        &self,
        address: Address,
        direction: Direction,
    ) -> Result<Vec<Transaction>, ReconcileError> {
        self.reconcile_with_report(address, direction)
            .await
            .map(|report| report.transactions)
    }

    /// Like [`reconcile`](Self::reconcile), but also reports what the run did
    pub async fn reconcile_with_report(
        &self,
        address: Address,
        direction: Direction,
    ) -> Result<ReconcileReport, ReconcileError> {
        let key = CacheKey::new(address, direction);
        let span = spans::reconcile(&key, self.source.name(), self.store.name());

        self.run(key)
            .instrument(span)
            .await
            .map_err(|cause| ReconcileError::new(key, cause))
    }

    /// Currently persisted sequence for `(address, direction)`, without
    /// touching the source
    pub async fn cached(
        &self,
        address: Address,
        direction: Direction,
    ) -> Result<Vec<Transaction>, ReconcileError> {
        let key = CacheKey::new(address, direction);
        self.store
            .load(&key)
            .await
            .map_err(|e| ReconcileError::new(key, e))
    }

    async fn run(&self, key: CacheKey) -> Result<ReconcileReport, ReconcileCause> {
        self.store.initialize(&key).await?;
        let cached = self.store.load(&key).await?;

        let mut report = ReconcileReport {
            cached_before: cached.len(),
            ..ReconcileReport::default()
        };
        let mut state = ReconcileState::Fetching {
            marker: cached.last().map(Transaction::marker),
        };
        drop(cached);

        debug!(cached = report.cached_before, "Starting reconciliation");

        loop {
            state = match state {
                ReconcileState::Fetching { marker } => self.step(&key, marker, &mut report).await,
                ReconcileState::Done => break,
                ReconcileState::Failed(cause) => {
                    warn!(
                        pages_fetched = report.pages_fetched,
                        appended = report.appended,
                        error = %cause,
                        "Reconciliation stopped, keeping pages persisted so far"
                    );
                    return Err(cause);
                }
            };
        }

        report.transactions = self.store.load(&key).await?;

        info!(
            pages_fetched = report.pages_fetched,
            fetched = report.fetched,
            appended = report.appended,
            duplicates = report.duplicates,
            total = report.transactions.len(),
            "Reconciliation complete"
        );
        Ok(report)
    }

    /// Fetches and persists one page, returning the next state
    async fn step(
        &self,
        key: &CacheKey,
        marker: Option<Marker>,
        report: &mut ReconcileReport,
    ) -> ReconcileState {
        report.pages_fetched += 1;
        let span = spans::fetch_page(key, marker.map(|m| m.to_string()), report.pages_fetched);

        let page = match self
            .source
            .fetch_page(key.address(), key.direction(), marker, self.page_size)
            .instrument(span)
            .await
        {
            Ok(page) => page,
            Err(e) => return ReconcileState::Failed(e.into()),
        };

        let Some(highest) = page.iter().map(Transaction::marker).max() else {
            return ReconcileState::Done;
        };

        if let Some(current) = marker.filter(|current| highest <= *current) {
            return ReconcileState::Failed(
                RemoteError::data(format!(
                    "{} returned a page ending at {highest}, not after {current}",
                    self.source.name(),
                ))
                .into(),
            );
        }

        report.fetched += page.len();
        let outcome = match self
            .store
            .append(key, &page)
            .instrument(spans::append(key, page.len()))
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => return ReconcileState::Failed(e.into()),
        };
        report.appended += outcome.appended;
        report.duplicates += outcome.duplicates;

        debug!(
            received = page.len(),
            appended = outcome.appended,
            duplicates = outcome.duplicates,
            marker = %highest,
            "Persisted page"
        );

        ReconcileState::Fetching {
            marker: Some(highest),
        }
    }
}
