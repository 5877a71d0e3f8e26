// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Local transaction stores
//!
//! A store holds one ordered, append-only transaction collection per
//! [`CacheKey`]. Two backends are provided:
//!
//! - [`DiskStore`]: one versioned JSON file per cache key, written atomically
//! - [`MemoryStore`]: process-local, for tests and ephemeral runs
//!
//! # Examples
//!
//! ```rust,ignore
//! use petroscan::{CacheKey, Direction, DiskStore, TransactionStore};
//!
//! let store = DiskStore::new("/var/cache/petroscan").validate()?;
//! let key = CacheKey::new(address, Direction::Sent);
//!
//! let cached = store.load(&key).await?;
//! let outcome = store.append(&key, &fresh_page).await?;
//! println!("{} new, {} duplicates", outcome.appended, outcome.duplicates);
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::errors::StoreError;
use crate::types::cache::CacheKey;
use crate::types::transaction::{Marker, Transaction};

mod disk;
mod memory;

pub use disk::DiskStore;
pub use memory::MemoryStore;

/// Result of merging a batch of records into a store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppendOutcome {
    /// Records that were new and are now stored
    pub appended: usize,
    /// Records skipped because their hash was already known
    pub duplicates: usize,
    /// Size of the collection after the merge
    pub total: usize,
}

/// Statistics about store activity (in-memory only, not persisted)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    /// Number of collections loaded
    pub loads: u64,
    /// Number of durable writes
    pub writes: u64,
    /// Records appended across all writes
    pub appended: u64,
    /// Duplicate records skipped
    pub duplicates_skipped: u64,
}

impl fmt::Display for StoreStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "loads={}, writes={}, appended={}, duplicates_skipped={}",
            self.loads, self.writes, self.appended, self.duplicates_skipped
        )
    }
}

/// Trait for transaction store backends
///
/// # Invariants
///
/// - A hash appears at most once per cache key.
/// - Loaded collections are sorted ascending by [`Marker`].
/// - A persisted record is never modified or removed.
///
/// # Error Handling
///
/// Unlike a best-effort cache, store failures are surfaced: losing or
/// duplicating history would silently skew gas reports.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Loads the full collection for `key`
    ///
    /// Returns an empty vec when nothing was stored yet.
    async fn load(&self, key: &CacheKey) -> Result<Vec<Transaction>, StoreError>;

    /// Merges `records` into the collection and persists the result
    ///
    /// Records whose hash is already stored (or repeated within `records`)
    /// are skipped. When nothing new remains, no write happens.
    async fn append(
        &self,
        key: &CacheKey,
        records: &[Transaction],
    ) -> Result<AppendOutcome, StoreError>;

    /// Creates an empty, valid collection for `key` if none exists
    ///
    /// Never rewrites an existing collection.
    async fn initialize(&self, key: &CacheKey) -> Result<(), StoreError>;

    /// Marker of the last stored record, or `None` for an empty collection
    async fn last_known_marker(&self, key: &CacheKey) -> Result<Option<Marker>, StoreError> {
        Ok(self.load(key).await?.last().map(Transaction::marker))
    }

    /// Returns current store statistics
    async fn stats(&self) -> StoreStats;

    /// Returns a human-readable name for this store backend
    fn name(&self) -> &'static str;
}

/// Merges `records` into `existing`, skipping known hashes
///
/// The result is sorted by marker. The sort is stable and a no-op in the
/// common case where every new record is newer than the stored tail.
pub(crate) fn merge_records(
    existing: &mut Vec<Transaction>,
    records: &[Transaction],
) -> AppendOutcome {
    let mut seen: HashSet<_> = existing.iter().map(Transaction::hash).collect();
    let mut outcome = AppendOutcome::default();

    for record in records {
        if seen.insert(record.hash()) {
            existing.push(record.clone());
            outcome.appended += 1;
        } else {
            outcome.duplicates += 1;
        }
    }

    if outcome.appended > 0 {
        existing.sort_by_key(Transaction::marker);
    }
    outcome.total = existing.len();
    outcome
}

/// Checks the ordering and uniqueness invariants of a loaded collection
///
/// Returns a description of the first violation found.
pub(crate) fn check_invariants(records: &[Transaction]) -> Result<(), String> {
    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        if !seen.insert(record.hash()) {
            return Err(format!("duplicate transaction {}", record.hash()));
        }
    }
    if let Some(pair) = records.windows(2).find(|w| w[0].marker() > w[1].marker()) {
        return Err(format!(
            "transactions out of order: {} before {}",
            pair[0].marker(),
            pair[1].marker()
        ));
    }
    Ok(())
}
