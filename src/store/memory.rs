// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! In-memory transaction store

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

use super::{merge_records, AppendOutcome, StoreStats, TransactionStore};
use crate::errors::StoreError;
use crate::types::cache::CacheKey;
use crate::types::transaction::Transaction;

#[derive(Debug, Default)]
struct MemoryStoreState {
    collections: HashMap<CacheKey, Vec<Transaction>>,
    stats: StoreStats,
}

/// Process-local transaction store
///
/// Nothing survives the process. Useful for tests, dry runs, and callers that
/// bring their own persistence.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryStoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a collection (possibly empty) exists for `key`
    pub async fn contains(&self, key: &CacheKey) -> bool {
        self.state.lock().await.collections.contains_key(key)
    }
}

#[async_trait]
impl TransactionStore for MemoryStore {
    async fn load(&self, key: &CacheKey) -> Result<Vec<Transaction>, StoreError> {
        let mut state = self.state.lock().await;
        state.stats.loads += 1;
        Ok(state.collections.get(key).cloned().unwrap_or_default())
    }

    async fn append(
        &self,
        key: &CacheKey,
        records: &[Transaction],
    ) -> Result<AppendOutcome, StoreError> {
        let mut state = self.state.lock().await;
        let state = &mut *state;

        let collection = state.collections.entry(*key).or_default();
        let outcome = merge_records(collection, records);

        state.stats.duplicates_skipped += outcome.duplicates as u64;
        if outcome.appended > 0 {
            state.stats.writes += 1;
            state.stats.appended += outcome.appended as u64;
        }

        debug!(key = %key, appended = outcome.appended, total = outcome.total, "Appended to memory store");
        Ok(outcome)
    }

    async fn initialize(&self, key: &CacheKey) -> Result<(), StoreError> {
        self.state
            .lock()
            .await
            .collections
            .entry(*key)
            .or_default();
        Ok(())
    }

    async fn stats(&self) -> StoreStats {
        self.state.lock().await.stats.clone()
    }

    fn name(&self) -> &'static str {
        "MemoryStore"
    }
}
