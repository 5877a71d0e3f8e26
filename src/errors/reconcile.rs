// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Error type for cache reconciliation.

use super::{RemoteError, StoreError};
use crate::types::cache::CacheKey;

/// Underlying reason a reconciliation stopped.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileCause {
    /// Local persistence failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The remote source failed.
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// A reconciliation failure for one cache key.
///
/// Pages persisted before the failure stay cached. Calling
/// [`Reconciler::cached`](crate::Reconciler::cached) afterwards returns them.
#[derive(Debug, thiserror::Error)]
#[error("Reconciliation failed for {key}: {cause}")]
pub struct ReconcileError {
    /// The address and direction that failed
    pub key: CacheKey,
    /// What went wrong
    #[source]
    pub cause: ReconcileCause,
}

impl ReconcileError {
    pub fn new(key: CacheKey, cause: impl Into<ReconcileCause>) -> Self {
        Self {
            key,
            cause: cause.into(),
        }
    }

    /// Whether the failure came from the remote source (as opposed to the store).
    pub fn is_remote(&self) -> bool {
        matches!(self.cause, ReconcileCause::Remote(_))
    }
}
