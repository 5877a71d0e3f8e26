// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for the petroscan library.
//!
//! This module provides strongly-typed errors for all public APIs in petroscan.
//! It follows a hybrid approach:
//!
//! - **Module-specific errors** for fine-grained error handling ([`StoreError`],
//!   [`RemoteError`], [`ReconcileError`])
//! - **Unified error type** ([`PetroscanError`]) for convenience when you don't need
//!   to distinguish between error sources
//!
//! # Examples
//!
//! ```rust,ignore
//! use petroscan::{Direction, ReconcileCause, RemoteError};
//!
//! match reconciler.reconcile(address, Direction::Sent).await {
//!     Ok(transactions) => println!("{} transactions", transactions.len()),
//!     Err(e) => match e.cause {
//!         ReconcileCause::Remote(RemoteError::RateLimited { .. }) => {
//!             eprintln!("Throttled while reconciling {}, try again later", e.key);
//!         }
//!         _ => eprintln!("{e}"),
//!     },
//! }
//! ```

mod reconcile;
mod remote;
mod store;

pub use reconcile::{ReconcileCause, ReconcileError};
pub use remote::RemoteError;
pub use store::StoreError;

/// Unified error type for all petroscan operations.
///
/// All module-specific error types convert to `PetroscanError` via `From`
/// implementations, so `?` propagates them naturally.
#[derive(Debug, thiserror::Error)]
pub enum PetroscanError {
    /// Error from a local transaction store.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Error from a remote transaction source.
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    /// Error from cache reconciliation.
    #[error("Reconcile error: {0}")]
    Reconcile(#[from] ReconcileError),

    /// Error serializing a report.
    #[error("Report serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Error writing a report.
    #[error("Report I/O error: {0}")]
    Io(#[from] std::io::Error),
}
