// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Normalized transaction records and their ordering cursor

use alloy_primitives::{Address, BlockNumber, TxHash};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::gas::{GasAmount, GasPrice};
use super::wei::WeiAmount;

/// Position of a transaction in chain history
///
/// Ordered by block number, then by index within the block. A marker is the
/// forward-progress cursor used during reconciliation: everything at or
/// before it is known.
///
/// ```
/// use petroscan::Marker;
///
/// assert!(Marker::new(10, 5) < Marker::new(11, 0));
/// assert!(Marker::new(10, 5) < Marker::new(10, 6));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Marker {
    pub block_number: BlockNumber,
    pub transaction_index: u64,
}

impl Marker {
    pub const fn new(block_number: BlockNumber, transaction_index: u64) -> Self {
        Self {
            block_number,
            transaction_index,
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.block_number, self.transaction_index)
    }
}

/// Input fields for building a [`Transaction`]
///
/// The gas cost is not part of the input. It is always derived from
/// `gas_price` and `gas_used` so a record can never carry an inconsistent cost.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TransactionParts {
    pub hash: TxHash,
    pub block_number: BlockNumber,
    pub transaction_index: u64,
    pub timestamp: u64,
    pub from: Address,
    pub to: Option<Address>,
    pub gas_price: GasPrice,
    pub gas_used: GasAmount,
    #[serde(default)]
    pub is_error: bool,
}

/// An immutable, normalized transaction record
///
/// Records are identified by their hash and ordered by [`Marker`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TransactionParts")]
pub struct Transaction {
    hash: TxHash,
    block_number: BlockNumber,
    transaction_index: u64,
    timestamp: u64,
    from: Address,
    to: Option<Address>,
    gas_price: GasPrice,
    gas_used: GasAmount,
    gas_cost: WeiAmount,
    is_error: bool,
}

impl From<TransactionParts> for Transaction {
    fn from(parts: TransactionParts) -> Self {
        Self {
            gas_cost: parts.gas_price * parts.gas_used,
            hash: parts.hash,
            block_number: parts.block_number,
            transaction_index: parts.transaction_index,
            timestamp: parts.timestamp,
            from: parts.from,
            to: parts.to,
            gas_price: parts.gas_price,
            gas_used: parts.gas_used,
            is_error: parts.is_error,
        }
    }
}

impl Transaction {
    pub fn hash(&self) -> TxHash {
        self.hash
    }

    pub fn block_number(&self) -> BlockNumber {
        self.block_number
    }

    pub fn transaction_index(&self) -> u64 {
        self.transaction_index
    }

    /// Unix timestamp (seconds) of the including block
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn sender(&self) -> Address {
        self.from
    }

    /// Receiver, or `None` for contract creation
    pub fn receiver(&self) -> Option<Address> {
        self.to
    }

    pub fn gas_price(&self) -> GasPrice {
        self.gas_price
    }

    pub fn gas_used(&self) -> GasAmount {
        self.gas_used
    }

    /// `gas_price * gas_used`, in wei
    pub fn gas_cost(&self) -> WeiAmount {
        self.gas_cost
    }

    /// Whether execution failed (reverted or out of gas)
    pub fn is_error(&self) -> bool {
        self.is_error
    }

    pub fn marker(&self) -> Marker {
        Marker::new(self.block_number, self.transaction_index)
    }

    /// UTC calendar day of the including block
    ///
    /// Sources reject timestamps outside the calendar range, so the epoch
    /// fallback only applies to hand-built records.
    pub fn date(&self) -> NaiveDate {
        utc_date(self.timestamp).unwrap_or_default()
    }
}

/// UTC calendar day of a unix timestamp, `None` when out of range
pub(crate) fn utc_date(timestamp: u64) -> Option<NaiveDate> {
    i64::try_from(timestamp)
        .ok()
        .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
        .map(|dt| dt.date_naive())
}
