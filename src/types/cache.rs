// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Cache keys identifying one independently reconciled transaction history

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::transaction::Transaction;

/// Which side of a transaction the tracked address is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Transactions sent from the address (the address pays the gas)
    Sent,
    /// Transactions whose receiver is the address
    Received,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::Sent, Direction::Received];

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Sent => "sent",
            Direction::Received => "received",
        }
    }

    /// Whether `tx` belongs to `address` in this direction
    ///
    /// A self-transfer matches both directions.
    pub fn matches(&self, address: Address, tx: &Transaction) -> bool {
        match self {
            Direction::Sent => tx.sender() == address,
            Direction::Received => tx.receiver() == Some(address),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sent" | "outgoing" => Ok(Direction::Sent),
            "received" | "incoming" => Ok(Direction::Received),
            other => Err(format!(
                "invalid direction '{other}', expected 'sent' or 'received'"
            )),
        }
    }
}

/// Key for one persisted transaction collection: `(address, direction)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub(crate) address: Address,
    pub(crate) direction: Direction,
}

impl CacheKey {
    /// Creates a new cache key for an address and direction
    pub fn new(address: Address, direction: Direction) -> Self {
        Self { address, direction }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// File-system friendly stem: `<lowercase-hex-address>-<direction>`
    pub fn file_stem(&self) -> String {
        format!("{:#x}-{}", self.address, self.direction)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}:{}", self.address, self.direction)
    }
}
