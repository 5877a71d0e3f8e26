// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Test helpers for petroscan integration tests
//!
//! Provides a mock transaction source and record builders so that
//! reconciliation can be tested without a block explorer.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use alloy_primitives::{address, Address, B256};
use async_trait::async_trait;
use petroscan::{
    Direction, GasAmount, GasPrice, Marker, PageSize, RemoteError, Transaction, TransactionParts,
    TransactionSource,
};

pub const ALICE: Address = address!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
pub const BOB: Address = address!("bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb");

/// 2018-02-01T00:00:00Z
pub const DAY_ONE: u64 = 1_517_443_200;
pub const SECONDS_PER_DAY: u64 = 86_400;

/// Builds a record with a hash derived from its position
pub fn transaction(
    block_number: u64,
    transaction_index: u64,
    from: Address,
    to: Address,
    gas_price_gwei: u64,
) -> Transaction {
    let mut hash = B256::ZERO;
    hash[..8].copy_from_slice(&block_number.to_be_bytes());
    hash[8..16].copy_from_slice(&transaction_index.to_be_bytes());

    Transaction::from(TransactionParts {
        hash,
        block_number,
        transaction_index,
        timestamp: DAY_ONE + block_number,
        from,
        to: Some(to),
        gas_price: GasPrice::from_gwei(gas_price_gwei),
        gas_used: GasAmount::new(21_000),
        is_error: false,
    })
}

/// `count` records sent by ALICE to BOB, one per block starting at `first_block`
pub fn history(first_block: u64, count: u64) -> Vec<Transaction> {
    (first_block..first_block + count)
        .map(|block| transaction(block, 0, ALICE, BOB, 10))
        .collect()
}

/// Mock TransactionSource that serves pages from an in-memory chain
///
/// Honors the source contract (ascending, strictly after the marker, at most
/// `page_size`, filtered by direction) and can be told to fail.
///
/// # Example
///
/// ```rust,ignore
/// let source = MockSource::new(history(1, 10)).fail_after(2);
/// let reconciler = Reconciler::new(store, source, PageSize::new(3));
/// ```
pub struct MockSource {
    chain: Mutex<Vec<Transaction>>,
    fail_after: Option<usize>,
    calls: AtomicUsize,
    requested: Mutex<Vec<Option<Marker>>>,
}

impl MockSource {
    pub fn new(mut chain: Vec<Transaction>) -> Self {
        chain.sort_by_key(Transaction::marker);
        Self {
            chain: Mutex::new(chain),
            fail_after: None,
            calls: AtomicUsize::new(0),
            requested: Mutex::new(Vec::new()),
        }
    }

    /// Succeed for the first `pages` calls, then return `Unavailable`
    pub fn fail_after(mut self, pages: usize) -> Self {
        self.fail_after = Some(pages);
        self
    }

    /// Simulates new on-chain activity
    pub fn extend(&self, records: Vec<Transaction>) {
        let mut chain = self.chain.lock().unwrap();
        chain.extend(records);
        chain.sort_by_key(Transaction::marker);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requested_markers(&self) -> Vec<Option<Marker>> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl TransactionSource for MockSource {
    async fn fetch_page(
        &self,
        address: Address,
        direction: Direction,
        after: Option<Marker>,
        page_size: PageSize,
    ) -> Result<Vec<Transaction>, RemoteError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().unwrap().push(after);

        if self.fail_after.is_some_and(|limit| call >= limit) {
            return Err(RemoteError::unavailable(
                "mock txlist",
                std::io::Error::new(std::io::ErrorKind::ConnectionReset, "connection reset"),
            ));
        }

        Ok(self
            .chain
            .lock()
            .unwrap()
            .iter()
            .filter(|tx| direction.matches(address, tx))
            .filter(|tx| after.is_none_or(|marker| tx.marker() > marker))
            .take(page_size.as_usize())
            .cloned()
            .collect())
    }

    fn name(&self) -> &'static str {
        "MockSource"
    }
}
