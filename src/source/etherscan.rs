// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Etherscan `account/txlist` transaction source
//!
//! Etherscan's `startblock` is inclusive and works at block granularity,
//! while [`TransactionSource`] promises records strictly after a
//! `(block, index)` marker. This source bridges the two: it asks for
//! everything from the marker's block onward, drops records at or before the
//! marker (and records for the other direction), and keeps reading forward
//! when a full page yields nothing new.

use alloy_primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use serde::Deserialize;
use std::str::FromStr;
use tracing::{debug, warn, Instrument};
use url::Url;

use super::TransactionSource;
use crate::config::constants::ETHERSCAN_END_BLOCK;
use crate::config::PetroscanConfig;
use crate::errors::RemoteError;
use crate::tracing::spans;
use crate::types::cache::Direction;
use crate::types::config::PageSize;
use crate::types::gas::{GasAmount, GasPrice};
use crate::types::transaction::{utc_date, Marker, Transaction, TransactionParts};

/// Message Etherscan returns with `status = "0"` for an empty result set
const NO_TRANSACTIONS_MESSAGE: &str = "No transactions found";

/// Envelope of every Etherscan API response
#[derive(Debug, Deserialize)]
struct EtherscanResponse {
    status: String,
    message: String,
    /// An array of records on success, an explanatory string on failure
    result: serde_json::Value,
}

/// One `txlist` record; Etherscan encodes every field as a string
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EtherscanTransaction {
    block_number: String,
    time_stamp: String,
    hash: String,
    transaction_index: String,
    from: String,
    #[serde(default)]
    to: String,
    gas_price: String,
    gas_used: String,
    #[serde(default)]
    is_error: String,
    #[serde(default, rename = "txreceipt_status")]
    txreceipt_status: String,
}

impl TryFrom<EtherscanTransaction> for Transaction {
    type Error = RemoteError;

    fn try_from(raw: EtherscanTransaction) -> Result<Self, Self::Error> {
        let hash = TxHash::from_str(&raw.hash)
            .map_err(|e| RemoteError::data(format!("invalid hash '{}': {e}", raw.hash)))?;
        let context = |field: &str, value: &str| {
            RemoteError::data(format!("invalid {field} '{value}' in transaction {hash}"))
        };

        let timestamp: u64 = raw
            .time_stamp
            .parse()
            .map_err(|_| context("timeStamp", &raw.time_stamp))?;
        if utc_date(timestamp).is_none() {
            return Err(context("timeStamp", &raw.time_stamp));
        }

        let to = if raw.to.is_empty() {
            None
        } else {
            Some(Address::from_str(&raw.to).map_err(|_| context("to", &raw.to))?)
        };

        Ok(Transaction::from(TransactionParts {
            hash,
            block_number: raw
                .block_number
                .parse()
                .map_err(|_| context("blockNumber", &raw.block_number))?,
            transaction_index: raw
                .transaction_index
                .parse()
                .map_err(|_| context("transactionIndex", &raw.transaction_index))?,
            timestamp,
            from: Address::from_str(&raw.from).map_err(|_| context("from", &raw.from))?,
            to,
            gas_price: GasPrice::from(
                U256::from_str(&raw.gas_price).map_err(|_| context("gasPrice", &raw.gas_price))?,
            ),
            gas_used: GasAmount::from(
                U256::from_str(&raw.gas_used).map_err(|_| context("gasUsed", &raw.gas_used))?,
            ),
            is_error: raw.is_error == "1" || raw.txreceipt_status == "0",
        }))
    }
}

/// Parses a `txlist` response body into records, in response order
pub(crate) fn parse_response(body: &[u8]) -> Result<Vec<Transaction>, RemoteError> {
    let response: EtherscanResponse = serde_json::from_slice(body)
        .map_err(|e| RemoteError::data(format!("response is not a valid Etherscan envelope: {e}")))?;

    if response.status != "1" {
        if response.message == NO_TRANSACTIONS_MESSAGE {
            return Ok(Vec::new());
        }

        let details = match &response.result {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        if details.to_ascii_lowercase().contains("rate limit") {
            return Err(RemoteError::rate_limited(details));
        }
        return Err(RemoteError::data(format!(
            "Etherscan returned status {} ({}): {}",
            response.status, response.message, details
        )));
    }

    let records: Vec<EtherscanTransaction> = serde_json::from_value(response.result)
        .map_err(|e| RemoteError::data(format!("malformed transaction list: {e}")))?;

    records.into_iter().map(Transaction::try_from).collect()
}

/// Records from a raw page that belong to this request
fn select(
    raw: Vec<Transaction>,
    address: Address,
    direction: Direction,
    after: Option<Marker>,
) -> Vec<Transaction> {
    raw.into_iter()
        .filter(|tx| after.is_none_or(|marker| tx.marker() > marker))
        .filter(|tx| direction.matches(address, tx))
        .collect()
}

/// Transaction source backed by the Etherscan HTTP API
///
/// # Examples
///
/// ```rust,ignore
/// use petroscan::{EtherscanSource, PetroscanConfigBuilder};
///
/// let config = PetroscanConfigBuilder::with_defaults().api_key("KEY").build();
/// let source = EtherscanSource::new(&config)?;
/// ```
#[derive(Clone)]
pub struct EtherscanSource {
    http: reqwest::Client,
    api_url: Url,
    api_key: Option<String>,
    rate_limit_delay: Option<std::time::Duration>,
}

impl std::fmt::Debug for EtherscanSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EtherscanSource")
            .field("api_url", &self.api_url.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("rate_limit_delay", &self.rate_limit_delay)
            .finish()
    }
}

impl EtherscanSource {
    /// Creates a source from configuration
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Unavailable`] if the HTTP client cannot be built.
    pub fn new(config: &PetroscanConfig) -> Result<Self, RemoteError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| RemoteError::unavailable("building HTTP client", e))?;

        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            rate_limit_delay: config.rate_limit_delay,
        })
    }

    fn request_url(&self, address: Address, start_block: u64, page: usize, page_size: PageSize) -> Url {
        let mut url = self.api_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("module", "account")
                .append_pair("action", "txlist")
                .append_pair("address", &format!("{address:#x}"))
                .append_pair("startblock", &start_block.to_string())
                .append_pair("endblock", &ETHERSCAN_END_BLOCK.to_string())
                .append_pair("page", &page.to_string())
                .append_pair("offset", &page_size.as_usize().to_string())
                .append_pair("sort", "asc");
            if let Some(key) = &self.api_key {
                query.append_pair("apikey", key);
            }
        }
        url
    }

    /// Performs one raw `txlist` request
    async fn request(
        &self,
        address: Address,
        start_block: u64,
        page: usize,
        page_size: PageSize,
    ) -> Result<Vec<Transaction>, RemoteError> {
        if let Some(delay) = self.rate_limit_delay {
            tokio::time::sleep(delay).await;
        }

        let operation = format!("txlist for {address:#x} from block {start_block} (page {page})");
        let url = self.request_url(address, start_block, page, page_size);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| RemoteError::unavailable(&operation, e.without_url()))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(RemoteError::rate_limited(format!("HTTP {status} during {operation}")));
        }
        let response = response
            .error_for_status()
            .map_err(|e| RemoteError::unavailable(&operation, e.without_url()))?;

        let body = response
            .bytes()
            .await
            .map_err(|e| RemoteError::unavailable(&operation, e.without_url()))?;

        let records = parse_response(&body)?;
        debug!(records = records.len(), "Received txlist page");
        Ok(records)
    }
}

#[async_trait]
impl TransactionSource for EtherscanSource {
    async fn fetch_page(
        &self,
        address: Address,
        direction: Direction,
        after: Option<Marker>,
        page_size: PageSize,
    ) -> Result<Vec<Transaction>, RemoteError> {
        let mut start_block = after.map_or(0, |marker| marker.block_number);
        let mut page = 1;

        loop {
            let span = spans::fetch_txlist_page(address, direction, start_block, page);
            let raw = self
                .request(address, start_block, page, page_size)
                .instrument(span)
                .await?;

            let Some(last_block) = raw.last().map(Transaction::block_number) else {
                return Ok(Vec::new());
            };
            let full = raw.len() >= page_size.as_usize();

            let selected = select(raw, address, direction, after);
            if !selected.is_empty() || !full {
                return Ok(selected);
            }

            // A full page with nothing usable: skip ahead instead of stalling.
            if last_block > start_block {
                start_block = last_block;
                page = 1;
            } else {
                warn!(
                    address = %address,
                    block = start_block,
                    page,
                    "Block holds more transactions than one page, paging within it"
                );
                page += 1;
            }
        }
    }

    fn name(&self) -> &'static str {
        "Etherscan"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    const ADDRESS: Address = address!("52a043195a2803cc7e75f17f5c9d4f84ffa33211");

    fn record(hash_byte: char, block: u64, index: u64, from: &str, to: &str) -> serde_json::Value {
        serde_json::json!({
            "blockNumber": block.to_string(),
            "timeStamp": "1517443200",
            "hash": format!("0x{}", hash_byte.to_string().repeat(64)),
            "nonce": "1",
            "transactionIndex": index.to_string(),
            "from": from,
            "to": to,
            "value": "0",
            "gas": "100000",
            "gasPrice": "20000000000",
            "isError": "0",
            "txreceipt_status": "1",
            "input": "0x",
            "contractAddress": "",
            "cumulativeGasUsed": "50000",
            "gasUsed": "21000",
            "confirmations": "100"
        })
    }

    fn ok_body(records: Vec<serde_json::Value>) -> Vec<u8> {
        serde_json::to_vec(&serde_json::json!({
            "status": "1",
            "message": "OK",
            "result": records,
        }))
        .unwrap()
    }

    #[test]
    fn test_parse_success() {
        let body = ok_body(vec![record(
            'a',
            4_981_201,
            7,
            "0x52a043195a2803cc7e75f17f5c9d4f84ffa33211",
            "",
        )]);

        let records = parse_response(&body).unwrap();
        assert_eq!(records.len(), 1);
        let tx = &records[0];
        assert_eq!(tx.marker(), Marker::new(4_981_201, 7));
        assert_eq!(tx.sender(), ADDRESS);
        assert_eq!(tx.receiver(), None);
        assert_eq!(tx.gas_price(), GasPrice::from_gwei(20));
        assert_eq!(tx.gas_used(), GasAmount::new(21000));
        assert!(!tx.is_error());
    }

    #[test]
    fn test_parse_failed_receipt() {
        let mut raw = record('b', 1, 0, "0x52a043195a2803cc7e75f17f5c9d4f84ffa33211", "");
        raw["isError"] = serde_json::json!("1");
        raw["txreceipt_status"] = serde_json::json!("0");

        let records = parse_response(&ok_body(vec![raw])).unwrap();
        assert!(records[0].is_error());
    }

    #[test]
    fn test_out_of_range_timestamp_is_data_error() {
        let mut raw = record('d', 1, 0, "0x52a043195a2803cc7e75f17f5c9d4f84ffa33211", "");
        raw["timeStamp"] = serde_json::json!("99999999999999999");

        let err = parse_response(&ok_body(vec![raw])).unwrap_err();
        assert!(matches!(err, RemoteError::Data { .. }));
        assert!(err.to_string().contains("timeStamp"));
    }

    #[test]
    fn test_no_transactions_is_empty_page() {
        let body = br#"{"status":"0","message":"No transactions found","result":[]}"#;
        assert!(parse_response(body).unwrap().is_empty());
    }

    #[test]
    fn test_rate_limit_message() {
        let body = br#"{"status":"0","message":"NOTOK","result":"Max rate limit reached"}"#;
        let err = parse_response(body).unwrap_err();
        assert!(err.is_rate_limited());
    }

    #[test]
    fn test_other_notok_is_data_error() {
        let body = br#"{"status":"0","message":"NOTOK","result":"Invalid API Key"}"#;
        let err = parse_response(body).unwrap_err();
        assert!(matches!(err, RemoteError::Data { .. }));
        assert!(err.to_string().contains("Invalid API Key"));
    }

    #[test]
    fn test_non_json_is_data_error() {
        let err = parse_response(b"<html>502 Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, RemoteError::Data { .. }));
    }

    #[test]
    fn test_malformed_field_is_data_error() {
        let mut raw = record('c', 1, 0, "0x52a043195a2803cc7e75f17f5c9d4f84ffa33211", "");
        raw["gasUsed"] = serde_json::json!("lots");

        let err = parse_response(&ok_body(vec![raw])).unwrap_err();
        assert!(err.to_string().contains("gasUsed"));
    }

    #[test]
    fn test_select_is_exclusive_and_directional() {
        let other = "0x00000000000000000000000000000000000000ff";
        let me = "0x52a043195a2803cc7e75f17f5c9d4f84ffa33211";
        let raw = parse_response(&ok_body(vec![
            record('1', 10, 0, me, other),
            record('2', 10, 1, me, other),
            record('3', 10, 2, other, me),
            record('4', 11, 0, me, me),
        ]))
        .unwrap();

        let sent = select(raw.clone(), ADDRESS, Direction::Sent, Some(Marker::new(10, 0)));
        let sent_markers: Vec<_> = sent.iter().map(Transaction::marker).collect();
        assert_eq!(sent_markers, vec![Marker::new(10, 1), Marker::new(11, 0)]);

        let received = select(raw, ADDRESS, Direction::Received, None);
        let received_markers: Vec<_> = received.iter().map(Transaction::marker).collect();
        assert_eq!(received_markers, vec![Marker::new(10, 2), Marker::new(11, 0)]);
    }

    #[test]
    fn test_request_url() {
        let config = crate::PetroscanConfigBuilder::new().api_key("SOMEKEY").build();
        let source = EtherscanSource::new(&config).unwrap();

        let url = source.request_url(ADDRESS, 4_981_201, 1, PageSize::DEFAULT);
        assert_eq!(
            url.as_str(),
            "https://api.etherscan.io/api?module=account&action=txlist\
             &address=0x52a043195a2803cc7e75f17f5c9d4f84ffa33211\
             &startblock=4981201&endblock=99999999&page=1&offset=100&sort=asc&apikey=SOMEKEY"
        );
    }

    mod explorer_stub {
        use super::*;
        use std::collections::HashMap;
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;

        use crate::reconcile::Reconciler;
        use crate::store::MemoryStore;

        const ME: &str = "0x52a043195a2803cc7e75f17f5c9d4f84ffa33211";
        const OTHER: &str = "0x00000000000000000000000000000000000000ff";

        enum Reply {
            /// Serves `txlist` from an ascending chain of records
            Explorer(Vec<serde_json::Value>),
            Fixed(u16, String),
        }

        /// Minimal HTTP server standing in for the Etherscan API
        struct StubExplorer {
            url: Url,
            requests: Arc<AtomicUsize>,
        }

        impl StubExplorer {
            async fn start(reply: Reply) -> Self {
                let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
                let addr = listener.local_addr().unwrap();
                let requests = Arc::new(AtomicUsize::new(0));
                let reply = Arc::new(reply);

                let counter = requests.clone();
                tokio::spawn(async move {
                    while let Ok((mut socket, _)) = listener.accept().await {
                        let reply = reply.clone();
                        let counter = counter.clone();
                        tokio::spawn(async move {
                            let mut head = Vec::new();
                            let mut chunk = [0u8; 1024];
                            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                                let n = socket.read(&mut chunk).await.unwrap();
                                if n == 0 {
                                    return;
                                }
                                head.extend_from_slice(&chunk[..n]);
                            }
                            counter.fetch_add(1, Ordering::SeqCst);

                            let head = String::from_utf8_lossy(&head);
                            let target = head.split_whitespace().nth(1).unwrap_or("/");
                            let (status, body) = respond(&reply, target);
                            let response = format!(
                                "HTTP/1.1 {status} Stub\r\nContent-Type: application/json\r\n\
                                 Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                                body.len()
                            );
                            socket.write_all(response.as_bytes()).await.unwrap();
                            let _ = socket.shutdown().await;
                        });
                    }
                });

                Self {
                    url: Url::parse(&format!("http://{addr}/api")).unwrap(),
                    requests,
                }
            }

            fn source(&self) -> EtherscanSource {
                let config = crate::PetroscanConfigBuilder::new()
                    .api_url(self.url.clone())
                    .build();
                EtherscanSource::new(&config).unwrap()
            }

            fn requests(&self) -> usize {
                self.requests.load(Ordering::SeqCst)
            }
        }

        fn respond(reply: &Reply, target: &str) -> (u16, String) {
            let chain = match reply {
                Reply::Fixed(status, body) => return (*status, body.clone()),
                Reply::Explorer(chain) => chain,
            };

            let url = Url::parse(&format!("http://stub{target}")).unwrap();
            let query: HashMap<String, String> = url.query_pairs().into_owned().collect();
            let address = query["address"].to_lowercase();
            let start: u64 = query["startblock"].parse().unwrap();
            let page: usize = query["page"].parse().unwrap();
            let offset: usize = query["offset"].parse().unwrap();

            let result: Vec<_> = chain
                .iter()
                .filter(|r| r["from"] == address || r["to"] == address)
                .filter(|r| r["blockNumber"].as_str().unwrap().parse::<u64>().unwrap() >= start)
                .skip((page - 1) * offset)
                .take(offset)
                .cloned()
                .collect();

            let body = if result.is_empty() {
                serde_json::json!({"status": "0", "message": "No transactions found", "result": []})
            } else {
                serde_json::json!({"status": "1", "message": "OK", "result": result})
            };
            (200, body.to_string())
        }

        fn chain_record(block: u64, index: u64, from: &str, to: &str) -> serde_json::Value {
            let mut raw = record('0', block, index, from, to);
            raw["hash"] = serde_json::json!(format!("0x{:064x}", block * 1_000 + index));
            raw
        }

        fn markers(page: &[Transaction]) -> Vec<Marker> {
            page.iter().map(Transaction::marker).collect()
        }

        #[tokio::test]
        async fn test_full_page_of_other_direction_is_skipped() {
            let stub = StubExplorer::start(Reply::Explorer(vec![
                chain_record(1, 0, OTHER, ME),
                chain_record(1, 1, OTHER, ME),
                chain_record(1, 2, OTHER, ME),
                chain_record(2, 0, ME, OTHER),
            ]))
            .await;

            let page = stub
                .source()
                .fetch_page(ADDRESS, Direction::Sent, None, PageSize::new(2))
                .await
                .unwrap();

            assert_eq!(markers(&page), vec![Marker::new(2, 0)]);
            // block 0 page 1, block 1 page 1, block 1 page 2
            assert_eq!(stub.requests(), 3);
        }

        #[tokio::test]
        async fn test_marker_is_exclusive_within_its_block() {
            let stub = StubExplorer::start(Reply::Explorer(vec![
                chain_record(1, 0, OTHER, ME),
                chain_record(1, 1, OTHER, ME),
                chain_record(1, 2, OTHER, ME),
            ]))
            .await;

            let page = stub
                .source()
                .fetch_page(
                    ADDRESS,
                    Direction::Received,
                    Some(Marker::new(1, 0)),
                    PageSize::new(1),
                )
                .await
                .unwrap();

            assert_eq!(markers(&page), vec![Marker::new(1, 1)]);
        }

        #[tokio::test]
        async fn test_reconcile_both_directions_against_explorer() {
            let chain: Vec<_> = (1..=9)
                .flat_map(|block| {
                    [
                        chain_record(block, 0, ME, OTHER),
                        chain_record(block, 1, OTHER, ME),
                    ]
                })
                .collect();
            let stub = StubExplorer::start(Reply::Explorer(chain)).await;
            let reconciler = Reconciler::new(MemoryStore::new(), stub.source(), PageSize::new(4));

            let sent = reconciler.reconcile(ADDRESS, Direction::Sent).await.unwrap();
            let received = reconciler
                .reconcile(ADDRESS, Direction::Received)
                .await
                .unwrap();
            assert_eq!(sent.len(), 9);
            assert_eq!(received.len(), 9);
            assert!(sent.iter().all(|tx| tx.transaction_index() == 0));
            assert!(received.iter().all(|tx| tx.transaction_index() == 1));

            // Nothing new: one short page from the last cached block
            let before = stub.requests();
            let again = reconciler.reconcile(ADDRESS, Direction::Sent).await.unwrap();
            assert_eq!(again, sent);
            assert_eq!(stub.requests(), before + 1);
        }

        #[tokio::test]
        async fn test_no_transactions_is_empty_page_over_http() {
            let stub = StubExplorer::start(Reply::Explorer(Vec::new())).await;
            let page = stub
                .source()
                .fetch_page(ADDRESS, Direction::Sent, None, PageSize::DEFAULT)
                .await
                .unwrap();
            assert!(page.is_empty());
        }

        async fn fetch_error(status: u16, body: &str) -> RemoteError {
            let stub = StubExplorer::start(Reply::Fixed(status, body.to_string())).await;
            stub.source()
                .fetch_page(ADDRESS, Direction::Sent, None, PageSize::DEFAULT)
                .await
                .unwrap_err()
        }

        #[tokio::test]
        async fn test_http_429_is_rate_limited() {
            assert!(fetch_error(429, "").await.is_rate_limited());
        }

        #[tokio::test]
        async fn test_http_500_is_unavailable() {
            let err = fetch_error(500, "").await;
            assert!(matches!(err, RemoteError::Unavailable { .. }));
        }

        #[tokio::test]
        async fn test_notok_bodies_over_http() {
            let limited = fetch_error(
                200,
                r#"{"status":"0","message":"NOTOK","result":"Max rate limit reached"}"#,
            )
            .await;
            assert!(limited.is_rate_limited());

            let invalid_key = fetch_error(
                200,
                r#"{"status":"0","message":"NOTOK","result":"Invalid API Key"}"#,
            )
            .await;
            assert!(matches!(invalid_key, RemoteError::Data { .. }));
        }
    }
}
