// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use tracing::{debug, Instrument};
use url::Url;

use super::{EthPriceSource, EthPrices};
use crate::config::PetroscanConfig;
use crate::errors::RemoteError;
use crate::tracing::spans;
use crate::types::transaction::utc_date;

/// Parses Etherscan's `"Date(UTC)","UnixTimeStamp","Value"` chart export
///
/// The header row and lines without exactly three fields are skipped.
pub(crate) fn parse_price_csv(body: &str) -> Result<EthPrices, RemoteError> {
    let mut prices = EthPrices::new();

    for line in body.lines() {
        let fields: Vec<&str> = line
            .trim_start_matches('\u{feff}')
            .split(',')
            .map(|field| field.trim().trim_matches('"'))
            .collect();
        let [_, timestamp, value] = fields.as_slice() else {
            continue;
        };
        if *value == "Value" {
            continue;
        }

        let timestamp: u64 = timestamp
            .parse()
            .map_err(|e| RemoteError::data(format!("bad price timestamp {timestamp:?}: {e}")))?;
        let usd: f64 = value
            .parse()
            .map_err(|e| RemoteError::data(format!("bad price value {value:?}: {e}")))?;
        let date = utc_date(timestamp)
            .ok_or_else(|| RemoteError::data(format!("price timestamp {timestamp} out of range")))?;

        prices.insert(date, usd);
    }

    if prices.is_empty() {
        return Err(RemoteError::data("price chart contained no rows"));
    }
    Ok(prices)
}

/// ETH/USD prices from the Etherscan price chart export
#[derive(Debug, Clone)]
pub struct EtherscanPriceSource {
    http: reqwest::Client,
    url: Url,
}

impl EtherscanPriceSource {
    /// Creates a source for `config.price_url`
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
            url: config.price_url.clone(),
        })
    }

    async fn download(&self) -> Result<EthPrices, RemoteError> {
        let operation = "ETH price chart download";

        let response = self
            .http
            .get(self.url.clone())
            .send()
            .await
            .map_err(|e| RemoteError::unavailable(operation, e))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(RemoteError::rate_limited(format!("HTTP {status} during {operation}")));
        }
        let body = response
            .error_for_status()
            .map_err(|e| RemoteError::unavailable(operation, e))?
            .text()
            .await
            .map_err(|e| RemoteError::unavailable(operation, e))?;

        let prices = parse_price_csv(&body)?;
        debug!(days = prices.len(), "Received ETH price chart");
        Ok(prices)
    }
}

#[async_trait]
impl EthPriceSource for EtherscanPriceSource {
    async fn daily_prices(&self) -> Result<EthPrices, RemoteError> {
        self.download().instrument(spans::fetch_prices(self.name())).await
    }

    fn name(&self) -> &'static str {
        "Etherscan price chart"
    }
}
