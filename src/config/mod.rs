// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Configuration for petroscan operations
//!
//! This module provides the configuration for talking to a block explorer:
//! endpoint, credentials, page size, pacing and timeouts.
//!
//! # Example: Using defaults
//!
//! ```rust
//! use petroscan::PetroscanConfig;
//!
//! // Etherscan mainnet, 100 transactions per page, 200ms between requests
//! let config = PetroscanConfig::default();
//! assert_eq!(config.page_size.as_usize(), 100);
//! ```
//!
//! # Example: Custom configuration
//!
//! ```rust
//! use petroscan::PetroscanConfigBuilder;
//! use std::time::Duration;
//!
//! let config = PetroscanConfigBuilder::with_defaults()
//!     .api_key("MY-KEY")
//!     .page_size(1000)
//!     .rate_limit_delay(Duration::from_millis(350))
//!     .build();
//! ```
//!
//! # Example: Paid tier (no delays)
//!
//! ```rust
//! use petroscan::PetroscanConfig;
//!
//! let config = PetroscanConfig::minimal();
//! assert!(config.rate_limit_delay.is_none());
//! ```

use std::time::Duration;

use url::Url;

use crate::types::config::PageSize;

pub mod constants;

use constants::{
    DEFAULT_RATE_LIMIT_DELAY_MS, DEFAULT_REQUEST_TIMEOUT_SECS, ETHERSCAN_API_URL,
    ETHERSCAN_PRICE_CSV_URL,
};

/// Configuration for petroscan operations
///
/// Use [`PetroscanConfigBuilder`] for a fluent API to construct instances.
#[derive(Clone)]
pub struct PetroscanConfig {
    /// Explorer API endpoint
    /// Default: Etherscan mainnet
    pub api_url: Url,

    /// Daily ETH/USD price chart (CSV)
    /// Default: Etherscan's `etherprice` chart
    pub price_url: Url,

    /// Explorer API key, sent as the `apikey` query parameter
    pub api_key: Option<String>,

    /// Transactions requested per page
    /// Default: 100
    pub page_size: PageSize,

    /// Delay before every explorer request
    /// Default: 200ms (free-tier friendly)
    pub rate_limit_delay: Option<Duration>,

    /// Timeout for a single explorer request
    /// Default: 26 seconds
    pub request_timeout: Duration,
}

// Hand-written so the API key never ends up in logs.
impl std::fmt::Debug for PetroscanConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PetroscanConfig")
            .field("api_url", &self.api_url.as_str())
            .field("price_url", &self.price_url.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("page_size", &self.page_size)
            .field("rate_limit_delay", &self.rate_limit_delay)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl Default for PetroscanConfig {
    fn default() -> Self {
        Self::with_common_defaults()
    }
}

impl PetroscanConfig {
    /// Create config with defaults suitable for the Etherscan free tier
    ///
    /// # Example
    ///
    /// ```rust
    /// use petroscan::PetroscanConfig;
    /// use std::time::Duration;
    ///
    /// let config = PetroscanConfig::with_common_defaults();
    /// assert_eq!(config.rate_limit_delay, Some(Duration::from_millis(200)));
    /// ```
    pub fn with_common_defaults() -> Self {
        Self {
            rate_limit_delay: Some(Duration::from_millis(DEFAULT_RATE_LIMIT_DELAY_MS)),
            ..Self::minimal()
        }
    }

    /// Create minimal config with no delays
    ///
    /// Suitable for testing or paid API tiers with generous rate limits.
    pub fn minimal() -> Self {
        Self {
            api_url: default_api_url(),
            price_url: default_price_url(),
            api_key: None,
            page_size: PageSize::DEFAULT,
            rate_limit_delay: None,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

fn default_api_url() -> Url {
    // Constant is covered by `constants::tests::test_etherscan_url_parses`.
    Url::parse(ETHERSCAN_API_URL).unwrap_or_else(|_| unreachable!("invalid ETHERSCAN_API_URL"))
}

fn default_price_url() -> Url {
    // Constant is covered by `constants::tests::test_etherscan_url_parses`.
    Url::parse(ETHERSCAN_PRICE_CSV_URL).unwrap_or_else(|_| unreachable!("invalid ETHERSCAN_PRICE_CSV_URL"))
}

/// Builder for [`PetroscanConfig`]
///
/// # Example
///
/// ```rust
/// use petroscan::PetroscanConfigBuilder;
/// use std::time::Duration;
///
/// let config = PetroscanConfigBuilder::new()
///     .api_key("KEY")
///     .request_timeout(Duration::from_secs(10))
///     .build();
/// assert_eq!(config.request_timeout, Duration::from_secs(10));
/// ```
pub struct PetroscanConfigBuilder {
    config: PetroscanConfig,
}

impl Default for PetroscanConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PetroscanConfigBuilder {
    /// Create a new builder with minimal defaults
    pub fn new() -> Self {
        Self {
            config: PetroscanConfig::minimal(),
        }
    }

    /// Start with common defaults
    ///
    /// Initializes the builder with the same defaults as [`PetroscanConfig::with_common_defaults`].
    pub fn with_defaults() -> Self {
        Self {
            config: PetroscanConfig::with_common_defaults(),
        }
    }

    /// Set the explorer endpoint
    pub fn api_url(mut self, url: Url) -> Self {
        self.config.api_url = url;
        self
    }

    /// Set the ETH/USD price chart endpoint
    pub fn price_url(mut self, url: Url) -> Self {
        self.config.price_url = url;
        self
    }

    /// Set the explorer API key
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    /// Set the page size (clamped, see [`PageSize::new`])
    pub fn page_size(mut self, size: usize) -> Self {
        self.config.page_size = PageSize::new(size);
        self
    }

    /// Set the delay before every request
    pub fn rate_limit_delay(mut self, delay: Duration) -> Self {
        self.config.rate_limit_delay = Some(delay);
        self
    }

    /// Remove the delay before requests
    pub fn no_rate_limit(mut self) -> Self {
        self.config.rate_limit_delay = None;
        self
    }

    /// Set the per-request timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Build the final configuration
    pub fn build(self) -> PetroscanConfig {
        self.config
    }
}
