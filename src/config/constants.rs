// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Well-known endpoints and constants
//!
//! This module centralizes magic constants used when talking to block
//! explorers, improving discoverability and maintainability.

/// Etherscan mainnet API endpoint
pub const ETHERSCAN_API_URL: &str = "https://api.etherscan.io/api";

/// Etherscan daily ETH/USD price chart, as CSV
pub const ETHERSCAN_PRICE_CSV_URL: &str = "https://etherscan.io/chart/etherprice?output=csv";

/// Upper bound passed as `endblock`; Etherscan treats it as "latest".
pub const ETHERSCAN_END_BLOCK: u64 = 99_999_999;

/// Delay before each explorer request, to stay clear of free-tier bans
pub const DEFAULT_RATE_LIMIT_DELAY_MS: u64 = 200;

/// Timeout for a single explorer request
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 26;

/// Directory name used under the platform cache directory
pub const CACHE_DIR_NAME: &str = "petroscan";
