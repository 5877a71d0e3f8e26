// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Strong types for type safety across petroscan.
//!
//! This module provides newtype wrappers for various domain concepts:
//! - Wei amounts and gas calculations
//! - Normalized transaction records and their ordering markers
//! - Cache keys (address and direction)
//! - Configuration values (page sizes)

pub mod cache;
pub mod config;
pub mod gas;
pub mod transaction;
pub mod wei;

// Note: Public types are re-exported from lib.rs, not here
