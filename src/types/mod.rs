// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Strong types for type safety across deltascan.
//!
//! This module provides the data model shared by every stage of the pipeline:
//! - Canonical hex block numbers (cache keys and RPC parameters)
//! - Blocks, transactions and the aggregation-facing transaction record
//! - Signed wei amounts and exact ether conversion
//! - The analysis result

pub mod block;
pub mod number;
pub mod result;
pub mod wei;

// Note: Public types are re-exported from lib.rs, not here
