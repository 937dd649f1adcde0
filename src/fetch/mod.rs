// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Window fetching.
//!
//! - [`AnalysisWindow`]: the inclusive block range a cycle looks at, and its
//!   pure partitioning into descending batches
//! - [`TransactionSet`]: concurrent, hash-deduplicated transaction records
//! - [`BatchFetcher`]: bounded worker pool fetching the cache misses of a window

mod fetcher;
mod partition;
mod tx_set;

pub use fetcher::{BatchFetcher, FetchReport};
pub use partition::{split_cached, AnalysisWindow, Batches, CacheSplit};
pub use tx_set::TransactionSet;
