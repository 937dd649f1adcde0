// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Analysis window and its partitioning into batches
//!
//! Two phases, kept apart so each can be tested on its own:
//!
//! 1. [`AnalysisWindow::batches`] walks the window backward from its newest
//!    block in strides of `batch_size`. It is pure: no cache, no I/O.
//! 2. [`split_cached`] separates the numbers already resident in the
//!    [`BlockCache`] from the cache misses that need a network call.

use std::sync::Arc;

use crate::cache::BlockCache;
use crate::errors::AnalysisError;
use crate::types::block::Block;
use crate::types::number::HexBlockNumber;

/// Inclusive range of block numbers to analyze, `first..=last`
///
/// # Examples
///
/// ```rust
/// use deltascan::{AnalysisWindow, HexBlockNumber};
///
/// let window = AnalysisWindow::ending_at(HexBlockNumber::new(100), 10).unwrap();
/// assert_eq!(window.first(), 91);
/// assert_eq!(window.last(), 100);
/// assert_eq!(window.len(), 10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisWindow {
    first: u64,
    last: u64,
}

impl AnalysisWindow {
    /// The `blocks` most recent blocks up to and including `latest`
    ///
    /// # Errors
    ///
    /// - [`AnalysisError::InvalidConfig`] if `blocks` is zero
    /// - [`AnalysisError::WindowExceedsChainHeight`] if `blocks` is larger
    ///   than `latest`, i.e. the window would start below block zero
    pub fn ending_at(latest: HexBlockNumber, blocks: u64) -> Result<Self, AnalysisError> {
        let latest = latest.as_u64();
        if blocks == 0 {
            return Err(AnalysisError::invalid_config(
                "blocks to analyze must be greater than zero",
            ));
        }
        if blocks > latest {
            return Err(AnalysisError::WindowExceedsChainHeight {
                requested: blocks,
                latest,
            });
        }

        Ok(Self {
            first: latest - blocks + 1,
            last: latest,
        })
    }

    /// Oldest block in the window
    pub fn first(&self) -> u64 {
        self.first
    }

    /// Newest block in the window
    pub fn last(&self) -> u64 {
        self.last
    }

    pub fn len(&self) -> u64 {
        self.last - self.first + 1
    }

    /// Always false; a window holds at least one block
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, number: u64) -> bool {
        (self.first..=self.last).contains(&number)
    }

    /// Splits the window into descending batches of at most `batch_size`
    ///
    /// The first batch starts at [`last`](Self::last); only the final batch
    /// may be short. A `batch_size` of zero is treated as one.
    pub fn batches(&self, batch_size: u64) -> Batches {
        Batches {
            next: Some(self.last),
            first: self.first,
            batch_size: batch_size.max(1),
        }
    }
}

/// Iterator over the batches of an [`AnalysisWindow`]
#[derive(Debug, Clone)]
pub struct Batches {
    next: Option<u64>,
    first: u64,
    batch_size: u64,
}

impl Iterator for Batches {
    type Item = Vec<HexBlockNumber>;

    fn next(&mut self) -> Option<Self::Item> {
        let top = self.next?;
        let bottom = top
            .saturating_sub(self.batch_size - 1)
            .max(self.first);

        self.next = bottom.checked_sub(1).filter(|n| *n >= self.first);
        Some((bottom..=top).rev().map(HexBlockNumber::new).collect())
    }
}

/// Result of filtering one batch against the cache
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheSplit {
    /// Numbers that need fetching, in batch order
    pub misses: Vec<HexBlockNumber>,
    /// Blocks already cached, in batch order
    pub hits: Vec<Arc<Block>>,
}

/// Filters `batch` against `cache`
///
/// Lookups go through [`BlockCache::get`], so every block of the window that
/// is already resident is refreshed as most recently used.
pub async fn split_cached(batch: Vec<HexBlockNumber>, cache: &BlockCache) -> CacheSplit {
    let mut split = CacheSplit::default();
    for number in batch {
        match cache.get(number).await {
            Some(block) => split.hits.push(block),
            None => split.misses.push(number),
        }
    }
    split
}
