// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Fixed-capacity LRU cache of fetched blocks

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use super::CacheStats;
use crate::errors::CacheError;
use crate::types::block::Block;
use crate::types::number::HexBlockNumber;

/// Internal state guarded by the cache mutex
#[derive(Debug)]
pub(super) struct BlockCacheState {
    pub(super) entries: LruCache<HexBlockNumber, Arc<Block>>,
    pub(super) stats: CacheStats,
}

impl BlockCacheState {
    /// Inserts or replaces an entry, returns true if another entry was evicted
    pub(super) fn insert(&mut self, key: HexBlockNumber, block: Arc<Block>) -> bool {
        let evicted = match self.entries.push(key, block) {
            Some((old_key, _)) if old_key != key => {
                self.stats.evictions += 1;
                debug!(evicted_block = %old_key, "Evicted least recently used block");
                true
            }
            _ => false,
        };
        self.stats.entries = self.entries.len();
        evicted
    }
}

/// Recency-ordered cache of blocks keyed by block number
///
/// Both [`get`](Self::get) and [`add`](Self::add) count as an access. When the
/// cache is full, adding a new key evicts the least recently accessed entry.
/// The capacity is fixed at construction.
///
/// Blocks are stored behind `Arc` and never mutated; a hit hands out a shared
/// reference rather than a copy.
///
/// One instance is meant to be created at startup and shared (as
/// `Arc<BlockCache>`) by every component that needs block residency.
///
/// # Examples
///
/// ```rust
/// use deltascan::{BlockCache, HexBlockNumber};
///
/// # #[tokio::main]
/// # async fn main() {
/// let cache = BlockCache::new(2).unwrap();
/// assert_eq!(cache.size().await, 0);
/// assert!(cache.get(HexBlockNumber::new(1)).await.is_none());
/// # }
/// ```
#[derive(Debug)]
pub struct BlockCache {
    capacity: NonZeroUsize,
    pub(super) state: Mutex<BlockCacheState>,
}

impl BlockCache {
    /// Creates an empty cache holding at most `capacity` blocks
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidCapacity`] if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self, CacheError> {
        let capacity = NonZeroUsize::new(capacity).ok_or(CacheError::InvalidCapacity)?;
        Ok(Self {
            capacity,
            state: Mutex::new(BlockCacheState {
                entries: LruCache::new(capacity),
                stats: CacheStats::default(),
            }),
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Returns the block and marks it most recently used
    pub async fn get(&self, key: HexBlockNumber) -> Option<Arc<Block>> {
        let mut state = self.state.lock().await;
        match state.entries.get(&key).cloned() {
            Some(block) => {
                state.stats.hits += 1;
                debug!(block_number = %key, "Cache hit");
                Some(block)
            }
            None => {
                state.stats.misses += 1;
                debug!(block_number = %key, "Cache miss");
                None
            }
        }
    }

    /// Checks residency without touching recency or statistics
    pub async fn contains(&self, key: HexBlockNumber) -> bool {
        self.state.lock().await.entries.contains(&key)
    }

    /// Inserts or replaces a block, evicting the least recently used entry if full
    ///
    /// Returns `true` if an eviction happened.
    pub async fn add(&self, key: HexBlockNumber, block: impl Into<Arc<Block>>) -> bool {
        let mut state = self.state.lock().await;
        let evicted = state.insert(key, block.into());
        debug!(block_number = %key, cache_size = state.entries.len(), "Added block to cache");
        evicted
    }

    pub async fn size(&self) -> usize {
        self.state.lock().await.entries.len()
    }

    /// Cached block numbers, most recently used first
    pub async fn keys(&self) -> Vec<HexBlockNumber> {
        self.state.lock().await.entries.iter().map(|(k, _)| *k).collect()
    }

    /// Every cached block, most recently used first, without touching recency
    pub async fn blocks(&self) -> Vec<Arc<Block>> {
        self.state
            .lock()
            .await
            .entries
            .iter()
            .map(|(_, block)| Arc::clone(block))
            .collect()
    }

    pub async fn stats(&self) -> CacheStats {
        let state = self.state.lock().await;
        CacheStats {
            entries: state.entries.len(),
            ..state.stats.clone()
        }
    }

    /// Drops every entry; statistics other than `entries` are kept
    pub async fn clear(&self) {
        let mut state = self.state.lock().await;
        state.entries.clear();
        state.stats.entries = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(number: u64) -> Block {
        Block {
            number: HexBlockNumber::new(number),
            hash: format!("0x{number:064x}"),
            transactions: Vec::new(),
        }
    }

    async fn add(cache: &BlockCache, number: u64) -> bool {
        cache.add(HexBlockNumber::new(number), block(number)).await
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(matches!(
            BlockCache::new(0),
            Err(CacheError::InvalidCapacity)
        ));
    }

    #[tokio::test]
    async fn test_get_returns_inserted_block() {
        let cache = BlockCache::new(4).unwrap();
        add(&cache, 7).await;

        let hit = cache.get(HexBlockNumber::new(7)).await.unwrap();
        assert_eq!(*hit, block(7));
        assert!(cache.get(HexBlockNumber::new(8)).await.is_none());
    }

    #[tokio::test]
    async fn test_get_refreshes_recency() {
        let cache = BlockCache::new(2).unwrap();
        add(&cache, 1).await; // A
        add(&cache, 2).await; // B
        assert!(cache.get(HexBlockNumber::new(1)).await.is_some());

        assert!(add(&cache, 3).await);

        assert!(cache.contains(HexBlockNumber::new(1)).await);
        assert!(!cache.contains(HexBlockNumber::new(2)).await);
        assert!(cache.contains(HexBlockNumber::new(3)).await);
    }

    #[tokio::test]
    async fn test_size_never_exceeds_capacity() {
        let cache = BlockCache::new(3).unwrap();
        for n in 0..10 {
            add(&cache, n).await;
            assert!(cache.size().await <= 3);
        }

        assert_eq!(
            cache.keys().await,
            vec![
                HexBlockNumber::new(9),
                HexBlockNumber::new(8),
                HexBlockNumber::new(7)
            ]
        );
    }

    #[tokio::test]
    async fn test_replace_is_not_an_eviction() {
        let cache = BlockCache::new(2).unwrap();
        add(&cache, 1).await;
        add(&cache, 2).await;

        assert!(!add(&cache, 1).await);
        assert_eq!(cache.size().await, 2);
        assert_eq!(cache.stats().await.evictions, 0);
    }

    #[tokio::test]
    async fn test_contains_does_not_promote() {
        let cache = BlockCache::new(2).unwrap();
        add(&cache, 1).await;
        add(&cache, 2).await;
        assert!(cache.contains(HexBlockNumber::new(1)).await);

        add(&cache, 3).await;
        assert!(!cache.contains(HexBlockNumber::new(1)).await);
    }

    #[tokio::test]
    async fn test_stats_track_hits_misses_evictions() {
        let cache = BlockCache::new(1).unwrap();
        add(&cache, 1).await;
        cache.get(HexBlockNumber::new(1)).await;
        cache.get(HexBlockNumber::new(2)).await;
        add(&cache, 2).await;

        let stats = cache.stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.hit_rate(), 50.0);
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = BlockCache::new(4).unwrap();
        add(&cache, 1).await;
        add(&cache, 2).await;
        cache.clear().await;

        assert_eq!(cache.size().await, 0);
        assert!(cache.keys().await.is_empty());
    }
}
