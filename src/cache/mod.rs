// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Block residency.
//!
//! - [`BlockCache`]: fixed-capacity LRU map from block number to block
//! - snapshot: save/restore of the whole cache to a single binary file
//!
//! The cache is constructed once by the analyzer and shared behind `Arc`.

mod block_cache;
mod snapshot;

pub use block_cache::BlockCache;
pub use snapshot::SNAPSHOT_VERSION;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Statistics about cache performance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Number of cache hits (successful retrievals)
    pub hits: u64,
    /// Number of cache misses (key not found)
    pub misses: u64,
    /// Number of entries evicted due to capacity
    pub evictions: u64,
    /// Current number of entries in the cache
    pub entries: usize,
}

impl CacheStats {
    /// Calculates the cache hit rate as a percentage (0.0 to 100.0)
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hits={}, misses={}, evictions={}, entries={}, hit_rate={:.1}%",
            self.hits,
            self.misses,
            self.evictions,
            self.entries,
            self.hit_rate()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate_without_lookups() {
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
    }

    #[test]
    fn test_display() {
        let stats = CacheStats {
            hits: 3,
            misses: 1,
            evictions: 2,
            entries: 10,
        };
        assert_eq!(
            stats.to_string(),
            "hits=3, misses=1, evictions=2, entries=10, hit_rate=75.0%"
        );
    }
}
