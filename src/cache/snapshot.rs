// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Binary snapshot of the block cache
//!
//! The file is a bincode-encoded `SnapshotFile`: a format version, the save
//! time, and every entry ordered from least to most recently used so that a
//! reload restores recency as well as contents. The format is private to a
//! build; a file written with another version is rejected as
//! [`CacheError::VersionMismatch`].
//!
//! Writes go to a sibling temp file first and are renamed into place, so a
//! crash mid-save leaves the previous snapshot intact.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, Instrument};

use super::BlockCache;
use crate::errors::CacheError;
use crate::tracing::spans;
use crate::types::block::Block;
use crate::types::number::HexBlockNumber;

/// Current snapshot format version
///
/// Bump when `Block` or the file layout changes.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    saved_at: DateTime<Utc>,
    entries: Vec<(HexBlockNumber, &'a Block)>,
}

#[derive(Deserialize)]
struct SnapshotFile {
    version: u32,
    saved_at: DateTime<Utc>,
    entries: Vec<(HexBlockNumber, Block)>,
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

impl BlockCache {
    /// Writes every entry to `path`, returns the number of blocks saved
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Serialization`] if encoding fails and
    /// [`CacheError::Io`] if the file cannot be written or renamed.
    pub async fn save_snapshot(&self, path: impl AsRef<Path>) -> Result<usize, CacheError> {
        let path = path.as_ref();
        async move {
            // LRU first so a sequential reload leaves the MRU entry on top
            let entries: Vec<(HexBlockNumber, Arc<Block>)> = {
                let state = self.state.lock().await;
                state
                    .entries
                    .iter()
                    .rev()
                    .map(|(key, block)| (*key, Arc::clone(block)))
                    .collect()
            };

            let snapshot = SnapshotRef {
                version: SNAPSHOT_VERSION,
                saved_at: Utc::now(),
                entries: entries.iter().map(|(key, block)| (*key, &**block)).collect(),
            };
            let bytes = bincode::serialize(&snapshot)
                .map_err(|e| CacheError::serialization("Failed to encode cache snapshot", e))?;

            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    CacheError::io(
                        parent.display().to_string(),
                        "Failed to create snapshot directory",
                        e,
                    )
                })?;
            }

            let tmp = temp_path(path);
            tokio::fs::write(&tmp, &bytes).await.map_err(|e| {
                CacheError::io(tmp.display().to_string(), "Failed to write snapshot", e)
            })?;
            tokio::fs::rename(&tmp, path).await.map_err(|e| {
                CacheError::io(path.display().to_string(), "Failed to move snapshot into place", e)
            })?;

            info!(
                path = %path.display(),
                blocks = entries.len(),
                bytes = bytes.len(),
                "Saved block cache snapshot"
            );
            Ok(entries.len())
        }
        .instrument(spans::snapshot("save", path))
        .await
    }

    /// Loads entries from `path` into this cache, returns the number of blocks read
    ///
    /// Entries are inserted in file order, so the recency order of the saved
    /// cache is restored. If the snapshot holds more blocks than this cache's
    /// capacity, the least recently used ones are evicted on the way in.
    /// Existing entries are kept unless a loaded block replaces or evicts them.
    ///
    /// # Errors
    ///
    /// - [`CacheError::Io`] if the file cannot be read (including not found,
    ///   see [`CacheError::is_not_found`])
    /// - [`CacheError::Serialization`] if the file is corrupt
    /// - [`CacheError::VersionMismatch`] if another format version wrote it
    ///
    /// The cache is left untouched on error.
    pub async fn load_snapshot(&self, path: impl AsRef<Path>) -> Result<usize, CacheError> {
        let path = path.as_ref();
        async move {
            let bytes = tokio::fs::read(path).await.map_err(|e| {
                CacheError::io(path.display().to_string(), "Failed to read snapshot", e)
            })?;

            let snapshot: SnapshotFile = bincode::deserialize(&bytes)
                .map_err(|e| CacheError::serialization("Failed to decode cache snapshot", e))?;

            if snapshot.version != SNAPSHOT_VERSION {
                return Err(CacheError::VersionMismatch {
                    found: snapshot.version,
                    expected: SNAPSHOT_VERSION,
                });
            }

            let count = snapshot.entries.len();
            let mut state = self.state.lock().await;
            for (key, block) in snapshot.entries {
                state.insert(key, Arc::new(block));
            }

            debug!(
                path = %path.display(),
                blocks = count,
                saved_at = %snapshot.saved_at,
                cache_size = state.entries.len(),
                "Loaded block cache snapshot"
            );
            Ok(count)
        }
        .instrument(spans::snapshot("load", path))
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::block::Transaction;
    use tempfile::TempDir;

    fn block(number: u64) -> Block {
        Block {
            number: HexBlockNumber::new(number),
            hash: format!("0x{number:064x}"),
            transactions: vec![Transaction {
                hash: format!("0xtx{number}"),
                from: "0xaaaa".to_string(),
                to: None,
                value: "0x10".to_string(),
                gas: "0x5208".to_string(),
                gas_price: String::new(),
                block_number: format!("{:#x}", number),
                transaction_index: "0x0".to_string(),
            }],
        }
    }

    async fn filled(capacity: usize, numbers: &[u64]) -> BlockCache {
        let cache = BlockCache::new(capacity).unwrap();
        for &n in numbers {
            cache.add(HexBlockNumber::new(n), block(n)).await;
        }
        cache
    }

    #[tokio::test]
    async fn test_round_trip_preserves_recency() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.bin");

        let original = filled(8, &[1, 2, 3]).await;
        original.get(HexBlockNumber::new(1)).await;
        assert_eq!(original.save_snapshot(&path).await.unwrap(), 3);

        let restored = BlockCache::new(8).unwrap();
        assert_eq!(restored.load_snapshot(&path).await.unwrap(), 3);

        assert_eq!(restored.keys().await, original.keys().await);
        for key in original.keys().await {
            assert_eq!(
                restored.get(key).await.unwrap(),
                original.get(key).await.unwrap()
            );
        }
        assert!(!temp_path(&path).exists());
    }

    #[tokio::test]
    async fn test_load_into_smaller_cache_keeps_most_recent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.bin");
        filled(4, &[1, 2, 3, 4]).await.save_snapshot(&path).await.unwrap();

        let restored = BlockCache::new(2).unwrap();
        restored.load_snapshot(&path).await.unwrap();
        assert_eq!(
            restored.keys().await,
            vec![HexBlockNumber::new(4), HexBlockNumber::new(3)]
        );
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let cache = BlockCache::new(2).unwrap();

        let error = cache
            .load_snapshot(dir.path().join("absent.bin"))
            .await
            .unwrap_err();
        assert!(error.is_not_found());
    }

    #[tokio::test]
    async fn test_corrupt_file_leaves_cache_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.bin");
        std::fs::write(&path, b"definitely not bincode").unwrap();

        let cache = filled(4, &[9]).await;
        let error = cache.load_snapshot(&path).await.unwrap_err();
        assert!(matches!(error, CacheError::Serialization { .. }));
        assert_eq!(cache.keys().await, vec![HexBlockNumber::new(9)]);
    }

    #[tokio::test]
    async fn test_version_mismatch_rejected() {
        #[derive(Serialize)]
        struct NewerSnapshot {
            version: u32,
            saved_at: DateTime<Utc>,
            entries: Vec<(HexBlockNumber, Block)>,
        }

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.bin");
        let bytes = bincode::serialize(&NewerSnapshot {
            version: SNAPSHOT_VERSION + 1,
            saved_at: Utc::now(),
            entries: vec![(HexBlockNumber::new(1), block(1))],
        })
        .unwrap();
        std::fs::write(&path, bytes).unwrap();

        let cache = BlockCache::new(2).unwrap();
        assert!(matches!(
            cache.load_snapshot(&path).await,
            Err(CacheError::VersionMismatch { found, expected })
                if found == SNAPSHOT_VERSION + 1 && expected == SNAPSHOT_VERSION
        ));
        assert_eq!(cache.size().await, 0);
    }

    #[tokio::test]
    async fn test_save_creates_parent_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("cache.bin");

        filled(2, &[5]).await.save_snapshot(&path).await.unwrap();
        assert!(path.exists());
    }
}
