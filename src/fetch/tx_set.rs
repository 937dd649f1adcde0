// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Concurrent transaction set deduplicated by hash

use dashmap::DashMap;

use crate::types::block::{Block, TransactionRecord};

/// Transactions keyed by hash, safe for concurrent insertion from many workers
///
/// Inserting a hash that is already present replaces the record (last write
/// wins); the records for one hash are expected to be identical, so the set
/// never counts a transaction twice. Iteration order is unspecified.
#[derive(Debug, Default)]
pub struct TransactionSet {
    records: DashMap<String, TransactionRecord>,
}

impl TransactionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a record, returns true if the hash was new
    pub fn insert(&self, hash: impl Into<String>, record: TransactionRecord) -> bool {
        self.records.insert(hash.into(), record).is_none()
    }

    /// Folds every transaction of `block` into the set, returns how many were new
    pub fn fold_block(&self, block: &Block) -> usize {
        block
            .transaction_records()
            .filter(|(hash, record)| self.insert(hash.clone(), record.clone()))
            .count()
    }

    pub fn contains(&self, hash: &str) -> bool {
        self.records.contains_key(hash)
    }

    pub fn get(&self, hash: &str) -> Option<TransactionRecord> {
        self.records.get(hash).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&self) {
        self.records.clear();
    }

    /// Iterates over `(hash, record)` entries
    ///
    /// Each yielded guard holds a shard read lock; do not insert into the set
    /// while iterating.
    pub fn iter(&self) -> dashmap::iter::Iter<'_, String, TransactionRecord> {
        self.records.iter()
    }
}
