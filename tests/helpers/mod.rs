// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Test helpers for deltascan integration tests
//!
//! Provides a scripted [`RpcTransport`] and block fixtures so the pipeline can
//! be exercised without a real provider.

#![allow(dead_code)]

use async_trait::async_trait;
use deltascan::{
    AnalyzerConfig, AnalyzerConfigBuilder, Block, HexBlockNumber, JsonRpcRequest,
    JsonRpcResponse, RpcError, RpcTransport, Transaction,
};
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Build a transaction with only the fields the aggregator reads
pub fn transaction(hash: &str, from: &str, value: &str) -> Transaction {
    Transaction {
        hash: hash.to_string(),
        from: from.to_string(),
        to: Some("0x000000000000000000000000000000000000dead".to_string()),
        value: value.to_string(),
        gas: "0x5208".to_string(),
        gas_price: "0x3b9aca00".to_string(),
        block_number: String::new(),
        transaction_index: "0x0".to_string(),
    }
}

/// Build a block holding `transactions`
pub fn block(number: u64, transactions: Vec<Transaction>) -> Block {
    Block {
        number: HexBlockNumber::new(number),
        hash: format!("0x{number:064x}"),
        transactions,
    }
}

/// The block a [`MockTransport`] serves when none was scripted:
/// one transaction of `number` wei sent by `0xsender<number>`
pub fn default_block(number: u64) -> Block {
    block(
        number,
        vec![transaction(
            &format!("0xtx{number:x}"),
            &format!("0xsender{number}"),
            &format!("{number:#x}"),
        )],
    )
}

/// Config pointed at nothing in particular, with fast retries
pub fn test_config(blocks: u64, batch_size: u64, snapshot: &Path) -> AnalyzerConfig {
    AnalyzerConfigBuilder::new("test-key")
        .blocks_to_analyze(blocks)
        .batch_size(batch_size)
        .cache_capacity(1000)
        .retry(2, Duration::from_millis(1))
        .snapshot_path(snapshot)
        .build()
}

/// Mock JSON-RPC provider
///
/// Serves `eth_blockNumber` from a fixed latest block and
/// `eth_getBlockByNumber` from scripted or default blocks. Any batch that
/// contains a failing block is rejected as a whole, every time.
///
/// # Example
///
/// ```rust,ignore
/// let transport = Arc::new(
///     MockTransport::new(100)
///         .with_failing_block(88)
///         .with_block(block(99, vec![transaction("0x1", "0xa", "0x10")])),
/// );
/// ```
pub struct MockTransport {
    latest: AtomicU64,
    blocks: HashMap<u64, Block>,
    failing_blocks: HashSet<u64>,
    missing_blocks: HashSet<u64>,
    latest_failures: AtomicUsize,
    latest_calls: AtomicUsize,
    batch_calls: AtomicUsize,
    requested: Mutex<Vec<u64>>,
}

impl MockTransport {
    pub fn new(latest: u64) -> Self {
        Self {
            latest: AtomicU64::new(latest),
            blocks: HashMap::new(),
            failing_blocks: HashSet::new(),
            missing_blocks: HashSet::new(),
            latest_failures: AtomicUsize::new(0),
            latest_calls: AtomicUsize::new(0),
            batch_calls: AtomicUsize::new(0),
            requested: Mutex::new(Vec::new()),
        }
    }

    /// Serve `block` instead of the default for its number
    pub fn with_block(mut self, block: Block) -> Self {
        self.blocks.insert(block.number.as_u64(), block);
        self
    }

    /// Reject every batch that asks for `number`
    pub fn with_failing_block(mut self, number: u64) -> Self {
        self.failing_blocks.insert(number);
        self
    }

    /// Answer `null` for `number`
    pub fn with_missing_block(mut self, number: u64) -> Self {
        self.missing_blocks.insert(number);
        self
    }

    /// Fail the first `count` `eth_blockNumber` calls
    pub fn with_latest_failures(self, count: usize) -> Self {
        self.latest_failures.store(count, Ordering::SeqCst);
        self
    }

    /// Move the chain head, e.g. between analysis cycles
    pub fn set_latest(&self, latest: u64) {
        self.latest.store(latest, Ordering::SeqCst);
    }

    pub fn latest_calls(&self) -> usize {
        self.latest_calls.load(Ordering::SeqCst)
    }

    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }

    /// Every block number requested so far, including retried ones
    pub fn requested_blocks(&self) -> Vec<u64> {
        self.requested.lock().unwrap().clone()
    }

    fn block_for(&self, number: u64) -> Block {
        self.blocks
            .get(&number)
            .cloned()
            .unwrap_or_else(|| default_block(number))
    }
}

fn requested_number(request: &JsonRpcRequest) -> u64 {
    request.params[0]
        .as_str()
        .and_then(|hex| hex.parse::<HexBlockNumber>().ok())
        .map(|n| n.as_u64())
        .expect("eth_getBlockByNumber request without a block number")
}

#[async_trait]
impl RpcTransport for MockTransport {
    async fn send(&self, request: JsonRpcRequest) -> Result<JsonRpcResponse, RpcError> {
        assert_eq!(request.method, "eth_blockNumber");
        self.latest_calls.fetch_add(1, Ordering::SeqCst);

        let remaining = self.latest_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.latest_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(RpcError::Status { status: 503 });
        }

        Ok(JsonRpcResponse::success(
            request.id,
            json!(HexBlockNumber::new(self.latest.load(Ordering::SeqCst))),
        ))
    }

    async fn send_batch(
        &self,
        requests: Vec<JsonRpcRequest>,
    ) -> Result<Vec<JsonRpcResponse>, RpcError> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        let numbers: Vec<u64> = requests.iter().map(requested_number).collect();
        self.requested.lock().unwrap().extend(&numbers);

        if numbers.iter().any(|n| self.failing_blocks.contains(n)) {
            return Err(RpcError::protocol(-32005, "request limit exceeded"));
        }

        Ok(requests
            .iter()
            .zip(numbers)
            .map(|(request, number)| {
                if self.missing_blocks.contains(&number) {
                    JsonRpcResponse::success(request.id, serde_json::Value::Null)
                } else {
                    JsonRpcResponse::success(
                        request.id,
                        serde_json::to_value(self.block_for(number)).unwrap(),
                    )
                }
            })
            .collect())
    }
}
