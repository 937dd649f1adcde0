// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Bounded-concurrency batch fetcher
//!
//! [`BatchFetcher::fetch_window`] partitions a window, filters each batch
//! against the cache, and hands every non-empty set of cache misses to a
//! worker task. Cached blocks and fetched blocks both end up in the
//! transaction set passed by the caller, so it covers the whole window. A semaphore sized to the pool width is acquired *before*
//! spawning, so the dispatch loop suspends while the pool is saturated.
//! All spawned workers are awaited before the call returns.
//!
//! Workers that fail (retries exhausted, protocol or decode error) log a
//! warning and drop their batch: those blocks stay uncached and their
//! transactions are missing from this cycle. The [`FetchReport`] makes the
//! shortfall visible to the caller.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, warn, Instrument};

use super::partition::{split_cached, AnalysisWindow};
use super::tx_set::TransactionSet;
use crate::cache::BlockCache;
use crate::errors::RpcError;
use crate::rpc::BlockClient;
use crate::tracing::spans;
use crate::transport::RpcTransport;
use crate::types::number::HexBlockNumber;

/// What happened while fetching one window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FetchReport {
    /// Batches produced by partitioning the window
    pub batches_planned: usize,
    /// Batches with at least one cache miss, handed to a worker
    pub batches_dispatched: usize,
    /// Dispatched batches that were dropped after failing
    pub batches_failed: usize,
    /// Blocks fetched and added to the cache
    pub blocks_fetched: usize,
    /// Blocks of dropped batches
    pub blocks_failed: usize,
    /// Blocks of the window that were already cached
    pub blocks_already_cached: usize,
}

impl FetchReport {
    /// True if at least one batch was dropped
    pub fn is_degraded(&self) -> bool {
        self.batches_failed > 0
    }
}

/// Fetches cache-missing blocks of a window with a bounded worker pool
pub struct BatchFetcher<T> {
    client: Arc<BlockClient<T>>,
    cache: Arc<BlockCache>,
    concurrency: usize,
}

impl<T> std::fmt::Debug for BatchFetcher<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchFetcher")
            .field("concurrency", &self.concurrency)
            .field("cache_capacity", &self.cache.capacity())
            .finish_non_exhaustive()
    }
}

impl<T: RpcTransport + 'static> BatchFetcher<T> {
    /// Creates a fetcher with at most `concurrency` batches in flight
    ///
    /// A `concurrency` of zero is raised to one.
    pub fn new(
        client: Arc<BlockClient<T>>,
        cache: Arc<BlockCache>,
        concurrency: usize,
    ) -> Self {
        Self {
            client,
            cache,
            concurrency: concurrency.max(1),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Walks `window` backward in batches of `batch_size` and fetches every
    /// block that is not already cached
    ///
    /// Transactions of cached blocks are folded into `transactions` during
    /// the filter step; fetched blocks are added to the cache and folded in
    /// by their worker. Returns once every dispatched batch has finished,
    /// successfully or not. If the whole window is cached, no network call is
    /// made.
    pub async fn fetch_window(
        &self,
        window: AnalysisWindow,
        batch_size: u64,
        transactions: &Arc<TransactionSet>,
    ) -> FetchReport {
        async move {
            let permits = Arc::new(Semaphore::new(self.concurrency));
            let mut report = FetchReport::default();
            let mut workers = Vec::new();

            for batch in window.batches(batch_size) {
                report.batches_planned += 1;
                let split = split_cached(batch, &self.cache).await;
                report.blocks_already_cached += split.hits.len();
                for block in &split.hits {
                    transactions.fold_block(block);
                }
                if split.misses.is_empty() {
                    continue;
                }

                // Blocks here until a worker slot frees up
                let Ok(permit) = Arc::clone(&permits).acquire_owned().await else {
                    warn!("Worker pool closed, stopping dispatch");
                    break;
                };

                let numbers = split.misses;
                let span = batch_span(&numbers);
                let client = Arc::clone(&self.client);
                let cache = Arc::clone(&self.cache);
                let transactions = Arc::clone(transactions);

                report.batches_dispatched += 1;
                let requested = numbers.len();
                let handle = tokio::spawn(
                    async move {
                        let _permit = permit;
                        fetch_batch(&client, &cache, &transactions, &numbers).await
                    }
                    .instrument(span),
                );
                workers.push(async move { (requested, handle.await) });
            }

            for (requested, joined) in futures::future::join_all(workers).await {
                match joined {
                    Ok(Ok(fetched)) => report.blocks_fetched += fetched,
                    Ok(Err(_)) => {
                        report.batches_failed += 1;
                        report.blocks_failed += requested;
                    }
                    Err(join_error) => {
                        warn!(error = %join_error, blocks = requested, "Batch worker panicked");
                        report.batches_failed += 1;
                        report.blocks_failed += requested;
                    }
                }
            }

            debug!(
                batches_planned = report.batches_planned,
                batches_dispatched = report.batches_dispatched,
                batches_failed = report.batches_failed,
                blocks_fetched = report.blocks_fetched,
                blocks_already_cached = report.blocks_already_cached,
                "Window fetch complete"
            );
            report
        }
        .instrument(spans::fetch_window(
            window.first(),
            window.last(),
            self.concurrency,
        ))
        .await
    }
}

fn batch_span(numbers: &[HexBlockNumber]) -> tracing::Span {
    let newest = numbers.first().map(HexBlockNumber::as_u64).unwrap_or_default();
    let oldest = numbers.last().map(HexBlockNumber::as_u64).unwrap_or_default();
    spans::fetch_batch(oldest, newest, numbers.len())
}

/// One unit of work: fetch, then merge into the cache and transaction set
async fn fetch_batch<T: RpcTransport>(
    client: &BlockClient<T>,
    cache: &BlockCache,
    transactions: &TransactionSet,
    numbers: &[HexBlockNumber],
) -> Result<usize, RpcError> {
    let blocks = client.blocks_by_number(numbers).await.inspect_err(|e| {
        warn!(
            error = %e,
            blocks = numbers.len(),
            "Dropping batch after retries"
        );
    })?;

    let fetched = blocks.len();
    let mut new_transactions = 0;
    // The client guarantees block.number matches the requested number
    for block in blocks {
        new_transactions += transactions.fold_block(&block);
        cache.add(block.number, block).await;
    }

    debug!(blocks = fetched, new_transactions, "Batch merged");
    Ok(fetched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{JsonRpcRequest, JsonRpcResponse, RetryPolicy};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Serves every requested block with one transaction and tracks peak concurrency
    #[derive(Default)]
    struct CountingTransport {
        batches: AtomicUsize,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl RpcTransport for CountingTransport {
        async fn send(&self, _request: JsonRpcRequest) -> Result<JsonRpcResponse, RpcError> {
            Ok(JsonRpcResponse::success(1, json!("0x0")))
        }

        async fn send_batch(
            &self,
            requests: Vec<JsonRpcRequest>,
        ) -> Result<Vec<JsonRpcResponse>, RpcError> {
            self.batches.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            Ok(requests
                .into_iter()
                .map(|request| {
                    let number = request.params[0].as_str().unwrap_or("0x0").to_string();
                    JsonRpcResponse::success(
                        request.id,
                        json!({
                            "number": number,
                            "hash": format!("{number}-hash"),
                            "transactions": [{
                                "hash": format!("{number}-tx"),
                                "from": "0xfrom",
                                "to": "0xto",
                                "value": "0x1"
                            }]
                        }),
                    )
                })
                .collect())
        }
    }

    fn fetcher(
        transport: Arc<CountingTransport>,
        concurrency: usize,
    ) -> BatchFetcher<Arc<CountingTransport>> {
        BatchFetcher::new(
            Arc::new(BlockClient::new(transport, RetryPolicy::no_retry())),
            Arc::new(BlockCache::new(100).unwrap()),
            concurrency,
        )
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_fetches_every_block_once() {
        let transport = Arc::new(CountingTransport::default());
        let fetcher = fetcher(Arc::clone(&transport), 4);
        let window = AnalysisWindow::ending_at(HexBlockNumber::new(50), 25).unwrap();

        let transactions = Arc::new(TransactionSet::new());
        let report = fetcher.fetch_window(window, 10, &transactions).await;

        assert_eq!(report.batches_planned, 3);
        assert_eq!(report.batches_dispatched, 3);
        assert_eq!(report.blocks_fetched, 25);
        assert!(!report.is_degraded());
        assert_eq!(fetcher.cache.size().await, 25);
        assert_eq!(transactions.len(), 25);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_pool_width_is_respected() {
        let transport = Arc::new(CountingTransport::default());
        let fetcher = fetcher(Arc::clone(&transport), 2);
        let window = AnalysisWindow::ending_at(HexBlockNumber::new(100), 40).unwrap();

        fetcher
            .fetch_window(window, 2, &Arc::new(TransactionSet::new()))
            .await;

        assert_eq!(transport.batches.load(Ordering::SeqCst), 20);
        assert!(transport.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_second_pass_is_served_from_cache() {
        let transport = Arc::new(CountingTransport::default());
        let fetcher = fetcher(Arc::clone(&transport), 2);
        let window = AnalysisWindow::ending_at(HexBlockNumber::new(30), 10).unwrap();

        fetcher
            .fetch_window(window, 5, &Arc::new(TransactionSet::new()))
            .await;
        let transactions = Arc::new(TransactionSet::new());
        let second = fetcher.fetch_window(window, 5, &transactions).await;

        assert_eq!(transport.batches.load(Ordering::SeqCst), 2);
        assert_eq!(second.batches_dispatched, 0);
        assert_eq!(second.blocks_already_cached, 10);
        // Cached blocks still feed the set
        assert_eq!(transactions.len(), 10);
        assert!(transactions.contains("0x1e-tx"));
    }

    #[tokio::test]
    async fn test_partly_cached_window_covers_every_block() {
        let transport = Arc::new(CountingTransport::default());
        let fetcher = fetcher(Arc::clone(&transport), 2);

        let older = AnalysisWindow::ending_at(HexBlockNumber::new(20), 4).unwrap();
        fetcher
            .fetch_window(older, 4, &Arc::new(TransactionSet::new()))
            .await;

        // 17..=20 cached, 21..=24 fetched
        let window = AnalysisWindow::ending_at(HexBlockNumber::new(24), 8).unwrap();
        let transactions = Arc::new(TransactionSet::new());
        let report = fetcher.fetch_window(window, 4, &transactions).await;

        assert_eq!(report.blocks_already_cached, 4);
        assert_eq!(report.blocks_fetched, 4);
        assert_eq!(transactions.len(), 8);
    }

    /// Panics inside every batch request
    struct PanickingTransport;

    #[async_trait]
    impl RpcTransport for PanickingTransport {
        async fn send(&self, _request: JsonRpcRequest) -> Result<JsonRpcResponse, RpcError> {
            Ok(JsonRpcResponse::success(1, json!("0x0")))
        }

        async fn send_batch(
            &self,
            _requests: Vec<JsonRpcRequest>,
        ) -> Result<Vec<JsonRpcResponse>, RpcError> {
            panic!("transport bug");
        }
    }

    #[tokio::test]
    async fn test_panicked_worker_counts_its_blocks_as_failed() {
        let fetcher = BatchFetcher::new(
            Arc::new(BlockClient::new(PanickingTransport, RetryPolicy::no_retry())),
            Arc::new(BlockCache::new(16).unwrap()),
            2,
        );
        let window = AnalysisWindow::ending_at(HexBlockNumber::new(10), 5).unwrap();

        let report = fetcher
            .fetch_window(window, 3, &Arc::new(TransactionSet::new()))
            .await;

        assert_eq!(report.batches_dispatched, 2);
        assert_eq!(report.batches_failed, 2);
        assert_eq!(report.blocks_failed, 5);
        assert_eq!(report.blocks_fetched, 0);
    }

    #[test]
    fn test_zero_concurrency_raised_to_one() {
        let transport = Arc::new(CountingTransport::default());
        assert_eq!(fetcher(transport, 0).concurrency(), 1);
    }
}
