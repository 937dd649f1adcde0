// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! The analysis pipeline
//!
//! [`BalanceAnalyzer`] owns the single block cache and the batch fetcher, and
//! exposes the three lifecycle steps:
//!
//! 1. [`bootstrap`](BalanceAnalyzer::bootstrap): load the cache snapshot and
//!    seed the transaction set from it
//! 2. [`run_cycle`](BalanceAnalyzer::run_cycle): fetch the latest window and
//!    return the largest balance change, as many times as needed
//! 3. [`shutdown`](BalanceAnalyzer::shutdown): save the cache snapshot
//!
//! Each cycle builds a fresh transaction set from the blocks of its window,
//! cached or fetched, and aggregates over that set only. The set of the most
//! recent cycle (or of the snapshot preload) stays available through
//! [`transactions`](BalanceAnalyzer::transactions).
//!
//! # Example
//!
//! ```rust,no_run
//! use deltascan::{AnalyzerConfig, BalanceAnalyzer};
//!
//! # async fn run() -> Result<(), deltascan::DeltascanError> {
//! let config = AnalyzerConfig::from_env()?;
//! let analyzer = BalanceAnalyzer::from_config(&config)?;
//!
//! analyzer.bootstrap().await;
//! let outcome = analyzer.run_cycle().await?;
//! println!("{}", serde_json::to_string(&outcome.result).unwrap_or_default());
//! analyzer.shutdown().await?;
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::RwLock;
use tower::Layer;
use tracing::{info, warn, Instrument};

use crate::aggregate::find_max_change;
use crate::cache::BlockCache;
use crate::config::AnalyzerConfig;
use crate::errors::{AnalysisError, CacheError, DeltascanError};
use crate::fetch::{AnalysisWindow, BatchFetcher, FetchReport, TransactionSet};
use crate::rpc::BlockClient;
use crate::tracing::spans;
use crate::transport::{HttpTransport, LoggingLayer, LoggingTransport, RpcTransport};
use crate::types::number::HexBlockNumber;
use crate::types::result::ResultBlock;

/// Outcome of one analysis cycle
#[derive(Debug, Clone)]
pub struct CycleOutcome {
    /// Latest block number reported by the provider
    pub latest_block: HexBlockNumber,
    /// The block range that was fetched
    pub window: AnalysisWindow,
    /// Largest absolute balance change found
    pub result: ResultBlock,
    /// Size of the window's transaction set the result was computed over
    pub transactions_analyzed: usize,
    /// Batch-level details of the window fetch
    pub fetch: FetchReport,
}

/// Fetch-and-aggregate pipeline over one provider
pub struct BalanceAnalyzer<T> {
    client: Arc<BlockClient<T>>,
    cache: Arc<BlockCache>,
    transactions: RwLock<Arc<TransactionSet>>,
    fetcher: BatchFetcher<T>,
    blocks_to_analyze: u64,
    batch_size: u64,
    snapshot_path: PathBuf,
}

impl<T> std::fmt::Debug for BalanceAnalyzer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BalanceAnalyzer")
            .field("blocks_to_analyze", &self.blocks_to_analyze)
            .field("batch_size", &self.batch_size)
            .field("snapshot_path", &self.snapshot_path)
            .field("fetcher", &self.fetcher)
            .finish_non_exhaustive()
    }
}

impl BalanceAnalyzer<LoggingTransport<HttpTransport>> {
    /// Builds the production pipeline: `reqwest` transport wrapped in
    /// [`LoggingLayer`], pointed at the configured provider endpoint
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid or the HTTP client cannot be
    /// built.
    pub fn from_config(config: &AnalyzerConfig) -> Result<Self, DeltascanError> {
        config.validate()?;
        let http = HttpTransport::new(config.endpoint()?, &config.http_options())?;
        Self::with_transport(config, LoggingLayer::new().layer(http))
    }
}

impl<T: RpcTransport + 'static> BalanceAnalyzer<T> {
    /// Builds a pipeline over any transport, with a fresh cache sized from the config
    pub fn with_transport(config: &AnalyzerConfig, transport: T) -> Result<Self, DeltascanError> {
        let cache = Arc::new(BlockCache::new(config.cache_capacity)?);
        Self::with_cache(config, transport, cache)
    }

    /// Builds a pipeline that shares an existing cache
    pub fn with_cache(
        config: &AnalyzerConfig,
        transport: T,
        cache: Arc<BlockCache>,
    ) -> Result<Self, DeltascanError> {
        config.validate()?;

        let client = Arc::new(BlockClient::new(transport, config.retry_policy()));
        let fetcher = BatchFetcher::new(
            Arc::clone(&client),
            Arc::clone(&cache),
            config.worker_pool_width(),
        );

        Ok(Self {
            client,
            cache,
            transactions: RwLock::new(Arc::new(TransactionSet::new())),
            fetcher,
            blocks_to_analyze: config.blocks_to_analyze,
            batch_size: config.batch_size,
            snapshot_path: config.snapshot_path.clone(),
        })
    }

    pub fn cache(&self) -> &Arc<BlockCache> {
        &self.cache
    }

    /// Transaction set of the most recent cycle, or of the snapshot preload
    /// before the first cycle
    pub async fn transactions(&self) -> Arc<TransactionSet> {
        Arc::clone(&*self.transactions.read().await)
    }

    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    /// Loads the cache snapshot and seeds the transaction set from it
    ///
    /// A missing, corrupt, or incompatible snapshot is logged and the
    /// pipeline starts with an empty cache. Returns the number of blocks
    /// loaded.
    pub async fn bootstrap(&self) -> usize {
        let loaded = match self.cache.load_snapshot(&self.snapshot_path).await {
            Ok(loaded) => loaded,
            Err(e) if e.is_not_found() => {
                info!(
                    path = %self.snapshot_path.display(),
                    "No cache snapshot found, starting with an empty cache"
                );
                return 0;
            }
            Err(e) => {
                warn!(
                    path = %self.snapshot_path.display(),
                    error = %e,
                    "Ignoring unusable cache snapshot, starting with an empty cache"
                );
                return 0;
            }
        };

        let transactions = TransactionSet::new();
        let preloaded: usize = self
            .cache
            .blocks()
            .await
            .iter()
            .map(|block| transactions.fold_block(block))
            .sum();
        *self.transactions.write().await = Arc::new(transactions);

        info!(
            blocks = loaded,
            transactions = preloaded,
            "Preloaded transactions from cache snapshot"
        );
        loaded
    }

    /// Runs one fetch-and-aggregate cycle over the most recent blocks
    ///
    /// Batches that fail after all retries are dropped; the cycle still
    /// succeeds and [`CycleOutcome::fetch`] reports the shortfall.
    ///
    /// # Errors
    ///
    /// - [`AnalysisError::LatestBlock`] if the latest block number cannot be fetched
    /// - [`AnalysisError::WindowExceedsChainHeight`] if the chain is shorter
    ///   than the configured window; no block is fetched in that case
    pub async fn run_cycle(&self) -> Result<CycleOutcome, AnalysisError> {
        async move {
            let latest = self
                .client
                .latest_block_number()
                .await
                .map_err(AnalysisError::LatestBlock)?;
            let window = AnalysisWindow::ending_at(latest, self.blocks_to_analyze)?;
            info!(
                latest_block = %latest,
                first_block = window.first(),
                blocks = window.len(),
                "Analyzing block window"
            );

            let transactions = Arc::new(TransactionSet::new());
            let fetch = self
                .fetcher
                .fetch_window(window, self.batch_size, &transactions)
                .await;
            if fetch.is_degraded() {
                warn!(
                    batches_failed = fetch.batches_failed,
                    blocks_missing = fetch.blocks_failed,
                    "Some batches were dropped, analyzing a partial window"
                );
            }

            let transactions_analyzed = transactions.len();
            let result = find_max_change(&transactions);
            *self.transactions.write().await = transactions;

            info!(
                transactions_analyzed,
                cache_size = self.cache.size().await,
                address = %result.address,
                change_eth = %result.change_eth,
                sign = %result.sign,
                "Analysis cycle complete"
            );

            Ok(CycleOutcome {
                latest_block: latest,
                window,
                result,
                transactions_analyzed,
                fetch,
            })
        }
        .instrument(spans::run_cycle(self.blocks_to_analyze, self.batch_size))
        .await
    }

    /// Saves the cache snapshot, returns the number of blocks written
    pub async fn shutdown(&self) -> Result<usize, CacheError> {
        let stats = self.cache.stats().await;
        info!(%stats, "Saving block cache");
        self.cache.save_snapshot(&self.snapshot_path).await
    }
}
