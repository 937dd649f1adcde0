// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Largest balance change over the most recent blocks of an EVM chain.
//!
//! deltascan fetches a window of recent blocks from a JSON-RPC provider,
//! caches them in a fixed-capacity LRU cache that survives restarts through a
//! binary snapshot, deduplicates their transactions by hash, and reports the
//! sender of the transaction with the largest absolute value.
//!
//! # Pipeline
//!
//! 1. [`BlockClient`] asks the provider for the latest block number
//! 2. [`AnalysisWindow`] covers the configured number of blocks up to it
//! 3. [`BatchFetcher`] walks the window backward in batches, skips cached
//!    blocks, and fetches the rest with a bounded pool of workers
//! 4. [`find_max_change`] reduces the [`TransactionSet`] to a [`ResultBlock`]
//!
//! [`BalanceAnalyzer`] wires these together and is the entry point.
//!
//! # Example
//!
//! ```rust,no_run
//! use deltascan::{AnalyzerConfigBuilder, BalanceAnalyzer};
//!
//! # async fn run() -> Result<(), deltascan::DeltascanError> {
//! let config = AnalyzerConfigBuilder::new("my-api-key")
//!     .blocks_to_analyze(100)
//!     .batch_size(10)
//!     .build();
//!
//! let analyzer = BalanceAnalyzer::from_config(&config)?;
//! analyzer.bootstrap().await;
//!
//! let outcome = analyzer.run_cycle().await?;
//! println!(
//!     "{} {} {} ETH",
//!     outcome.result.address, outcome.result.sign, outcome.result.change_eth
//! );
//!
//! analyzer.shutdown().await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! Each concern has its own error type ([`RpcError`], [`CacheError`],
//! [`AnalysisError`]); [`DeltascanError`] unifies them. Only configuration
//! and window errors abort a cycle. Failed batches and unusable snapshots are
//! logged and degrade the result instead.

pub mod aggregate;
mod analyzer;
pub mod cache;
pub mod config;
pub mod errors;
pub mod fetch;
pub mod rpc;
mod tracing;
pub mod transport;
pub mod types;

pub use aggregate::{find_max_change, MaxChange};
pub use analyzer::{BalanceAnalyzer, CycleOutcome};
pub use cache::{BlockCache, CacheStats, SNAPSHOT_VERSION};
pub use config::{AnalyzerConfig, AnalyzerConfigBuilder};
pub use errors::{AnalysisError, CacheError, DeltascanError, RpcError};
pub use fetch::{AnalysisWindow, BatchFetcher, FetchReport, TransactionSet};
pub use rpc::BlockClient;
pub use transport::{
    HttpClientOptions, HttpTransport, JsonRpcRequest, JsonRpcResponse, LoggingLayer,
    LoggingTransport, RetryPolicy, RetryPolicyBuilder, RpcTransport,
};
pub use types::block::{Block, Transaction, TransactionRecord};
pub use types::number::{HexBlockNumber, ParseHexBlockNumberError};
pub use types::result::{ResultBlock, Sign};
pub use types::wei::{wei_to_ether, ParseWeiError, SignedWei};
