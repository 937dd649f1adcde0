//! Error types for the deltascan library.
//!
//! This module provides strongly-typed errors for all public APIs in deltascan.
//! It follows a hybrid approach:
//!
//! - **Module-specific errors** for fine-grained error handling (`RpcError`,
//!   `CacheError`, `AnalysisError`)
//! - **Unified error type** (`DeltascanError`) for convenience when you don't need
//!   to distinguish between error sources
//!
//! # Architecture
//!
//! - [`RpcError`] - Transport, protocol and decode failures of the JSON-RPC client.
//!   Retried, then swallowed per batch by the fetcher.
//! - [`CacheError`] - Cache construction and snapshot I/O. Soft failures at the
//!   pipeline level.
//! - [`AnalysisError`] - Configuration and window preconditions. The only class
//!   that aborts a cycle.
//!
//! # Examples
//!
//! ```rust,ignore
//! use deltascan::{AnalyzerConfig, BalanceAnalyzer, DeltascanError};
//!
//! async fn example() -> Result<(), DeltascanError> {
//!     let config = AnalyzerConfig::from_env()?;
//!     let analyzer = BalanceAnalyzer::from_config(&config)?;
//!     let outcome = analyzer.run_cycle().await?;
//!     analyzer.shutdown().await?;
//!     Ok(())
//! }
//! ```

mod analysis;
mod cache;
mod rpc;

pub use analysis::AnalysisError;
pub use cache::CacheError;
pub use rpc::RpcError;

/// Unified error type for all deltascan operations.
///
/// All module-specific error types automatically convert to `DeltascanError` via
/// `From` implementations, so you can use `?` to propagate errors naturally.
#[derive(Debug, thiserror::Error)]
pub enum DeltascanError {
    /// Error from configuration or window validation.
    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    /// Error from the block cache or its snapshot.
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// Error from the JSON-RPC client.
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),
}
