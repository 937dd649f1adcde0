//! Error types for configuration and analysis-window preconditions.
//!
//! These are the only errors that abort an analysis cycle. They are raised
//! before any block fetching starts and are returned to the caller rather
//! than terminating the process, so the hosting binary or service decides
//! whether to exit or report.

use super::RpcError;

/// Fatal errors for one analysis cycle.
///
/// # Examples
///
/// ```rust,ignore
/// use deltascan::{AnalysisError, BalanceAnalyzer};
///
/// match analyzer.run_cycle().await {
///     Ok(outcome) => println!("{}", outcome.result.address),
///     Err(AnalysisError::WindowExceedsChainHeight { requested, latest }) => {
///         eprintln!("asked for {requested} blocks but the chain is at {latest}");
///     }
///     Err(e) => eprintln!("analysis failed: {e}"),
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// No provider API key was configured.
    #[error("Provider API key is not set (GETBLOCK_API_KEY)")]
    MissingApiKey,

    /// A configuration value is out of range or could not be parsed.
    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the invalid value
        reason: String,
    },

    /// The requested window reaches below the genesis block.
    #[error("Cannot analyze {requested} blocks: latest block is {latest}")]
    WindowExceedsChainHeight {
        /// Number of blocks requested
        requested: u64,
        /// Latest block number reported by the provider
        latest: u64,
    },

    /// The latest block number could not be fetched after all retries.
    #[error("Failed to get latest block number: {0}")]
    LatestBlock(#[source] RpcError),
}

impl AnalysisError {
    /// Create an `InvalidConfig` error with a reason.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        AnalysisError::InvalidConfig {
            reason: reason.into(),
        }
    }
}
