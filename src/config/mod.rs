// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Configuration for deltascan analysis runs
//!
//! [`AnalyzerConfig`] carries the provider credentials, HTTP client tuning,
//! cache sizing, window and batch sizes, and the retry schedule. It is plain
//! data: build it with [`AnalyzerConfigBuilder`] or load it from the
//! environment with [`AnalyzerConfig::from_env`], then hand it to
//! [`BalanceAnalyzer`](crate::BalanceAnalyzer).
//!
//! # Example: Builder
//!
//! ```rust
//! use deltascan::AnalyzerConfigBuilder;
//!
//! let config = AnalyzerConfigBuilder::new("my-api-key")
//!     .blocks_to_analyze(50)
//!     .batch_size(5)
//!     .build();
//!
//! assert!(config.validate().is_ok());
//! assert_eq!(config.endpoint().unwrap().as_str(), "https://go.getblock.io/my-api-key/");
//! ```
//!
//! # Example: Environment
//!
//! ```rust,no_run
//! use deltascan::AnalyzerConfig;
//!
//! // Reads .env (if present) and GETBLOCK_API_KEY, BATCH_SIZE, ...
//! let config = AnalyzerConfig::from_env()?;
//! # Ok::<(), deltascan::AnalysisError>(())
//! ```

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::errors::AnalysisError;
use crate::transport::{HttpClientOptions, RetryPolicy};

pub mod constants;

use constants::{defaults, env};

/// Configuration for a [`BalanceAnalyzer`](crate::BalanceAnalyzer)
#[derive(Clone)]
pub struct AnalyzerConfig {
    /// Provider API key, embedded as a path segment of the endpoint
    pub api_key: String,

    /// Provider base URL; must end with `/`
    /// Default: `https://go.getblock.io/`
    pub provider_base_url: String,

    /// Total timeout per HTTP request
    /// Default: 30 seconds
    pub http_timeout: Duration,

    /// Upper bound on idle pooled connections
    /// Default: 100
    pub max_idle_connections: usize,

    /// Idle pooled connections kept per host
    /// Default: 10
    pub max_idle_connections_per_host: usize,

    /// How long an idle pooled connection is kept
    /// Default: 90 seconds
    pub idle_connection_timeout: Duration,

    /// Maximum number of cached blocks
    /// Default: 1000
    pub cache_capacity: usize,

    /// Number of most recent blocks analyzed per cycle
    /// Default: 100
    pub blocks_to_analyze: u64,

    /// Block numbers per batched request
    /// Default: 10
    pub batch_size: u64,

    /// Worker pool width as a multiple of available parallelism
    /// Default: 2
    pub concurrency_multiplier: usize,

    /// Attempts per operation, including the first
    /// Default: 5
    pub retry_attempts: u32,

    /// Delay after the first failed attempt, doubled after each further failure
    /// Default: 2 seconds
    pub retry_initial_delay: Duration,

    /// Where the cache snapshot is loaded from and saved to
    /// Default: `block_cache.bin`
    pub snapshot_path: PathBuf,
}

impl std::fmt::Debug for AnalyzerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyzerConfig")
            .field("api_key", &"<redacted>")
            .field("provider_base_url", &self.provider_base_url)
            .field("http_timeout", &self.http_timeout)
            .field("max_idle_connections", &self.max_idle_connections)
            .field(
                "max_idle_connections_per_host",
                &self.max_idle_connections_per_host,
            )
            .field("idle_connection_timeout", &self.idle_connection_timeout)
            .field("cache_capacity", &self.cache_capacity)
            .field("blocks_to_analyze", &self.blocks_to_analyze)
            .field("batch_size", &self.batch_size)
            .field("concurrency_multiplier", &self.concurrency_multiplier)
            .field("retry_attempts", &self.retry_attempts)
            .field("retry_initial_delay", &self.retry_initial_delay)
            .field("snapshot_path", &self.snapshot_path)
            .finish()
    }
}

impl AnalyzerConfig {
    /// Creates a config with defaults for everything but the API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            provider_base_url: defaults::PROVIDER_BASE_URL.to_string(),
            http_timeout: defaults::HTTP_TIMEOUT,
            max_idle_connections: defaults::MAX_IDLE_CONNECTIONS,
            max_idle_connections_per_host: defaults::MAX_IDLE_CONNECTIONS_PER_HOST,
            idle_connection_timeout: defaults::IDLE_CONNECTION_TIMEOUT,
            cache_capacity: defaults::CACHE_CAPACITY,
            blocks_to_analyze: defaults::BLOCKS_TO_ANALYZE,
            batch_size: defaults::BATCH_SIZE,
            concurrency_multiplier: defaults::CONCURRENCY_MULTIPLIER,
            retry_attempts: defaults::RETRY_ATTEMPTS,
            retry_initial_delay: defaults::RETRY_INITIAL_DELAY,
            snapshot_path: PathBuf::from(defaults::SNAPSHOT_PATH),
        }
    }

    /// Loads `.env` (if present), then reads the process environment
    ///
    /// Unset variables fall back to their defaults. The result is validated.
    ///
    /// # Errors
    ///
    /// - [`AnalysisError::MissingApiKey`] if `GETBLOCK_API_KEY` is unset or empty
    /// - [`AnalysisError::InvalidConfig`] if a numeric variable does not parse
    ///   or a value fails [`validate`](Self::validate)
    pub fn from_env() -> Result<Self, AnalysisError> {
        // A missing .env file is fine
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup, using the same variable names as
    /// [`from_env`](Self::from_env)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AnalysisError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(env::API_KEY)
            .filter(|key| !key.trim().is_empty())
            .ok_or(AnalysisError::MissingApiKey)?;

        let mut config = Self::new(api_key.trim());

        if let Some(secs) = parse_var::<u64, _>(&lookup, env::HTTP_TIMEOUT_SECS)? {
            config.http_timeout = Duration::from_secs(secs);
        }
        if let Some(n) = parse_var(&lookup, env::MAX_IDLE_CONNECTIONS)? {
            config.max_idle_connections = n;
        }
        if let Some(n) = parse_var(&lookup, env::MAX_IDLE_CONNECTIONS_PER_HOST)? {
            config.max_idle_connections_per_host = n;
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, env::IDLE_CONNECTION_TIMEOUT_SECS)? {
            config.idle_connection_timeout = Duration::from_secs(secs);
        }
        if let Some(n) = parse_var(&lookup, env::CACHE_CAPACITY)? {
            config.cache_capacity = n;
        }
        if let Some(n) = parse_var(&lookup, env::BLOCKS_TO_ANALYZE)? {
            config.blocks_to_analyze = n;
        }
        if let Some(n) = parse_var(&lookup, env::BATCH_SIZE)? {
            config.batch_size = n;
        }
        if let Some(path) = lookup(env::SNAPSHOT_PATH).filter(|p| !p.is_empty()) {
            config.snapshot_path = PathBuf::from(path);
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks that every value is usable
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::MissingApiKey`] for an empty key and
    /// [`AnalysisError::InvalidConfig`] for zero sizes, zero attempts, or an
    /// unparseable provider URL.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.api_key.trim().is_empty() {
            return Err(AnalysisError::MissingApiKey);
        }
        if self.cache_capacity == 0 {
            return Err(AnalysisError::invalid_config(
                "cache capacity must be greater than zero",
            ));
        }
        if self.blocks_to_analyze == 0 {
            return Err(AnalysisError::invalid_config(
                "blocks to analyze must be greater than zero",
            ));
        }
        if self.batch_size == 0 {
            return Err(AnalysisError::invalid_config(
                "batch size must be greater than zero",
            ));
        }
        if self.concurrency_multiplier == 0 {
            return Err(AnalysisError::invalid_config(
                "concurrency multiplier must be greater than zero",
            ));
        }
        if self.retry_attempts == 0 {
            return Err(AnalysisError::invalid_config(
                "retry attempts must be greater than zero",
            ));
        }
        self.endpoint()?;
        Ok(())
    }

    /// Request URL: the base URL with the API key appended as a path segment
    pub fn endpoint(&self) -> Result<Url, AnalysisError> {
        let base = Url::parse(&self.provider_base_url).map_err(|e| {
            AnalysisError::invalid_config(format!(
                "provider base URL '{}' is invalid: {e}",
                self.provider_base_url
            ))
        })?;
        base.join(&format!("{}/", self.api_key.trim()))
            .map_err(|e| AnalysisError::invalid_config(format!("cannot build provider URL: {e}")))
    }

    /// HTTP client settings derived from this config
    pub fn http_options(&self) -> HttpClientOptions {
        HttpClientOptions {
            timeout: self.http_timeout,
            max_idle_connections: self.max_idle_connections,
            max_idle_connections_per_host: self.max_idle_connections_per_host,
            idle_connection_timeout: self.idle_connection_timeout,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_attempts, self.retry_initial_delay)
    }

    /// Worker pool width: `concurrency_multiplier` times available parallelism
    pub fn worker_pool_width(&self) -> usize {
        let parallelism = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        self.concurrency_multiplier.max(1).saturating_mul(parallelism)
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>, AnalysisError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw.trim().parse().map(Some).map_err(|e| {
            AnalysisError::invalid_config(format!("{key}='{raw}' is not valid: {e}"))
        }),
    }
}

/// Builder for [`AnalyzerConfig`]
#[derive(Debug, Clone)]
pub struct AnalyzerConfigBuilder {
    config: AnalyzerConfig,
}

impl AnalyzerConfigBuilder {
    /// Start from the defaults with the given API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            config: AnalyzerConfig::new(api_key),
        }
    }

    pub fn provider_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.provider_base_url = url.into();
        self
    }

    pub fn http_timeout(mut self, timeout: Duration) -> Self {
        self.config.http_timeout = timeout;
        self
    }

    pub fn max_idle_connections(mut self, total: usize, per_host: usize) -> Self {
        self.config.max_idle_connections = total;
        self.config.max_idle_connections_per_host = per_host;
        self
    }

    pub fn idle_connection_timeout(mut self, timeout: Duration) -> Self {
        self.config.idle_connection_timeout = timeout;
        self
    }

    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.config.cache_capacity = capacity;
        self
    }

    pub fn blocks_to_analyze(mut self, blocks: u64) -> Self {
        self.config.blocks_to_analyze = blocks;
        self
    }

    pub fn batch_size(mut self, size: u64) -> Self {
        self.config.batch_size = size;
        self
    }

    pub fn concurrency_multiplier(mut self, multiplier: usize) -> Self {
        self.config.concurrency_multiplier = multiplier;
        self
    }

    /// Set the retry schedule
    ///
    /// # Example
    ///
    /// ```rust
    /// use deltascan::AnalyzerConfigBuilder;
    /// use std::time::Duration;
    ///
    /// let config = AnalyzerConfigBuilder::new("key")
    ///     .retry(3, Duration::from_millis(500))
    ///     .build();
    /// assert_eq!(config.retry_policy().delay_for_attempt(2), Duration::from_secs(1));
    /// ```
    pub fn retry(mut self, attempts: u32, initial_delay: Duration) -> Self {
        self.config.retry_attempts = attempts;
        self.config.retry_initial_delay = initial_delay;
        self
    }

    pub fn snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.snapshot_path = path.into();
        self
    }

    /// Build the final configuration; call [`AnalyzerConfig::validate`] to check it
    pub fn build(self) -> AnalyzerConfig {
        self.config
    }
}
