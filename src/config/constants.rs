// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Default values and environment variable names
//!
//! Centralizes the knobs read by [`AnalyzerConfig`](super::AnalyzerConfig).

/// Defaults applied when a value is not configured
pub mod defaults {
    use std::time::Duration;

    /// Provider base URL; the API key is appended as a path segment
    pub const PROVIDER_BASE_URL: &str = "https://go.getblock.io/";

    pub const HTTP_TIMEOUT: Duration = Duration::from_secs(30);
    pub const MAX_IDLE_CONNECTIONS: usize = 100;
    pub const MAX_IDLE_CONNECTIONS_PER_HOST: usize = 10;
    pub const IDLE_CONNECTION_TIMEOUT: Duration = Duration::from_secs(90);

    pub const CACHE_CAPACITY: usize = 1000;
    pub const BLOCKS_TO_ANALYZE: u64 = 100;
    pub const BATCH_SIZE: u64 = 10;

    /// Worker pool width as a multiple of available parallelism
    pub const CONCURRENCY_MULTIPLIER: usize = 2;

    pub const RETRY_ATTEMPTS: u32 = 5;
    pub const RETRY_INITIAL_DELAY: Duration = Duration::from_secs(2);

    pub const SNAPSHOT_PATH: &str = "block_cache.bin";
}

/// Environment variables read by `AnalyzerConfig::from_env`
pub mod env {
    pub const API_KEY: &str = "GETBLOCK_API_KEY";
    pub const HTTP_TIMEOUT_SECS: &str = "HTTP_CLIENT_TIMEOUT_SECS";
    pub const MAX_IDLE_CONNECTIONS: &str = "MAX_IDLE_CONNS";
    pub const MAX_IDLE_CONNECTIONS_PER_HOST: &str = "MAX_IDLE_CONNS_PER_HOST";
    pub const IDLE_CONNECTION_TIMEOUT_SECS: &str = "IDLE_CONN_TIMEOUT_SECS";
    pub const CACHE_CAPACITY: &str = "CACHE_SIZE";
    pub const BLOCKS_TO_ANALYZE: &str = "BLOCKS_TO_ANALYZE";
    pub const BATCH_SIZE: &str = "BATCH_SIZE";
    pub const SNAPSHOT_PATH: &str = "CACHE_SNAPSHOT_PATH";

    /// Read by the binary's logger setup, not by the config
    pub const LOG_LEVEL: &str = "LOG_LEVEL";
    /// `production` switches the binary to JSON log output
    pub const ENVIRONMENT: &str = "ENV";
}
