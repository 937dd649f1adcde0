// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Span creation helpers for deltascan operations.
//!
//! Telemetry concerns stay out of the business logic: instead of using
//! `#[instrument]` attributes directly on functions, each instrumented
//! operation has a corresponding span helper here.
//!
//! Usage pattern:
//! ```rust,ignore
//! pub async fn my_operation(&self, param: Type) -> Result<T> {
//!     async move {
//!         // Business logic here
//!     }
//!     .instrument(spans::my_operation(param_value))
//!     .await
//! }
//! ```

use tracing::{Level, Span};

/// Create span for one full fetch-and-aggregate cycle.
///
/// Parent: None (root span for this operation)
/// Children: fetch_window span
#[inline]
pub(crate) fn run_cycle(blocks_to_analyze: u64, batch_size: u64) -> Span {
    tracing::span!(
        Level::INFO,
        "deltascan.run_cycle",
        blocks_to_analyze = blocks_to_analyze,
        batch_size = batch_size,
    )
}

/// Create span for walking an analysis window in batches.
///
/// Parent: run_cycle span
/// Children: fetch_batch spans (one per dispatched batch)
#[inline]
pub(crate) fn fetch_window(first_block: u64, last_block: u64, concurrency: usize) -> Span {
    tracing::debug_span!(
        "deltascan.fetch_window",
        first_block = first_block,
        last_block = last_block,
        concurrency = concurrency,
    )
}

/// Create span for one worker fetching a batch of cache-miss blocks.
///
/// Parent: fetch_window span
/// Children: rpc_call spans (one per attempt)
#[inline]
pub(crate) fn fetch_batch(first_block: u64, last_block: u64, blocks: usize) -> Span {
    tracing::debug_span!(
        "deltascan.fetch_batch",
        first_block = first_block,
        last_block = last_block,
        blocks = blocks,
    )
}

/// Create span for a single transport round trip.
///
/// Parent: fetch_batch span or run_cycle span
/// Children: None
#[inline]
pub(crate) fn rpc_call(method: &str) -> Span {
    tracing::trace_span!("deltascan.rpc_call", method = %method)
}

/// Create span for reading or writing the cache snapshot.
#[inline]
pub(crate) fn snapshot(operation: &'static str, path: &std::path::Path) -> Span {
    tracing::debug_span!(
        "deltascan.snapshot",
        operation = operation,
        path = %path.display(),
    )
}
