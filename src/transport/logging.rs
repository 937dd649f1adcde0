// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Tower-based logging layer for JSON-RPC transports.
//!
//! This module implements a logging layer that uses `tracing` to record
//! request timing and failures for any [`RpcTransport`].

use std::time::Instant;

use async_trait::async_trait;
use tower::Layer;
use tracing::{debug, trace, warn, Instrument};

use super::client::RpcTransport;
use super::envelope::{JsonRpcRequest, JsonRpcResponse};
use crate::errors::RpcError;
use crate::tracing::spans;

/// A Tower layer that adds logging/tracing to RPC calls.
///
/// # Example
///
/// ```rust,ignore
/// use deltascan::transport::{HttpTransport, LoggingLayer};
/// use tower::Layer;
///
/// let transport = LoggingLayer::new().layer(HttpTransport::new(endpoint, &options)?);
/// ```
#[derive(Clone, Debug, Default)]
pub struct LoggingLayer {
    /// Whether to log request payloads (can be verbose)
    log_requests: bool,
}

impl LoggingLayer {
    /// Creates a new logging layer that records timing and errors only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables logging of request payloads at TRACE level.
    pub fn with_request_logging(mut self) -> Self {
        self.log_requests = true;
        self
    }
}

impl<T> Layer<T> for LoggingLayer {
    type Service = LoggingTransport<T>;

    fn layer(&self, inner: T) -> Self::Service {
        LoggingTransport {
            inner,
            log_requests: self.log_requests,
        }
    }
}

/// A transport wrapper that logs every call made through it.
#[derive(Clone, Debug)]
pub struct LoggingTransport<T> {
    inner: T,
    log_requests: bool,
}

impl<T> LoggingTransport<T> {
    /// Returns the wrapped transport.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

#[async_trait]
impl<T: RpcTransport> RpcTransport for LoggingTransport<T> {
    async fn send(&self, request: JsonRpcRequest) -> Result<JsonRpcResponse, RpcError> {
        let method = request.method.clone();
        if self.log_requests {
            trace!(request = ?request, "RPC request");
        }

        let start = Instant::now();
        let result = self
            .inner
            .send(request)
            .instrument(spans::rpc_call(&method))
            .await;
        log_outcome(&method, start, result.as_ref().err());
        result
    }

    async fn send_batch(
        &self,
        requests: Vec<JsonRpcRequest>,
    ) -> Result<Vec<JsonRpcResponse>, RpcError> {
        let method = describe_batch(&requests);
        if self.log_requests {
            trace!(requests = ?requests, "RPC batch request");
        }

        let start = Instant::now();
        let result = self
            .inner
            .send_batch(requests)
            .instrument(spans::rpc_call(&method))
            .await;
        log_outcome(&method, start, result.as_ref().err());
        result
    }
}

fn log_outcome(method: &str, start: Instant, error: Option<&RpcError>) {
    let duration_ms = start.elapsed().as_millis() as u64;
    match error {
        None => debug!(duration_ms, "RPC response: {method}"),
        Some(e) => warn!(error = %e, duration_ms, "RPC error: {method}"),
    }
}

/// Describe a batch for logging: the method for one call, a count otherwise.
fn describe_batch(requests: &[JsonRpcRequest]) -> String {
    match requests {
        [] => "batch(empty)".to_string(),
        [single] => single.method.clone(),
        many => format!("batch({} calls)", many.len()),
    }
}
