// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Transport layer for the JSON-RPC provider.
//!
//! - [`envelope`]: JSON-RPC 2.0 request/response types
//! - [`RpcTransport`]: single and batched calls, one network round trip each
//! - [`HttpTransport`]: the `reqwest` implementation posting to one endpoint
//! - [`LoggingLayer`]: Tower layer wrapping any transport with `tracing` output
//! - [`RetryPolicy`]: bounded exponential backoff around whole operations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use deltascan::transport::{HttpClientOptions, HttpTransport, LoggingLayer};
//! use tower::Layer;
//!
//! let http = HttpTransport::new(endpoint, &HttpClientOptions::default())?;
//! let transport = LoggingLayer::new().layer(http);
//! ```

mod client;
pub mod envelope;
mod logging;
mod retry;

pub use client::{HttpClientOptions, HttpTransport, RpcTransport};
pub use envelope::{JsonRpcErrorObject, JsonRpcRequest, JsonRpcResponse};
pub use logging::{LoggingLayer, LoggingTransport};
pub use retry::{RetryPolicy, RetryPolicyBuilder};
