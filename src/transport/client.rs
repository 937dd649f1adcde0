// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! JSON-RPC wire client over HTTPS.
//!
//! [`RpcTransport`] is the seam between the pipeline and the network: one
//! outbound call per invocation, no retries at this layer. [`HttpTransport`] is
//! the production implementation on top of `reqwest`; tests plug in their own.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use url::Url;

use super::envelope::{JsonRpcRequest, JsonRpcResponse};
use crate::errors::RpcError;

/// A transport able to carry single and batched JSON-RPC calls.
///
/// Implementations must return batch responses in request order; callers
/// re-associate responses to requests by position, not by `id`.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    /// Sends one request and returns its response envelope.
    ///
    /// The envelope's `error` member is not inspected here; use
    /// [`JsonRpcResponse::into_result`] to surface it.
    async fn send(&self, request: JsonRpcRequest) -> Result<JsonRpcResponse, RpcError>;

    /// Sends all requests as one JSON array and returns one response per
    /// request, in the same order.
    async fn send_batch(
        &self,
        requests: Vec<JsonRpcRequest>,
    ) -> Result<Vec<JsonRpcResponse>, RpcError>;
}

#[async_trait]
impl<T: RpcTransport + ?Sized> RpcTransport for Arc<T> {
    async fn send(&self, request: JsonRpcRequest) -> Result<JsonRpcResponse, RpcError> {
        (**self).send(request).await
    }

    async fn send_batch(
        &self,
        requests: Vec<JsonRpcRequest>,
    ) -> Result<Vec<JsonRpcResponse>, RpcError> {
        (**self).send_batch(requests).await
    }
}

/// Connection pool settings for [`HttpTransport`]
#[derive(Debug, Clone)]
pub struct HttpClientOptions {
    /// Total timeout for one request
    pub timeout: Duration,
    /// Upper bound for idle connections kept across all hosts
    pub max_idle_connections: usize,
    /// Idle connections kept per host
    pub max_idle_connections_per_host: usize,
    /// How long an idle connection is kept open
    pub idle_connection_timeout: Duration,
}

impl Default for HttpClientOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_idle_connections: 100,
            max_idle_connections_per_host: 10,
            idle_connection_timeout: Duration::from_secs(90),
        }
    }
}

/// `reqwest`-backed transport posting to one fixed endpoint
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpTransport {
    /// Creates a transport for `endpoint` with a tuned connection pool.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError::Http`] if the underlying client cannot be built
    /// (e.g., the TLS backend fails to initialize).
    pub fn new(endpoint: Url, options: &HttpClientOptions) -> Result<Self, RpcError> {
        // reqwest only caps idle connections per host; the total cap bounds it
        let per_host = options
            .max_idle_connections_per_host
            .min(options.max_idle_connections);

        let client = reqwest::Client::builder()
            .timeout(options.timeout)
            .pool_max_idle_per_host(per_host)
            .pool_idle_timeout(options.idle_connection_timeout)
            .build()?;

        Ok(Self { client, endpoint })
    }

    /// Creates a transport around an existing client.
    pub fn with_client(client: reqwest::Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    /// The endpoint every call is posted to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn post<B: serde::Serialize + ?Sized>(&self, body: &B) -> Result<Vec<u8>, RpcError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RpcError::Status {
                status: status.as_u16(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn send(&self, request: JsonRpcRequest) -> Result<JsonRpcResponse, RpcError> {
        let body = self.post(&request).await?;
        serde_json::from_slice(&body).map_err(|e| RpcError::decode("response body", e))
    }

    async fn send_batch(
        &self,
        requests: Vec<JsonRpcRequest>,
    ) -> Result<Vec<JsonRpcResponse>, RpcError> {
        if requests.is_empty() {
            return Ok(Vec::new());
        }

        let body = self.post(&requests).await?;
        let responses: Vec<JsonRpcResponse> = match serde_json::from_slice(&body) {
            Ok(responses) => responses,
            Err(array_error) => {
                // Providers reject whole batches with a single error object
                return match serde_json::from_slice::<JsonRpcResponse>(&body) {
                    Ok(single) => match single.into_result() {
                        Err(protocol) => Err(protocol),
                        Ok(_) => Err(RpcError::decode("batch response body", array_error)),
                    },
                    Err(_) => Err(RpcError::decode("batch response body", array_error)),
                };
            }
        };

        if responses.len() != requests.len() {
            return Err(RpcError::BatchLengthMismatch {
                expected: requests.len(),
                actual: responses.len(),
            });
        }

        Ok(responses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options() {
        let options = HttpClientOptions::default();
        assert_eq!(options.timeout, Duration::from_secs(30));
        assert_eq!(options.max_idle_connections_per_host, 10);
    }

    #[tokio::test]
    async fn empty_batch_makes_no_request() {
        // Port 9 (discard) is never contacted for an empty batch
        let endpoint = Url::parse("http://127.0.0.1:9/").unwrap();
        let transport = HttpTransport::new(endpoint, &HttpClientOptions::default()).unwrap();
        let responses = transport.send_batch(Vec::new()).await.unwrap();
        assert!(responses.is_empty());
    }
}
