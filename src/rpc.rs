// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Typed access to the two provider methods the pipeline needs.
//!
//! [`BlockClient`] builds `eth_blockNumber` and batched `eth_getBlockByNumber`
//! requests, decodes their results, and wraps each operation in the
//! configured [`RetryPolicy`]. Each operation is retried independently: a
//! batch that keeps failing does not affect the latest-block lookup or other
//! batches.

use serde_json::{json, Value};
use tracing::debug;

use crate::errors::RpcError;
use crate::transport::{JsonRpcRequest, RetryPolicy, RpcTransport};
use crate::types::block::Block;
use crate::types::number::HexBlockNumber;

const METHOD_BLOCK_NUMBER: &str = "eth_blockNumber";
const METHOD_GET_BLOCK_BY_NUMBER: &str = "eth_getBlockByNumber";

/// Blocks are always requested with full transaction objects
const INCLUDE_FULL_TRANSACTIONS: bool = true;

/// Block-level client over any [`RpcTransport`]
#[derive(Debug, Clone)]
pub struct BlockClient<T> {
    transport: T,
    retry: RetryPolicy,
}

impl<T: RpcTransport> BlockClient<T> {
    pub fn new(transport: T, retry: RetryPolicy) -> Self {
        Self { transport, retry }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Latest block number, retried per policy.
    pub async fn latest_block_number(&self) -> Result<HexBlockNumber, RpcError> {
        self.retry
            .retry(METHOD_BLOCK_NUMBER, || self.latest_block_number_once())
            .await
    }

    /// Fetches `numbers` in one batched round trip, retried per policy.
    ///
    /// The returned blocks are in the same order as `numbers`. Any per-entry
    /// error, `null` result, undecodable block, or block whose number differs
    /// from the requested one fails the whole attempt.
    pub async fn blocks_by_number(
        &self,
        numbers: &[HexBlockNumber],
    ) -> Result<Vec<Block>, RpcError> {
        if numbers.is_empty() {
            return Ok(Vec::new());
        }
        self.retry
            .retry(METHOD_GET_BLOCK_BY_NUMBER, || self.blocks_by_number_once(numbers))
            .await
    }

    async fn latest_block_number_once(&self) -> Result<HexBlockNumber, RpcError> {
        let request = JsonRpcRequest::new(METHOD_BLOCK_NUMBER, Vec::new(), 1);
        let result = self
            .transport
            .send(request)
            .await?
            .into_result()?
            .filter(|value| !value.is_null())
            .ok_or_else(|| RpcError::empty_response(METHOD_BLOCK_NUMBER))?;

        let latest: HexBlockNumber = serde_json::from_value(result)
            .map_err(|e| RpcError::decode("eth_blockNumber result", e))?;
        debug!(latest_block = %latest, "Fetched latest block number");
        Ok(latest)
    }

    async fn blocks_by_number_once(
        &self,
        numbers: &[HexBlockNumber],
    ) -> Result<Vec<Block>, RpcError> {
        let requests = numbers
            .iter()
            .enumerate()
            .map(|(i, number)| {
                JsonRpcRequest::new(
                    METHOD_GET_BLOCK_BY_NUMBER,
                    vec![json!(number), Value::Bool(INCLUDE_FULL_TRANSACTIONS)],
                    i as u64 + 1,
                )
            })
            .collect();

        let responses = self.transport.send_batch(requests).await?;
        if responses.len() != numbers.len() {
            return Err(RpcError::BatchLengthMismatch {
                expected: numbers.len(),
                actual: responses.len(),
            });
        }

        // Responses correspond to requests by position
        numbers
            .iter()
            .zip(responses)
            .map(|(number, response)| {
                let result = response
                    .into_result()?
                    .filter(|value| !value.is_null())
                    .ok_or_else(|| RpcError::block_not_found(number))?;
                let block = serde_json::from_value::<Block>(result)
                    .map_err(|e| RpcError::decode(format!("block {number}"), e))?;
                if block.number != *number {
                    return Err(RpcError::BlockNumberMismatch {
                        requested: number.to_string(),
                        returned: block.number.to_string(),
                    });
                }
                Ok(block)
            })
            .collect()
    }
}
