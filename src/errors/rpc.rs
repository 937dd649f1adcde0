//! Error types for the JSON-RPC wire client.
//!
//! Every failure of a single or batched call ends up here. The retry policy
//! treats all variants as transient; the batch fetcher logs and drops the
//! batch once retries are exhausted.

/// Errors that can occur while talking to the JSON-RPC provider.
///
/// # Examples
///
/// ```rust
/// use deltascan::RpcError;
///
/// let error = RpcError::protocol(-32005, "limit exceeded");
/// assert_eq!(error.to_string(), "JSON-RPC error -32005: limit exceeded");
/// ```
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// The HTTP request could not be sent or its body could not be read.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success HTTP status.
    #[error("Provider returned HTTP status {status}")]
    Status {
        /// The HTTP status code
        status: u16,
    },

    /// A response body or `result` payload did not have the expected shape.
    #[error("Failed to decode {context}: {source}")]
    Decode {
        /// What was being decoded (e.g., "batch response body")
        context: String,
        /// The underlying serde error
        #[source]
        source: serde_json::Error,
    },

    /// The response envelope carried a non-null `error` object.
    #[error("JSON-RPC error {code}: {message}")]
    Protocol {
        /// JSON-RPC error code
        code: i64,
        /// JSON-RPC error message
        message: String,
    },

    /// A batch response did not contain one entry per request.
    #[error("Batch response has {actual} entries, expected {expected}")]
    BatchLengthMismatch {
        /// Number of requests sent
        expected: usize,
        /// Number of responses received
        actual: usize,
    },

    /// `eth_getBlockByNumber` returned `null` for a block number.
    #[error("Block not found: {block_number}")]
    BlockNotFound {
        /// The block number (canonical hex) that came back empty
        block_number: String,
    },

    /// `eth_getBlockByNumber` returned a block other than the one requested.
    #[error("Requested block {requested} but provider returned {returned}")]
    BlockNumberMismatch {
        /// The block number (canonical hex) that was requested
        requested: String,
        /// The block number (canonical hex) in the response
        returned: String,
    },

    /// A response was missing both `result` and `error`.
    #[error("Response for {method} has neither result nor error")]
    EmptyResponse {
        /// The JSON-RPC method that was called
        method: String,
    },
}

impl RpcError {
    /// Create a `Protocol` error from a JSON-RPC error object.
    pub fn protocol(code: i64, message: impl Into<String>) -> Self {
        RpcError::Protocol {
            code,
            message: message.into(),
        }
    }

    /// Create a `Decode` error with context about what was being decoded.
    pub fn decode(context: impl Into<String>, source: serde_json::Error) -> Self {
        RpcError::Decode {
            context: context.into(),
            source,
        }
    }

    /// Create a `BlockNotFound` error.
    pub fn block_not_found(block_number: impl ToString) -> Self {
        RpcError::BlockNotFound {
            block_number: block_number.to_string(),
        }
    }

    /// Create an `EmptyResponse` error.
    pub fn empty_response(method: impl Into<String>) -> Self {
        RpcError::EmptyResponse {
            method: method.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_error_carries_code_and_message() {
        match RpcError::protocol(-32000, "header not found") {
            RpcError::Protocol { code, message } => {
                assert_eq!(code, -32000);
                assert_eq!(message, "header not found");
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn block_not_found_uses_display_form() {
        let error = RpcError::block_not_found(crate::HexBlockNumber::new(255));
        assert_eq!(error.to_string(), "Block not found: 0xff");
    }

    #[test]
    fn batch_mismatch_message() {
        let error = RpcError::BatchLengthMismatch {
            expected: 5,
            actual: 3,
        };
        assert_eq!(
            error.to_string(),
            "Batch response has 3 entries, expected 5"
        );
    }
}
