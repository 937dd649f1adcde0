// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Block and transaction data as returned by `eth_getBlockByNumber`
//!
//! These types mirror the JSON shape of a full-transaction block response.
//! Everything is kept as the provider sent it (hex strings), blocks are
//! immutable once decoded, and the cache shares them behind `Arc`.

use serde::{Deserialize, Serialize};

use crate::types::number::HexBlockNumber;

/// A block fetched with full transaction objects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Block number (also the cache key)
    pub number: HexBlockNumber,
    /// Block hash
    pub hash: String,
    /// Transactions in block order
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// Projects every transaction in this block into a `(hash, record)` pair
    /// ready to be folded into a transaction set.
    pub fn transaction_records(&self) -> impl Iterator<Item = (String, TransactionRecord)> + '_ {
        self.transactions
            .iter()
            .map(|tx| (tx.hash.clone(), TransactionRecord::from(tx)))
    }
}

/// A transaction object inside a block response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Transaction hash (unique key)
    pub hash: String,
    /// Sender address
    pub from: String,
    /// Recipient address, `None` for contract creation
    #[serde(default)]
    pub to: Option<String>,
    /// Transferred value in wei as a hex quantity
    pub value: String,
    #[serde(default)]
    pub gas: String,
    #[serde(default)]
    pub gas_price: String,
    #[serde(default)]
    pub block_number: String,
    #[serde(default)]
    pub transaction_index: String,
}

/// The part of a transaction the aggregator looks at
///
/// Keyed by transaction hash in [`TransactionSet`](crate::TransactionSet), so the
/// same transaction seen twice (snapshot preload plus a fresh fetch, or two
/// overlapping batches) collapses into one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub from: String,
    pub to: Option<String>,
    pub value: String,
}

impl From<&Transaction> for TransactionRecord {
    fn from(tx: &Transaction) -> Self {
        Self {
            from: tx.from.clone(),
            to: tx.to.clone(),
            value: tx.value.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_full_transaction_block() {
        let raw = json!({
            "number": "0x10",
            "hash": "0xblockhash",
            "parentHash": "0xparent",
            "transactions": [{
                "hash": "0xaa",
                "from": "0xsender",
                "to": "0xreceiver",
                "value": "0xde0b6b3a7640000",
                "gas": "0x5208",
                "gasPrice": "0x3b9aca00",
                "blockNumber": "0x10",
                "transactionIndex": "0x0",
                "input": "0x"
            }]
        });

        let block: Block = serde_json::from_value(raw).unwrap();
        assert_eq!(block.number, HexBlockNumber::new(16));
        assert_eq!(block.transactions.len(), 1);

        let tx = &block.transactions[0];
        assert_eq!(tx.gas_price, "0x3b9aca00");
        assert_eq!(tx.transaction_index, "0x0");
        assert_eq!(tx.to.as_deref(), Some("0xreceiver"));
    }

    #[test]
    fn contract_creation_has_no_recipient() {
        let raw = json!({
            "hash": "0xbb",
            "from": "0xdeployer",
            "to": null,
            "value": "0x0"
        });

        let tx: Transaction = serde_json::from_value(raw).unwrap();
        assert!(tx.to.is_none());
        assert!(tx.gas.is_empty());
    }

    #[test]
    fn transaction_records_keep_block_order() {
        let block = Block {
            number: HexBlockNumber::new(1),
            hash: "0xh".into(),
            transactions: vec![
                Transaction {
                    hash: "0x1".into(),
                    from: "0xa".into(),
                    to: Some("0xb".into()),
                    value: "0x10".into(),
                    gas: String::new(),
                    gas_price: String::new(),
                    block_number: "0x1".into(),
                    transaction_index: "0x0".into(),
                },
                Transaction {
                    hash: "0x2".into(),
                    from: "0xc".into(),
                    to: None,
                    value: "0x20".into(),
                    gas: String::new(),
                    gas_price: String::new(),
                    block_number: "0x1".into(),
                    transaction_index: "0x1".into(),
                },
            ],
        };

        let records: Vec<_> = block.transaction_records().collect();
        assert_eq!(records[0].0, "0x1");
        assert_eq!(records[0].1.from, "0xa");
        assert_eq!(records[1].1.to, None);
        assert_eq!(records[1].1.value, "0x20");
    }
}
