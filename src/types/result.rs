// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Output of one analysis cycle

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of the winning balance change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Sign {
    /// Non-negative change, including the zero result of an empty window
    #[default]
    Increase,
    Decrease,
}

impl fmt::Display for Sign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sign::Increase => f.write_str("increase"),
            Sign::Decrease => f.write_str("decrease"),
        }
    }
}

/// The account with the largest absolute balance change in the analyzed window
///
/// Serializes as `{"address": ..., "changeEth": ..., "sign": ...}`. An empty
/// window yields an empty address, a zero change and [`Sign::Increase`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ResultBlock {
    pub address: String,
    pub change_eth: BigDecimal,
    pub sign: Sign,
}

impl ResultBlock {
    /// True when no nonzero transaction was observed
    pub fn is_empty(&self) -> bool {
        self.address.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn default_is_zero_increase_without_address() {
        let result = ResultBlock::default();
        assert!(result.is_empty());
        assert_eq!(result.sign, Sign::Increase);
        assert_eq!(result.change_eth, BigDecimal::from(0));
    }

    #[test]
    fn serializes_with_wire_field_names() {
        let result = ResultBlock {
            address: "0xabc".to_string(),
            change_eth: BigDecimal::from_str("1.5").unwrap(),
            sign: Sign::Decrease,
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["address"], "0xabc");
        assert_eq!(json["sign"], "decrease");
        assert!(json.get("changeEth").is_some());
    }
}
