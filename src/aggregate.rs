// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Largest balance change over a transaction set
//!
//! Every record's `value` is parsed as a signed wei amount. The record with
//! the strictly largest magnitude wins; its sender is reported as the address
//! and the magnitude is converted to ether exactly.
//!
//! Ties keep whichever record was seen first. The set's iteration order is
//! unspecified, so the winner among equal magnitudes is not deterministic.
//!
//! Zero-valued transfers never win: a set that is empty or holds only zero
//! values yields [`ResultBlock::default`] (empty address, zero, increase).

use alloy_primitives::U256;
use tracing::warn;

use crate::fetch::TransactionSet;
use crate::types::result::{ResultBlock, Sign};
use crate::types::wei::{wei_to_ether, SignedWei};

/// Running maximum over signed wei values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaxChange {
    address: String,
    value: SignedWei,
}

impl MaxChange {
    /// Offers a candidate, keeps it only if its magnitude is strictly larger
    pub fn offer(&mut self, address: &str, value: SignedWei) -> bool {
        if value.cmp_magnitude(&self.value).is_gt() {
            self.address = address.to_string();
            self.value = value;
            true
        } else {
            false
        }
    }

    /// Magnitude of the current winner, in wei
    pub fn magnitude(&self) -> U256 {
        self.value.magnitude()
    }

    pub fn into_result(self) -> ResultBlock {
        let sign = if self.value.is_negative() {
            Sign::Decrease
        } else {
            Sign::Increase
        };
        ResultBlock {
            address: self.address,
            change_eth: wei_to_ether(self.value.magnitude()),
            sign,
        }
    }
}

/// Finds the transaction with the largest absolute value in `transactions`
///
/// Records whose value cannot be parsed are skipped with a warning.
pub fn find_max_change(transactions: &TransactionSet) -> ResultBlock {
    let mut max = MaxChange::default();
    for entry in transactions.iter() {
        let record = entry.value();
        match record.value.parse::<SignedWei>() {
            Ok(value) => {
                max.offer(&record.from, value);
            }
            Err(e) => {
                warn!(
                    tx_hash = %entry.key(),
                    value = %record.value,
                    error = %e,
                    "Skipping transaction with unparseable value"
                );
            }
        }
    }
    max.into_result()
}
