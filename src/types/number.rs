// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Canonical hex block numbers
//!
//! Block numbers travel over JSON-RPC as `0x`-prefixed hex quantities and are
//! also used as cache keys. [`HexBlockNumber`] stores the number itself and
//! renders it one way only (lowercase, `0x` prefix, no leading zeros), so a
//! cache lookup and an RPC request can never disagree on the string form of
//! the same block.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A block number with a single canonical hex representation
///
/// # Examples
///
/// ```
/// use deltascan::HexBlockNumber;
///
/// let n: HexBlockNumber = "0x00FF".parse().unwrap();
/// assert_eq!(n.to_string(), "0xff");
/// assert_eq!(n.as_u64(), 255);
/// assert_eq!(HexBlockNumber::new(0).to_string(), "0x0");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct HexBlockNumber(u64);

impl HexBlockNumber {
    /// Wraps a raw block number
    pub const fn new(number: u64) -> Self {
        Self(number)
    }

    /// Returns the raw block number
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl From<u64> for HexBlockNumber {
    fn from(number: u64) -> Self {
        Self(number)
    }
}

impl From<HexBlockNumber> for u64 {
    fn from(number: HexBlockNumber) -> Self {
        number.0
    }
}

impl fmt::Display for HexBlockNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Error returned when a string is not a valid hex block number
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid hex block number '{input}': {reason}")]
pub struct ParseHexBlockNumberError {
    input: String,
    reason: &'static str,
}

impl FromStr for HexBlockNumber {
    type Err = ParseHexBlockNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| ParseHexBlockNumberError {
            input: s.to_string(),
            reason,
        };

        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or_else(|| invalid("missing 0x prefix"))?;

        if digits.is_empty() {
            return Err(invalid("no digits after prefix"));
        }

        u64::from_str_radix(digits, 16)
            .map(Self)
            .map_err(|_| invalid("not a 64-bit hex quantity"))
    }
}

impl Serialize for HexBlockNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HexBlockNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
