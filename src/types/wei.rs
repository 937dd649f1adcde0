// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Signed wei amounts
//!
//! Transaction values arrive as hex quantities. The sign is never encoded in
//! two's complement; a negative amount is written with an explicit leading
//! minus (`-0x20`). [`SignedWei`] keeps the magnitude as a `U256` and the sign
//! as a flag, and converts to ether without going through floating point.

use alloy_primitives::U256;
use bigdecimal::BigDecimal;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Decimal places between wei and ether
const ETHER_DECIMALS: u32 = 18;

/// A wei amount with an explicit sign
///
/// # Examples
///
/// ```
/// use alloy_primitives::U256;
/// use deltascan::SignedWei;
///
/// let value: SignedWei = "-0x20".parse().unwrap();
/// assert!(value.is_negative());
/// assert_eq!(value.magnitude(), U256::from(32));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SignedWei {
    magnitude: U256,
    negative: bool,
}

impl SignedWei {
    /// Zero wei
    pub const ZERO: Self = Self {
        magnitude: U256::ZERO,
        negative: false,
    };

    /// Creates a signed amount; a zero magnitude is never negative
    pub fn new(magnitude: U256, negative: bool) -> Self {
        Self {
            magnitude,
            negative: negative && !magnitude.is_zero(),
        }
    }

    /// Absolute value in wei
    pub const fn magnitude(&self) -> U256 {
        self.magnitude
    }

    pub const fn is_negative(&self) -> bool {
        self.negative
    }

    pub fn is_zero(&self) -> bool {
        self.magnitude.is_zero()
    }

    /// Compares absolute values only
    pub fn cmp_magnitude(&self, other: &Self) -> Ordering {
        self.magnitude.cmp(&other.magnitude)
    }
}

impl fmt::Display for SignedWei {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            write!(f, "-{}", self.magnitude)
        } else {
            write!(f, "{}", self.magnitude)
        }
    }
}

/// Error returned when a transaction value is not a hex quantity
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid wei value '{input}': {reason}")]
pub struct ParseWeiError {
    input: String,
    reason: &'static str,
}

impl FromStr for SignedWei {
    type Err = ParseWeiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| ParseWeiError {
            input: s.to_string(),
            reason,
        };

        // Some providers hand back the quantity still wrapped in JSON quotes
        let trimmed = s.trim().trim_matches('"');
        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let digits = unsigned
            .strip_prefix("0x")
            .or_else(|| unsigned.strip_prefix("0X"))
            .ok_or_else(|| invalid("missing 0x prefix"))?;

        if digits.is_empty() {
            return Err(invalid("no digits after prefix"));
        }

        let magnitude =
            U256::from_str_radix(digits, 16).map_err(|_| invalid("not a 256-bit hex quantity"))?;

        Ok(Self::new(magnitude, negative))
    }
}

/// Converts a wei magnitude to ether exactly (scale 18, trailing zeros removed)
///
/// # Examples
///
/// ```
/// use alloy_primitives::U256;
/// use bigdecimal::BigDecimal;
/// use deltascan::wei_to_ether;
/// use std::str::FromStr;
///
/// let eth = wei_to_ether(U256::from(1_500_000_000_000_000_000u128));
/// assert_eq!(eth, BigDecimal::from_str("1.5").unwrap());
/// ```
pub fn wei_to_ether(wei: U256) -> BigDecimal {
    let divisor = U256::from(1_000_000_000_000_000_000u128); // 10^18

    // Split in U256 space so arbitrarily large values never pass through f64
    let whole = wei / divisor;
    let fractional = wei % divisor;

    let whole = BigDecimal::from_str(&whole.to_string()).unwrap_or_default();
    let fractional = BigDecimal::from_str(&format!("{fractional}e-{ETHER_DECIMALS}"))
        .unwrap_or_default();

    (whole + fractional).normalized()
}
