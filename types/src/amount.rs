//! Fixed-point ledger amounts.
//!
//! The ledger represents every balance as a signed 64-bit count of stroops,
//! where one unit is 10^7 stroops. Amounts cross the API boundary as decimal
//! strings with at most 7 fractional digits.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::AmountError;

/// Number of fractional digits the ledger keeps.
pub const DECIMALS: usize = 7;

/// Stroops per whole unit.
pub const STROOPS_PER_UNIT: i64 = 10_000_000;

/// A non-negative ledger amount stored as stroops.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Self = Self(0);

    /// Largest representable amount (`i64::MAX` stroops).
    pub const MAX: Self = Self(i64::MAX);

    pub fn from_stroops(stroops: i64) -> Self {
        Self(stroops)
    }

    pub fn stroops(&self) -> i64 {
        self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    /// Parse a decimal string and require a strictly positive value.
    pub fn parse_positive(s: &str) -> Result<Self, AmountError> {
        let amount: Amount = s.parse()?;
        if !amount.is_positive() {
            return Err(AmountError::NotPositive(s.to_string()));
        }
        Ok(amount)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    /// Accepts `123`, `123.4` and `0.0000001`; rejects signs, exponents,
    /// empty parts and more than [`DECIMALS`] fractional digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(AmountError::Empty);
        }
        if s.starts_with('-') {
            return Err(AmountError::NotPositive(s.to_string()));
        }

        let (whole, fraction) = match s.split_once('.') {
            Some((w, f)) => (w, Some(f)),
            None => (s, None),
        };

        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AmountError::Malformed(s.to_string()));
        }

        let fraction = fraction.unwrap_or("");
        if s.contains('.') && fraction.is_empty() {
            return Err(AmountError::Malformed(s.to_string()));
        }
        if !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AmountError::Malformed(s.to_string()));
        }
        if fraction.len() > DECIMALS {
            return Err(AmountError::TooPrecise {
                value: s.to_string(),
                digits: fraction.len(),
            });
        }

        let whole: i64 = whole
            .parse()
            .map_err(|_| AmountError::Overflow(s.to_string()))?;

        let mut frac_stroops: i64 = 0;
        for (i, b) in fraction.bytes().enumerate() {
            let digit = i64::from(b - b'0');
            frac_stroops += digit * 10i64.pow((DECIMALS - 1 - i) as u32);
        }

        whole
            .checked_mul(STROOPS_PER_UNIT)
            .and_then(|w| w.checked_add(frac_stroops))
            .map(Self)
            .ok_or_else(|| AmountError::Overflow(s.to_string()))
    }
}

impl fmt::Display for Amount {
    /// Always renders the full 7-digit precision, e.g. `10.0000000`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let unit = STROOPS_PER_UNIT as u64;
        write!(f, "{sign}{}.{:07}", abs / unit, abs % unit)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
