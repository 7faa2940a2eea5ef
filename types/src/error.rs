//! Validation errors for the value types in this crate.

use thiserror::Error;

/// Why an amount string was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,

    #[error("amount is not a decimal number: {0:?}")]
    Malformed(String),

    #[error("amount {value:?} has {digits} fractional digits, at most 7 allowed")]
    TooPrecise { value: String, digits: usize },

    #[error("amount must be positive: {0:?}")]
    NotPositive(String),

    #[error("amount out of range: {0:?}")]
    Overflow(String),
}

/// Why an asset definition was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetError {
    #[error("asset code must be 1-12 characters, got {0}")]
    InvalidCodeLength(usize),

    #[error("asset code must be ASCII alphanumeric: {0:?}")]
    InvalidCodeCharacters(String),
}
