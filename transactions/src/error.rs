use anchor_types::AmountError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),

    #[error("transaction has no operations")]
    NoOperations,

    #[error("transaction has {0} operations, at most 100 allowed")]
    TooManyOperations(usize),

    #[error("invalid {field} account id: {reason}")]
    InvalidAccount { field: &'static str, reason: String },

    #[error("{0} requires an issued asset, not native")]
    NativeAssetNotAllowed(&'static str),

    #[error("allow-trust must be signed by the asset issuer {issuer}")]
    NotIssuer { issuer: String },

    #[error("memo text is {0} bytes, at most 28 allowed")]
    MemoTooLong(usize),

    #[error("fee overflows 32 bits")]
    FeeOverflow,

    #[error("sequence number overflow")]
    SequenceOverflow,
}
