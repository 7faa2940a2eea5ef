use anchor_custody::{CryptoError, CustodyError};
use anchor_ledger_client::{LedgerError, RejectionReason};
use anchor_store::StoreError;
use anchor_transactions::BuildError;
use anchor_types::AmountError;
use thiserror::Error;

use crate::provisioning::ProvisioningState;

/// How a caller should treat a failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorClass {
    /// The request itself was invalid. Nothing was sent.
    InvalidRequest,
    /// The ledger refused the transaction for a domain reason. Nothing was applied.
    Rejected,
    /// The transaction may or may not have been applied.
    Ambiguous,
    /// A fault on our side (keys, storage, configuration, transport before sending).
    Internal,
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("account not found: {0}")]
    AccountNotFound(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),

    #[error("invalid username {0:?}")]
    InvalidUsername(String),

    #[error("invalid transaction: {0}")]
    InvalidTransaction(BuildError),

    #[error("network error: {message}")]
    Network { message: String, ambiguous: bool },

    #[error("submission rejected: {reason}")]
    SubmissionRejected { reason: RejectionReason },

    #[error("deadline exceeded before submission")]
    DeadlineExceeded,

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("provisioning of {username} stopped at {reached}: {source}")]
    ProvisioningAborted {
        username: String,
        reached: ProvisioningState,
        source: Box<WorkflowError>,
    },
}

impl WorkflowError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::AccountNotFound(_)
            | Self::InvalidAmount(_)
            | Self::InvalidUsername(_)
            | Self::InvalidTransaction(_) => ErrorClass::InvalidRequest,
            Self::SubmissionRejected { .. } => ErrorClass::Rejected,
            Self::Network {
                ambiguous: true, ..
            } => ErrorClass::Ambiguous,
            Self::Network { .. }
            | Self::Crypto(_)
            | Self::DeadlineExceeded
            | Self::Storage(_)
            | Self::Config(_) => ErrorClass::Internal,
            Self::ProvisioningAborted { source, .. } => source.class(),
        }
    }

    /// The ledger's rejection reason, looking through a provisioning abort.
    pub fn rejection(&self) -> Option<&RejectionReason> {
        match self {
            Self::SubmissionRejected { reason } => Some(reason),
            Self::ProvisioningAborted { source, .. } => source.rejection(),
            _ => None,
        }
    }

    pub fn is_bad_sequence(&self) -> bool {
        matches!(self.rejection(), Some(RejectionReason::BadSequence))
    }

    /// The ledger was unreachable, refused, or too slow. Key, storage and
    /// configuration faults are not ledger failures.
    pub fn is_ledger_failure(&self) -> bool {
        matches!(
            self,
            Self::Network { .. }
                | Self::SubmissionRejected { .. }
                | Self::AccountNotFound(_)
                | Self::DeadlineExceeded
        )
    }
}

impl From<LedgerError> for WorkflowError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::AccountNotFound(id) => Self::AccountNotFound(id.to_string()),
            LedgerError::Network { message, ambiguous } => Self::Network { message, ambiguous },
            LedgerError::SubmissionRejected { reason } => Self::SubmissionRejected { reason },
        }
    }
}

impl From<BuildError> for WorkflowError {
    fn from(e: BuildError) -> Self {
        match e {
            BuildError::InvalidAmount(amount) => Self::InvalidAmount(amount),
            other => Self::InvalidTransaction(other),
        }
    }
}

impl From<CustodyError> for WorkflowError {
    fn from(e: CustodyError) -> Self {
        match e {
            CustodyError::Crypto(crypto) => Self::Crypto(crypto),
            CustodyError::MissingSigner(role) => {
                Self::Config(format!("no signer configured for role {role}"))
            }
        }
    }
}
