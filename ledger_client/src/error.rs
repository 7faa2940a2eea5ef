use anchor_types::AccountId;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("account not found: {0}")]
    AccountNotFound(AccountId),

    /// Transport failure, timeout, or an unexpected response. When `ambiguous`
    /// is set the transaction may or may not have been applied.
    #[error("network error: {message}")]
    Network { message: String, ambiguous: bool },

    /// The ledger evaluated the transaction and refused it. Nothing was applied.
    #[error("submission rejected: {reason}")]
    SubmissionRejected { reason: RejectionReason },
}

impl LedgerError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            ambiguous: false,
        }
    }

    pub fn ambiguous(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            ambiguous: true,
        }
    }

    pub fn rejected(reason: RejectionReason) -> Self {
        Self::SubmissionRejected { reason }
    }

    pub fn is_bad_sequence(&self) -> bool {
        matches!(
            self,
            Self::SubmissionRejected {
                reason: RejectionReason::BadSequence
            }
        )
    }
}

/// Why the ledger refused a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    /// The sequence number was already consumed (a concurrent transaction won).
    BadSequence,
    /// Destination (or source) has no trustline to the asset.
    NoTrust,
    /// Trustline exists but the issuer has not authorized it.
    NotAuthorized,
    Underfunded,
    /// Signatures do not meet the required threshold.
    BadAuth,
    NoDestination,
    AlreadyExists,
    LineFull,
    InsufficientFee,
    /// Any other result code, verbatim.
    Other(String),
}

impl RejectionReason {
    /// Map Horizon result codes to a reason. Operation codes are more specific
    /// than the transaction code, so the first failing operation wins.
    pub fn from_result_codes(transaction: &str, operations: &[String]) -> Self {
        operations
            .iter()
            .map(String::as_str)
            .find(|code| *code != "op_success")
            .map(Self::from_code)
            .unwrap_or_else(|| Self::from_code(transaction))
    }

    pub fn from_code(code: &str) -> Self {
        match code {
            "tx_bad_seq" => Self::BadSequence,
            "op_no_trust" | "op_src_no_trust" => Self::NoTrust,
            "op_not_authorized" | "op_src_not_authorized" => Self::NotAuthorized,
            "op_underfunded" | "tx_insufficient_balance" => Self::Underfunded,
            "tx_bad_auth" | "tx_bad_auth_extra" | "op_bad_auth" => Self::BadAuth,
            "op_no_destination" | "op_no_account" => Self::NoDestination,
            "op_already_exists" => Self::AlreadyExists,
            "op_line_full" => Self::LineFull,
            "tx_insufficient_fee" => Self::InsufficientFee,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Self::BadSequence => "bad-seq",
            Self::NoTrust => "no-trust",
            Self::NotAuthorized => "not-authorized",
            Self::Underfunded => "underfunded",
            Self::BadAuth => "bad-auth",
            Self::NoDestination => "no-destination",
            Self::AlreadyExists => "already-exists",
            Self::LineFull => "line-full",
            Self::InsufficientFee => "insufficient-fee",
            Self::Other(code) => code,
        };
        f.write_str(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ops(codes: &[&str]) -> Vec<String> {
        codes.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn operation_code_beats_transaction_code() {
        assert_eq!(
            RejectionReason::from_result_codes("tx_failed", &ops(&["op_success", "op_no_trust"])),
            RejectionReason::NoTrust
        );
    }

    #[test]
    fn transaction_code_used_without_failing_operation() {
        assert_eq!(
            RejectionReason::from_result_codes("tx_bad_seq", &[]),
            RejectionReason::BadSequence
        );
        assert_eq!(
            RejectionReason::from_result_codes("tx_bad_auth", &ops(&["op_success"])),
            RejectionReason::BadAuth
        );
    }

    #[test]
    fn unknown_codes_are_preserved() {
        let reason = RejectionReason::from_code("op_cross_self");
        assert_eq!(reason, RejectionReason::Other("op_cross_self".into()));
        assert_eq!(reason.to_string(), "op_cross_self");
    }

    #[test]
    fn display_codes() {
        assert_eq!(RejectionReason::NoTrust.to_string(), "no-trust");
        assert_eq!(
            LedgerError::rejected(RejectionReason::BadSequence).to_string(),
            "submission rejected: bad-seq"
        );
        assert!(LedgerError::rejected(RejectionReason::BadSequence).is_bad_sequence());
        assert!(!LedgerError::network("down").is_bad_sequence());
    }
}
