//! Typed ledger operations.

use anchor_types::{AccountId, Amount, Asset};
use serde::{Deserialize, Serialize};

use crate::error::BuildError;
use crate::state::Thresholds;

/// An operational signer to add to an account, with its weight.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerWeight {
    pub key: AccountId,
    pub weight: u8,
}

/// One step of a transaction. All operations run against the transaction's
/// source account unless they name another account explicitly.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    /// Create and fund a new account with native currency.
    CreateAccount {
        destination: AccountId,
        starting_balance: Amount,
    },
    /// Open a trustline to an issued asset, with the maximum limit.
    ChangeTrust { asset: Asset },
    /// Issuer-side authorization of a holder's trustline.
    AllowTrust {
        trustor: AccountId,
        asset: Asset,
        authorize: bool,
    },
    /// Add signers and set thresholds on the source account. Expands to one
    /// ledger operation per signer; master weight and thresholds ride on the first.
    SetSignerWeights {
        signers: Vec<SignerWeight>,
        master_weight: Option<u8>,
        thresholds: Thresholds,
    },
    Payment {
        destination: AccountId,
        asset: Asset,
        amount: Amount,
    },
}

impl Operation {
    /// Payment from a decimal amount string.
    pub fn payment(destination: AccountId, asset: Asset, amount: &str) -> Result<Self, BuildError> {
        Ok(Self::Payment {
            destination,
            asset,
            amount: Amount::parse_positive(amount)?,
        })
    }

    /// Account creation from a decimal starting balance.
    pub fn create_account(destination: AccountId, starting_balance: &str) -> Result<Self, BuildError> {
        Ok(Self::CreateAccount {
            destination,
            starting_balance: Amount::parse_positive(starting_balance)?,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateAccount { .. } => "create_account",
            Self::ChangeTrust { .. } => "change_trust",
            Self::AllowTrust { .. } => "allow_trust",
            Self::SetSignerWeights { .. } => "set_signer_weights",
            Self::Payment { .. } => "payment",
        }
    }

    /// Number of ledger operations this expands to on the wire.
    pub fn wire_count(&self) -> usize {
        match self {
            Self::SetSignerWeights { signers, .. } => signers.len().max(1),
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_types::AmountError;

    #[test]
    fn payment_parses_amount() {
        let op = Operation::payment(AccountId::new("GDEST"), Asset::Native, "12.5").unwrap();
        assert!(matches!(
            op,
            Operation::Payment { amount, .. } if amount == Amount::from_stroops(125_000_000)
        ));
    }

    #[test]
    fn payment_rejects_excess_precision() {
        let err = Operation::payment(AccountId::new("GDEST"), Asset::Native, "1.00000001")
            .unwrap_err();
        assert!(matches!(
            err,
            BuildError::InvalidAmount(AmountError::TooPrecise { .. })
        ));
    }

    #[test]
    fn zero_starting_balance_rejected() {
        assert!(matches!(
            Operation::create_account(AccountId::new("GDEST"), "0"),
            Err(BuildError::InvalidAmount(_))
        ));
    }

    #[test]
    fn signer_weights_expand_per_signer() {
        let op = Operation::SetSignerWeights {
            signers: vec![
                SignerWeight { key: AccountId::new("GA"), weight: 1 },
                SignerWeight { key: AccountId::new("GB"), weight: 2 },
            ],
            master_weight: Some(0),
            thresholds: Thresholds { low: 1, medium: 1, high: 2 },
        };
        assert_eq!(op.wire_count(), 2);

        let only_thresholds = Operation::SetSignerWeights {
            signers: Vec::new(),
            master_weight: None,
            thresholds: Thresholds::default(),
        };
        assert_eq!(only_thresholds.wire_count(), 1);
    }
}
