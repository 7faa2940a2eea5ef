//! Remote account state, as read from the ledger right before building.

use anchor_types::{AccountId, Amount, Asset};
use serde::{Deserialize, Serialize};

/// Authorization thresholds of an account.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    pub low: u8,
    pub medium: u8,
    pub high: u8,
}

/// An additional (non-master) signer on an account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSigner {
    pub key: AccountId,
    pub weight: u8,
}

/// A balance line: native currency or a trustline to an issued asset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub asset: Asset,
    pub balance: Amount,
    /// Whether the issuer has authorized this trustline. Always true for native.
    pub authorized: bool,
}

/// Mutable ledger-side state of an account.
///
/// Never cached: a stale `sequence` makes the resulting envelope invalid, so
/// callers load this immediately before every build.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerAccountState {
    pub account_id: AccountId,
    /// Sequence number of the last transaction applied for this account.
    pub sequence: i64,
    /// Per-operation fee in stroops currently charged by the network.
    pub base_fee: u32,
    pub thresholds: Thresholds,
    pub master_weight: u8,
    pub signers: Vec<AccountSigner>,
    pub balances: Vec<Balance>,
}

impl LedgerAccountState {
    /// The trustline (or native balance) for an asset, if the account holds one.
    pub fn balance_of(&self, asset: &Asset) -> Option<&Balance> {
        self.balances.iter().find(|b| &b.asset == asset)
    }

    pub fn has_trustline(&self, asset: &Asset) -> bool {
        !asset.is_native() && self.balance_of(asset).is_some()
    }

    pub fn is_authorized(&self, asset: &Asset) -> bool {
        self.balance_of(asset).is_some_and(|b| b.authorized)
    }

    /// Weight a key carries on this account, counting the master key.
    pub fn signer_weight(&self, key: &AccountId) -> u8 {
        if key == &self.account_id {
            return self.master_weight;
        }
        self.signers
            .iter()
            .find(|s| &s.key == key)
            .map(|s| s.weight)
            .unwrap_or(0)
    }
}
