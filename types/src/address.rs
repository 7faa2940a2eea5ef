//! Ledger account id type (`G…` strkey).

use serde::{Deserialize, Serialize};
use std::fmt;

/// A ledger account id: the 56-character strkey encoding of an ed25519 public key.
///
/// Construct checked values through `anchor_crypto::parse_account_id` or
/// `anchor_crypto::account_id`; this type only carries the string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Every account id starts with this character.
    pub const PREFIX: char = 'G';

    /// Length of an encoded account id.
    pub const LEN: usize = 56;

    /// Wrap an already-encoded account id.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Return the raw strkey string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Cheap shape check (prefix and length). Checksums are verified by `anchor_crypto`.
    pub fn is_well_formed(&self) -> bool {
        self.0.len() == Self::LEN && self.0.starts_with(Self::PREFIX)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for AccountId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}
