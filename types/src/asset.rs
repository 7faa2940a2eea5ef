//! Ledger assets: the native currency or an issued (code, issuer) pair.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::address::AccountId;
use crate::error::AssetError;

/// An asset code of 1–12 ASCII alphanumeric characters.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssetCode(String);

impl AssetCode {
    pub const MAX_LEN: usize = 12;

    pub fn new(code: impl Into<String>) -> Result<Self, AssetError> {
        let code = code.into();
        if code.is_empty() || code.len() > Self::MAX_LEN {
            return Err(AssetError::InvalidCodeLength(code.len()));
        }
        if !code.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(AssetError::InvalidCodeCharacters(code));
        }
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Codes of up to four characters use the short wire encoding.
    pub fn is_alphanum4(&self) -> bool {
        self.0.len() <= 4
    }
}

impl TryFrom<String> for AssetCode {
    type Error = AssetError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AssetCode> for String {
    fn from(code: AssetCode) -> Self {
        code.0
    }
}

impl fmt::Display for AssetCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An asset type on the ledger.
///
/// Custodial balances are held in a single configured `Credit` asset; `Native`
/// only appears for account creation (the starting balance).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Asset {
    Native,
    Credit { code: AssetCode, issuer: AccountId },
}

impl Asset {
    pub fn credit(code: &str, issuer: AccountId) -> Result<Self, AssetError> {
        Ok(Self::Credit {
            code: AssetCode::new(code)?,
            issuer,
        })
    }

    pub fn is_native(&self) -> bool {
        matches!(self, Self::Native)
    }

    pub fn code(&self) -> Option<&AssetCode> {
        match self {
            Self::Native => None,
            Self::Credit { code, .. } => Some(code),
        }
    }

    pub fn issuer(&self) -> Option<&AccountId> {
        match self {
            Self::Native => None,
            Self::Credit { issuer, .. } => Some(issuer),
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native => f.write_str("native"),
            Self::Credit { code, issuer } => write!(f, "{code}:{issuer}"),
        }
    }
}
