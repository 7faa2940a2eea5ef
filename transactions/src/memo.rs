use serde::{Deserialize, Serialize};

use crate::error::BuildError;

/// Transaction memo. Only the variants the anchor emits are modelled.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Memo {
    #[default]
    None,
    Text(String),
}

impl Memo {
    /// Longest text memo the ledger accepts, in bytes.
    pub const MAX_TEXT_LEN: usize = 28;

    pub fn text(text: impl Into<String>) -> Result<Self, BuildError> {
        let memo = Self::Text(text.into());
        memo.validate()?;
        Ok(memo)
    }

    pub(crate) fn validate(&self) -> Result<(), BuildError> {
        match self {
            Self::Text(text) if text.len() > Self::MAX_TEXT_LEN => {
                Err(BuildError::MemoTooLong(text.len()))
            }
            _ => Ok(()),
        }
    }
}
