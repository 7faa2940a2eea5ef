use anchor_transactions::{LedgerAccountState, TransactionEnvelope};
use anchor_types::{AccountId, NetworkId, TxHash};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// A transaction the ledger has applied.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementResult {
    pub hash: TxHash,
    /// Ledger sequence in which the transaction closed.
    pub ledger: u32,
}

/// Read account state and submit transactions.
///
/// Implementations never cache account state; every `load_account` reflects
/// the ledger at the time of the call.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// The network whose passphrase envelopes must be signed for.
    fn network(&self) -> NetworkId;

    async fn load_account(&self, account: &AccountId) -> Result<LedgerAccountState, LedgerError>;

    async fn submit(&self, envelope: &TransactionEnvelope)
        -> Result<SettlementResult, LedgerError>;

    /// `Ok(None)` when the account does not exist yet.
    async fn try_load_account(
        &self,
        account: &AccountId,
    ) -> Result<Option<LedgerAccountState>, LedgerError> {
        match self.load_account(account).await {
            Ok(state) => Ok(Some(state)),
            Err(LedgerError::AccountNotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
