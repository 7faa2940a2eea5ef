//! Moving the custom asset between custodial accounts.
//!
//! Custody is a shared operational signer: every custodial account carries the
//! payment signer at medium weight, so no user seed is decrypted to pay. The
//! issuer signs credits itself. A debit is a payment back to the issuer, which
//! burns the asset.

use anchor_crypto::account_id;
use anchor_custody::SignerRole;
use anchor_ledger_client::SettlementResult;
use anchor_store::AccountRecord;
use anchor_transactions::Operation;
use anchor_types::{AccountId, Amount};

use crate::deadline::Deadline;
use crate::execute::{execute, Submission};
use crate::services::Services;
use crate::WorkflowError;

pub struct Payments {
    services: Services,
}

impl Payments {
    pub fn new(services: Services) -> Self {
        Self { services }
    }

    /// Pay `amount` of the custom asset from `sender` to `recipient`.
    pub async fn transfer(
        &self,
        amount: &str,
        sender: &str,
        recipient: &str,
        deadline: Deadline,
    ) -> Result<SettlementResult, WorkflowError> {
        let amount = Amount::parse_positive(amount)?;
        let records = self.resolve(&[sender, recipient])?;
        let (from, to) = (&records[0].account_id, &records[1].account_id);
        tracing::debug!(sender, recipient, %amount, "transfer requested");
        self.pay(
            "transfer",
            SignerRole::PaymentSigner,
            from,
            to,
            amount,
            deadline,
        )
        .await
    }

    /// Issue `amount` of the custom asset to `account`.
    pub async fn credit(
        &self,
        amount: &str,
        account: &str,
        deadline: Deadline,
    ) -> Result<SettlementResult, WorkflowError> {
        let amount = Amount::parse_positive(amount)?;
        let records = self.resolve(&[account])?;
        let issuer = self.issuer()?;
        tracing::debug!(account, %amount, "credit requested");
        self.pay(
            "credit",
            SignerRole::Issuer,
            &issuer,
            &records[0].account_id,
            amount,
            deadline,
        )
        .await
    }

    /// Burn `amount` of the custom asset held by `account`.
    pub async fn debit(
        &self,
        amount: &str,
        account: &str,
        deadline: Deadline,
    ) -> Result<SettlementResult, WorkflowError> {
        let amount = Amount::parse_positive(amount)?;
        let records = self.resolve(&[account])?;
        let issuer = self.issuer()?;
        tracing::debug!(account, %amount, "debit requested");
        self.pay(
            "debit",
            SignerRole::PaymentSigner,
            &records[0].account_id,
            &issuer,
            amount,
            deadline,
        )
        .await
    }

    /// Records for `usernames` in the order given, in one store lookup.
    fn resolve(&self, usernames: &[&str]) -> Result<Vec<AccountRecord>, WorkflowError> {
        let found = self.services.store.find_many_by_references(usernames)?;
        usernames
            .iter()
            .map(|name| {
                found
                    .iter()
                    .find(|r| r.username == *name)
                    .cloned()
                    .ok_or_else(|| WorkflowError::AccountNotFound(name.to_string()))
            })
            .collect()
    }

    fn issuer(&self) -> Result<AccountId, WorkflowError> {
        self.services
            .settings
            .asset
            .issuer()
            .cloned()
            .ok_or_else(|| WorkflowError::Config("configured asset has no issuer".into()))
    }

    async fn pay(
        &self,
        label: &'static str,
        role: SignerRole,
        source: &AccountId,
        destination: &AccountId,
        amount: Amount,
        deadline: Deadline,
    ) -> Result<SettlementResult, WorkflowError> {
        let signer = self.services.signers.resolve(role)?;
        tracing::debug!(op = label, role = %role, signer = %account_id(&signer.public), "signer resolved");

        let op = Operation::Payment {
            destination: destination.clone(),
            asset: self.services.settings.asset.clone(),
            amount,
        };
        execute(
            &self.services,
            Submission {
                label,
                source,
                operations: vec![op],
                signers: &[&signer],
                deadline,
                rebuild_on_bad_sequence: self.services.settings.rebuild_on_bad_sequence,
            },
        )
        .await
    }
}
