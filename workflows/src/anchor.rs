//! The surface handed to the request-handling layer.

use std::time::Duration;

use anchor_ledger_client::SettlementResult;
use anchor_store::AccountRecord;

use crate::deadline::Deadline;
use crate::payments::Payments;
use crate::provisioning::{ProvisioningReport, Provisioner};
use crate::services::Services;
use crate::WorkflowError;

pub struct Anchor {
    provisioner: Provisioner,
    payments: Payments,
    request_timeout: Option<Duration>,
}

impl Anchor {
    pub fn new(services: Services) -> Self {
        Self {
            provisioner: Provisioner::new(services.clone()),
            payments: Payments::new(services),
            request_timeout: None,
        }
    }

    /// Bound every request by `timeout` from the moment it starts.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    fn deadline(&self) -> Deadline {
        self.request_timeout
            .map(Deadline::after)
            .unwrap_or_default()
    }

    /// Register `username`. A ledger failure while creating the account is
    /// logged and does not fail the signup; key faults and later provisioning
    /// failures do.
    pub async fn signup(&self, username: &str) -> Result<AccountRecord, WorkflowError> {
        let report = self.provision(username).await?;
        Ok(report.record)
    }

    /// Like [`Anchor::signup`], with the full provisioning report.
    pub async fn provision(&self, username: &str) -> Result<ProvisioningReport, WorkflowError> {
        self.provisioner.provision(username, self.deadline()).await
    }

    pub async fn resume(&self, username: &str) -> Result<ProvisioningReport, WorkflowError> {
        self.provisioner.resume(username, self.deadline()).await
    }

    /// `memo` is recorded in the log; envelopes always carry the configured memo.
    pub async fn transfer(
        &self,
        amount: &str,
        sender: &str,
        recipient: &str,
        memo: Option<&str>,
    ) -> Result<SettlementResult, WorkflowError> {
        if let Some(memo) = memo {
            tracing::info!(sender, recipient, memo, "transfer memo");
        }
        self.payments
            .transfer(amount, sender, recipient, self.deadline())
            .await
    }

    pub async fn credit(&self, amount: &str, account: &str) -> Result<SettlementResult, WorkflowError> {
        self.payments.credit(amount, account, self.deadline()).await
    }

    pub async fn debit(&self, amount: &str, account: &str) -> Result<SettlementResult, WorkflowError> {
        self.payments.debit(amount, account, self.deadline()).await
    }

    pub fn payments(&self) -> &Payments {
        &self.payments
    }
}
