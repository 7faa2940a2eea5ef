//! Onboarding a username onto the ledger.
//!
//! Provisioning runs as a linear state machine:
//!
//! ```text
//! Requested → LedgerAccountCreated → TrustlineEstablished → TrustAuthorized
//!           → SignersConfigured → Funded → Complete
//! ```
//!
//! The account record is persisted before anything touches the ledger, so a
//! registration never depends on ledger availability. If creating the ledger
//! account fails, the record stays and [`Provisioner::resume`] can finish the
//! job later. Failures in any later step abort the run and report how far it
//! got. Every step checks current ledger state first and skips itself if it is
//! already done, so `resume` is safe to run any number of times. The caller's
//! [`Deadline`] bounds every load and submission of a run.

use std::fmt;

use anchor_crypto::account_id;
use anchor_custody::{new_account_keypair, seal_keypair, unseal_keypair, CryptoError, SignerRole};
use anchor_store::{AccountRecord, StoreError};
use anchor_transactions::{LedgerAccountState, Operation, SignerWeight};
use anchor_types::{AccountId, KeyPair};
use serde::{Deserialize, Serialize};

use crate::deadline::Deadline;
use crate::execute::{execute, Submission};
use crate::services::Services;
use crate::WorkflowError;

const MAX_USERNAME_LEN: usize = 128;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvisioningState {
    Requested,
    LedgerAccountCreated,
    TrustlineEstablished,
    TrustAuthorized,
    SignersConfigured,
    Funded,
    Complete,
    Aborted,
}

impl ProvisioningState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Requested => "requested",
            Self::LedgerAccountCreated => "ledger_account_created",
            Self::TrustlineEstablished => "trustline_established",
            Self::TrustAuthorized => "trust_authorized",
            Self::SignersConfigured => "signers_configured",
            Self::Funded => "funded",
            Self::Complete => "complete",
            Self::Aborted => "aborted",
        }
    }

    /// The state after a successful step; `None` for terminal states.
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Requested => Some(Self::LedgerAccountCreated),
            Self::LedgerAccountCreated => Some(Self::TrustlineEstablished),
            Self::TrustlineEstablished => Some(Self::TrustAuthorized),
            Self::TrustAuthorized => Some(Self::SignersConfigured),
            Self::SignersConfigured => Some(Self::Funded),
            Self::Funded => Some(Self::Complete),
            Self::Complete | Self::Aborted => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.next().is_none()
    }
}

impl fmt::Display for ProvisioningState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a provisioning run that did not abort past account creation.
#[derive(Debug)]
pub struct ProvisioningReport {
    pub record: AccountRecord,
    /// Furthest state reached. For an already registered username the ledger
    /// is not consulted and this stays `Requested`.
    pub reached: ProvisioningState,
    /// The username was already registered; nothing was done.
    pub existing: bool,
    /// Set when creating the ledger account failed. The record is persisted
    /// regardless and the run can be resumed.
    pub ledger_failure: Option<WorkflowError>,
}

impl ProvisioningReport {
    pub fn state(&self) -> ProvisioningState {
        if self.ledger_failure.is_some() {
            ProvisioningState::Aborted
        } else {
            self.reached
        }
    }
}

pub struct Provisioner {
    services: Services,
}

impl Provisioner {
    pub fn new(services: Services) -> Self {
        Self { services }
    }

    /// Register `username` and provision its ledger account.
    ///
    /// Returns the existing record untouched if the username is taken. A ledger
    /// failure while creating the account is reported, not returned; key and
    /// configuration faults are returned with the record left in place.
    pub async fn provision(
        &self,
        username: &str,
        deadline: Deadline,
    ) -> Result<ProvisioningReport, WorkflowError> {
        validate_username(username)?;
        let store = &self.services.store;

        if let Some(record) = store.find_by_reference(username)? {
            tracing::info!(username, account = %record.account_id, "username already registered");
            return Ok(existing(record));
        }

        let keypair = new_account_keypair();
        let record = AccountRecord {
            username: username.to_string(),
            account_id: account_id(&keypair.public),
            sealed_seed: seal_keypair(&keypair, &self.services.key)?,
        };
        match store.create(&record) {
            Ok(()) => {}
            Err(StoreError::Duplicate(_)) => {
                // A concurrent signup for the same name won.
                let record = store
                    .find_by_reference(username)?
                    .ok_or_else(|| StoreError::NotFound(username.to_string()))?;
                return Ok(existing(record));
            }
            Err(e) => return Err(e.into()),
        }
        tracing::info!(username, account = %record.account_id, "account registered");

        let mut run = Run::new(&self.services, record, Some(keypair), deadline);
        match run.ensure_created().await {
            Ok(()) => {}
            Err(e) if e.is_ledger_failure() => {
                tracing::warn!(
                    username,
                    account = %run.record.account_id,
                    error = %e,
                    "ledger account creation failed; record kept for resume"
                );
                return Ok(ProvisioningReport {
                    record: run.record,
                    reached: ProvisioningState::Requested,
                    existing: false,
                    ledger_failure: Some(e),
                });
            }
            Err(e) => return Err(run.abort(e)),
        }
        let reached = run.finish().await?;
        Ok(ProvisioningReport {
            record: run.record,
            reached,
            existing: false,
            ledger_failure: None,
        })
    }

    /// Drive a registered account to `Complete` from whatever state the
    /// ledger shows.
    pub async fn resume(
        &self,
        username: &str,
        deadline: Deadline,
    ) -> Result<ProvisioningReport, WorkflowError> {
        validate_username(username)?;
        let record = self
            .services
            .store
            .find_by_reference(username)?
            .ok_or_else(|| WorkflowError::AccountNotFound(username.to_string()))?;
        tracing::info!(username, account = %record.account_id, "resuming provisioning");

        let mut run = Run::new(&self.services, record, None, deadline);
        if let Err(e) = run.ensure_created().await {
            return Err(run.abort(e));
        }
        let reached = run.finish().await?;
        Ok(ProvisioningReport {
            record: run.record,
            reached,
            existing: false,
            ledger_failure: None,
        })
    }
}

fn existing(record: AccountRecord) -> ProvisioningReport {
    ProvisioningReport {
        record,
        reached: ProvisioningState::Requested,
        existing: true,
        ledger_failure: None,
    }
}

fn validate_username(username: &str) -> Result<(), WorkflowError> {
    let valid = !username.is_empty()
        && username.len() <= MAX_USERNAME_LEN
        && !username.chars().any(|c| c.is_whitespace() || c.is_control());
    if !valid {
        return Err(WorkflowError::InvalidUsername(username.to_string()));
    }
    Ok(())
}

/// One pass over the provisioning steps for a single account.
struct Run<'a> {
    services: &'a Services,
    record: AccountRecord,
    /// The account's own key, unsealed on first use when resuming.
    account_key: Option<KeyPair>,
    deadline: Deadline,
    reached: ProvisioningState,
}

impl<'a> Run<'a> {
    fn new(
        services: &'a Services,
        record: AccountRecord,
        account_key: Option<KeyPair>,
        deadline: Deadline,
    ) -> Self {
        Self {
            services,
            record,
            account_key,
            deadline,
            reached: ProvisioningState::Requested,
        }
    }

    fn advance(&mut self) {
        if let Some(next) = self.reached.next() {
            tracing::debug!(
                username = %self.record.username,
                from = %self.reached,
                to = %next,
                "provisioning step done"
            );
            self.reached = next;
        }
    }

    fn abort(&self, source: WorkflowError) -> WorkflowError {
        tracing::warn!(
            username = %self.record.username,
            reached = %self.reached,
            error = %source,
            "provisioning aborted"
        );
        WorkflowError::ProvisioningAborted {
            username: self.record.username.clone(),
            reached: self.reached,
            source: Box::new(source),
        }
    }

    /// Steps 2 through 6.
    async fn finish(&mut self) -> Result<ProvisioningState, WorkflowError> {
        if let Err(e) = self.remaining_steps().await {
            return Err(self.abort(e));
        }
        tracing::info!(
            username = %self.record.username,
            account = %self.record.account_id,
            "provisioning complete"
        );
        Ok(self.reached)
    }

    async fn remaining_steps(&mut self) -> Result<(), WorkflowError> {
        self.ensure_trustline().await?;
        self.ensure_authorized().await?;
        self.ensure_signers().await?;
        self.ensure_funded().await?;
        self.advance();
        Ok(())
    }

    /// The account's own key, unsealing the stored seed if it is not held.
    /// The caller hands it back if a later step needs it again.
    fn take_account_key(&mut self) -> Result<KeyPair, WorkflowError> {
        if let Some(keypair) = self.account_key.take() {
            return Ok(keypair);
        }
        let keypair = unseal_keypair(&self.record.sealed_seed, &self.services.key)?;
        if account_id(&keypair.public) != self.record.account_id {
            return Err(CryptoError::InvalidSecret.into());
        }
        Ok(keypair)
    }

    async fn load(&self, id: &AccountId) -> Result<LedgerAccountState, WorkflowError> {
        self.deadline
            .bound_read(async {
                self.services
                    .ledger
                    .load_account(id)
                    .await
                    .map_err(WorkflowError::from)
            })
            .await
    }

    /// Submit one operation. Transactions from the shared provisioner and
    /// issuer accounts race with other signups and may be rebuilt once on a
    /// stale sequence; an account's own transactions never are.
    async fn submit(
        &self,
        label: &'static str,
        source: &AccountId,
        operation: Operation,
        signer: &KeyPair,
        shared_source: bool,
    ) -> Result<(), WorkflowError> {
        execute(
            self.services,
            Submission {
                label,
                source,
                operations: vec![operation],
                signers: &[signer],
                deadline: self.deadline,
                rebuild_on_bad_sequence: shared_source
                    && self.services.settings.rebuild_on_bad_sequence,
            },
        )
        .await
        .map(|_| ())
    }

    async fn ensure_created(&mut self) -> Result<(), WorkflowError> {
        let services = self.services;
        let id = &self.record.account_id;
        let exists = self
            .deadline
            .bound_read(async {
                services
                    .ledger
                    .try_load_account(id)
                    .await
                    .map_err(WorkflowError::from)
            })
            .await?
            .is_some();
        if exists {
            tracing::debug!(account = %id, "ledger account exists");
        } else {
            let provisioner = services.signers.resolve(SignerRole::Provisioner)?;
            let op = Operation::CreateAccount {
                destination: id.clone(),
                starting_balance: services.settings.starting_balance,
            };
            self.submit(
                "create_account",
                &account_id(&provisioner.public),
                op,
                &provisioner,
                true,
            )
            .await?;
        }
        self.advance();
        Ok(())
    }

    async fn ensure_trustline(&mut self) -> Result<(), WorkflowError> {
        let services = self.services;
        let asset = &services.settings.asset;
        let id = self.record.account_id.clone();
        let state = self.load(&id).await?;
        if state.has_trustline(asset) {
            tracing::debug!(account = %id, "trustline exists");
        } else {
            let op = Operation::ChangeTrust {
                asset: asset.clone(),
            };
            let key = self.take_account_key()?;
            self.submit("change_trust", &id, op, &key, false).await?;
            self.account_key = Some(key);
        }
        self.advance();
        Ok(())
    }

    async fn ensure_authorized(&mut self) -> Result<(), WorkflowError> {
        let services = self.services;
        let asset = &services.settings.asset;
        let id = &self.record.account_id;
        let state = self.load(id).await?;
        if state.is_authorized(asset) {
            tracing::debug!(account = %id, "trustline already authorized");
        } else {
            let issuer = services.signers.resolve(SignerRole::Issuer)?;
            let op = Operation::AllowTrust {
                trustor: id.clone(),
                asset: asset.clone(),
                authorize: true,
            };
            self.submit("allow_trust", &account_id(&issuer.public), op, &issuer, true)
                .await?;
        }
        self.advance();
        Ok(())
    }

    async fn ensure_signers(&mut self) -> Result<(), WorkflowError> {
        let services = self.services;
        let settings = &services.settings;
        let id = self.record.account_id.clone();
        let payment = services.signers.account_id(SignerRole::PaymentSigner)?;
        let admin = services.signers.account_id(SignerRole::AdminSigner)?;

        let state = self.load(&id).await?;
        if state.master_weight == 0 && state.signer_weight(&payment) > 0 {
            tracing::debug!(account = %id, "operational signers already configured");
        } else {
            let op = Operation::SetSignerWeights {
                signers: vec![
                    SignerWeight {
                        key: payment,
                        weight: settings.payment_signer_weight,
                    },
                    SignerWeight {
                        key: admin,
                        weight: settings.admin_signer_weight,
                    },
                ],
                master_weight: Some(0),
                thresholds: settings.thresholds,
            };
            let key = self.take_account_key()?;
            self.submit("set_signer_weights", &id, op, &key, false).await?;
        }
        // The master key carries no weight from here on.
        self.account_key = None;
        self.advance();
        Ok(())
    }

    async fn ensure_funded(&mut self) -> Result<(), WorkflowError> {
        let services = self.services;
        let settings = &services.settings;
        let id = &self.record.account_id;
        let state = self.load(id).await?;
        let funded = state
            .balance_of(&settings.asset)
            .is_some_and(|b| b.balance.is_positive());
        if funded {
            tracing::debug!(account = %id, "account already funded");
        } else {
            let signer = services.signers.resolve(SignerRole::PaymentSigner)?;
            let issuer = services.signers.account_id(SignerRole::Issuer)?;
            let op = Operation::Payment {
                destination: id.clone(),
                asset: settings.asset.clone(),
                amount: settings.seed_amount,
            };
            self.submit("seed_payment", &issuer, op, &signer, true).await?;
        }
        self.advance();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn states_advance_in_order() {
        let mut state = ProvisioningState::Requested;
        let mut seen = vec![state];
        while let Some(next) = state.next() {
            seen.push(next);
            state = next;
        }
        assert_eq!(
            seen,
            vec![
                ProvisioningState::Requested,
                ProvisioningState::LedgerAccountCreated,
                ProvisioningState::TrustlineEstablished,
                ProvisioningState::TrustAuthorized,
                ProvisioningState::SignersConfigured,
                ProvisioningState::Funded,
                ProvisioningState::Complete,
            ]
        );
        assert!(ProvisioningState::Aborted.is_terminal());
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn display_is_snake_case() {
        assert_eq!(ProvisioningState::TrustAuthorized.to_string(), "trust_authorized");
        assert_eq!(
            ProvisioningState::LedgerAccountCreated.to_string(),
            "ledger_account_created"
        );
    }

    #[test]
    fn username_rules() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("alice@example.com").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("al ice").is_err());
        assert!(validate_username("bob\n").is_err());
        assert!(validate_username(&"x".repeat(MAX_USERNAME_LEN + 1)).is_err());
    }

    #[test]
    fn report_with_ledger_failure_is_aborted() {
        let report = ProvisioningReport {
            record: AccountRecord {
                username: "alice".into(),
                account_id: anchor_types::AccountId::new("GALICE"),
                sealed_seed: "v1$x".into(),
            },
            reached: ProvisioningState::Requested,
            existing: false,
            ledger_failure: Some(WorkflowError::Network {
                message: "down".into(),
                ambiguous: false,
            }),
        };
        assert_eq!(report.state(), ProvisioningState::Aborted);
    }
}
