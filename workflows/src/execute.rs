//! Load, build, sign, submit: the path every ledger write takes.

use anchor_ledger_client::SettlementResult;
use anchor_transactions::{build, Operation};
use anchor_types::{AccountId, KeyPair};

use crate::deadline::Deadline;
use crate::services::Services;
use crate::WorkflowError;

/// One transaction against `source`, signed by `signers`.
pub(crate) struct Submission<'a> {
    /// Short name for logs, e.g. "transfer" or "change_trust".
    pub label: &'static str,
    pub source: &'a AccountId,
    pub operations: Vec<Operation>,
    pub signers: &'a [&'a KeyPair],
    pub deadline: Deadline,
    /// Rebuild once against fresh state if the sequence number was stale.
    pub rebuild_on_bad_sequence: bool,
}

pub(crate) async fn execute(
    services: &Services,
    submission: Submission<'_>,
) -> Result<SettlementResult, WorkflowError> {
    let Submission {
        label,
        source,
        operations,
        signers,
        deadline,
        rebuild_on_bad_sequence,
    } = submission;
    let network = services.ledger.network();
    let mut retried = false;

    loop {
        let state = deadline
            .bound_read(async {
                services
                    .ledger
                    .load_account(source)
                    .await
                    .map_err(WorkflowError::from)
            })
            .await?;
        tracing::debug!(op = label, source = %source, sequence = state.sequence, "loaded source account");

        let mut envelope = build(&state, operations.clone(), services.settings.memo.clone())?;
        for keypair in signers {
            envelope.sign(keypair, network);
        }
        deadline.check()?;

        let result = deadline
            .bound_submit(async {
                services
                    .ledger
                    .submit(&envelope)
                    .await
                    .map_err(WorkflowError::from)
            })
            .await;

        match result {
            Ok(settled) => {
                tracing::info!(
                    op = label,
                    source = %source,
                    sequence = envelope.sequence(),
                    hash = %settled.hash,
                    ledger = settled.ledger,
                    "transaction applied"
                );
                return Ok(settled);
            }
            Err(e) if e.is_bad_sequence() && rebuild_on_bad_sequence && !retried => {
                tracing::warn!(
                    op = label,
                    source = %source,
                    sequence = envelope.sequence(),
                    "sequence number was stale; rebuilding once"
                );
                retried = true;
            }
            Err(e) => {
                tracing::warn!(
                    op = label,
                    source = %source,
                    sequence = envelope.sequence(),
                    error = %e,
                    "transaction failed"
                );
                return Err(e);
            }
        }
    }
}
