//! Turn loaded account state plus operations into a transaction envelope.
//!
//! Everything that can be checked locally is checked here, so a bad amount,
//! account id or memo never reaches the network.

use anchor_crypto::decode_account_id;
use anchor_types::{AccountId, Amount, AmountError, Asset, PublicKey};

use crate::envelope::TransactionEnvelope;
use crate::error::BuildError;
use crate::memo::Memo;
use crate::operation::Operation;
use crate::state::LedgerAccountState;
use crate::xdr::{WireAsset, WireOperation, WireTransaction, XdrWriter};

/// Ledger limit on operations per transaction.
pub const MAX_OPERATIONS: usize = 100;

/// Build an unsigned envelope with `state.account_id` as source.
///
/// The sequence number is `state.sequence + 1` and the fee is
/// `state.base_fee` times the number of ledger operations.
pub fn build(
    state: &LedgerAccountState,
    operations: Vec<Operation>,
    memo: Memo,
) -> Result<TransactionEnvelope, BuildError> {
    if operations.is_empty() {
        return Err(BuildError::NoOperations);
    }
    memo.validate()?;
    let source = decode(&state.account_id, "source")?;

    let mut wire = Vec::new();
    for op in &operations {
        expand(state, op, &mut wire)?;
    }
    if wire.len() > MAX_OPERATIONS {
        return Err(BuildError::TooManyOperations(wire.len()));
    }

    let fee = state
        .base_fee
        .checked_mul(wire.len() as u32)
        .ok_or(BuildError::FeeOverflow)?;
    let sequence = state
        .sequence
        .checked_add(1)
        .ok_or(BuildError::SequenceOverflow)?;

    let mut w = XdrWriter::new();
    w.transaction(&WireTransaction {
        source: &source,
        fee,
        sequence,
        memo: &memo,
        operations: &wire,
    });

    Ok(TransactionEnvelope {
        source: state.account_id.clone(),
        fee,
        sequence,
        memo,
        operations,
        tx_xdr: w.into_bytes(),
        signatures: Vec::new(),
    })
}

fn expand(
    state: &LedgerAccountState,
    op: &Operation,
    out: &mut Vec<WireOperation>,
) -> Result<(), BuildError> {
    match op {
        Operation::CreateAccount {
            destination,
            starting_balance,
        } => out.push(WireOperation::CreateAccount {
            destination: decode(destination, "destination")?,
            starting_balance: positive(*starting_balance)?,
        }),
        Operation::Payment {
            destination,
            asset,
            amount,
        } => out.push(WireOperation::Payment {
            destination: decode(destination, "destination")?,
            asset: wire_asset(asset)?,
            amount: positive(*amount)?,
        }),
        Operation::ChangeTrust { asset } => {
            if asset.is_native() {
                return Err(BuildError::NativeAssetNotAllowed("change_trust"));
            }
            out.push(WireOperation::ChangeTrust {
                asset: wire_asset(asset)?,
                limit: Amount::MAX.stroops(),
            });
        }
        Operation::AllowTrust {
            trustor,
            asset,
            authorize,
        } => {
            let Asset::Credit { code, issuer } = asset else {
                return Err(BuildError::NativeAssetNotAllowed("allow_trust"));
            };
            if issuer != &state.account_id {
                return Err(BuildError::NotIssuer {
                    issuer: issuer.to_string(),
                });
            }
            out.push(WireOperation::AllowTrust {
                trustor: decode(trustor, "trustor")?,
                code: code.clone(),
                authorize: *authorize,
            });
        }
        Operation::SetSignerWeights {
            signers,
            master_weight,
            thresholds,
        } => {
            for i in 0..op.wire_count() {
                let signer = match signers.get(i) {
                    Some(s) => Some((decode(&s.key, "signer")?, u32::from(s.weight))),
                    None => None,
                };
                let head = i == 0;
                out.push(WireOperation::SetOptions {
                    master_weight: master_weight.filter(|_| head).map(u32::from),
                    low: head.then_some(thresholds.low.into()),
                    medium: head.then_some(thresholds.medium.into()),
                    high: head.then_some(thresholds.high.into()),
                    signer,
                });
            }
        }
    }
    Ok(())
}

fn decode(id: &AccountId, field: &'static str) -> Result<PublicKey, BuildError> {
    decode_account_id(id.as_str()).map_err(|e| BuildError::InvalidAccount {
        field,
        reason: e.to_string(),
    })
}

fn wire_asset(asset: &Asset) -> Result<WireAsset, BuildError> {
    match asset {
        Asset::Native => Ok(WireAsset::Native),
        Asset::Credit { code, issuer } => Ok(WireAsset::Credit {
            code: code.clone(),
            issuer: decode(issuer, "issuer")?,
        }),
    }
}

fn positive(amount: Amount) -> Result<i64, BuildError> {
    if !amount.is_positive() {
        return Err(AmountError::NotPositive(amount.to_string()).into());
    }
    Ok(amount.stroops())
}
