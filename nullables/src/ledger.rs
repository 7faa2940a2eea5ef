//! Nullable ledger: an in-memory ledger that validates and applies envelopes.
//!
//! Rules enforced on submit, in order:
//! 1. the source account exists and `sequence == current + 1`
//! 2. valid signatures carry enough weight for the strictest operation
//! 3. every operation applies, or none do
//!
//! A rejected transaction leaves the ledger untouched. Both `load_account` and
//! `submit` yield to the scheduler before touching state, so concurrent
//! workflows interleave the way they would against a remote server.

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use anchor_crypto::decode_account_id;
use anchor_ledger_client::{LedgerClient, LedgerError, RejectionReason, SettlementResult};
use anchor_transactions::{
    AccountSigner, Balance, LedgerAccountState, Operation, Thresholds, TransactionEnvelope,
};
use anchor_types::{AccountId, Amount, Asset, NetworkId, TxHash};
use async_trait::async_trait;

const DEFAULT_BASE_FEE: u32 = 100;

#[derive(Clone, Debug)]
struct Trustline {
    asset: Asset,
    balance: Amount,
    authorized: bool,
}

#[derive(Clone, Debug)]
struct NullAccount {
    sequence: i64,
    master_weight: u8,
    thresholds: Thresholds,
    signers: BTreeMap<AccountId, u8>,
    native: Amount,
    trustlines: Vec<Trustline>,
}

impl NullAccount {
    fn new(sequence: i64, native: Amount) -> Self {
        Self {
            sequence,
            master_weight: 1,
            thresholds: Thresholds::default(),
            signers: BTreeMap::new(),
            native,
            trustlines: Vec::new(),
        }
    }

    fn trustline_mut(&mut self, asset: &Asset) -> Option<&mut Trustline> {
        self.trustlines.iter_mut().find(|t| &t.asset == asset)
    }

    fn snapshot(&self, id: &AccountId, base_fee: u32) -> LedgerAccountState {
        let mut balances = vec![Balance {
            asset: Asset::Native,
            balance: self.native,
            authorized: true,
        }];
        balances.extend(self.trustlines.iter().map(|t| Balance {
            asset: t.asset.clone(),
            balance: t.balance,
            authorized: t.authorized,
        }));
        LedgerAccountState {
            account_id: id.clone(),
            sequence: self.sequence,
            base_fee,
            thresholds: self.thresholds,
            master_weight: self.master_weight,
            signers: self
                .signers
                .iter()
                .map(|(key, weight)| AccountSigner {
                    key: key.clone(),
                    weight: *weight,
                })
                .collect(),
            balances,
        }
    }
}

#[derive(Default)]
struct LedgerState {
    accounts: BTreeMap<AccountId, NullAccount>,
    ledger: u32,
    applied: Vec<TxHash>,
}

impl LedgerState {
    fn starting_sequence(&self) -> i64 {
        i64::from(self.ledger) << 32
    }
}

enum InjectedFailure {
    /// Fail without applying.
    Before(LedgerError),
    /// Apply, then report the error (a lost response).
    After(LedgerError),
}

/// An in-memory ledger for testing.
/// Thread-safe for use with tokio's multi-threaded runtime.
pub struct NullLedger {
    network: NetworkId,
    base_fee: u32,
    state: Mutex<LedgerState>,
    injected: Mutex<VecDeque<InjectedFailure>>,
    rejected_ops: Mutex<Vec<(&'static str, RejectionReason)>>,
    submit_latency: Mutex<Duration>,
    load_calls: AtomicUsize,
    submit_calls: AtomicUsize,
}

impl NullLedger {
    pub fn new(network: NetworkId) -> Self {
        Self {
            network,
            base_fee: DEFAULT_BASE_FEE,
            state: Mutex::new(LedgerState {
                ledger: 1,
                ..LedgerState::default()
            }),
            injected: Mutex::new(VecDeque::new()),
            rejected_ops: Mutex::new(Vec::new()),
            submit_latency: Mutex::new(Duration::ZERO),
            load_calls: AtomicUsize::new(0),
            submit_calls: AtomicUsize::new(0),
        }
    }

    // ── Setup ────────────────────────────────────────────────────────────

    /// Create an account directly, outside any transaction.
    pub fn create_account(&self, id: &AccountId, native: Amount) {
        let mut state = self.state.lock().unwrap();
        let sequence = state.starting_sequence();
        state
            .accounts
            .insert(id.clone(), NullAccount::new(sequence, native));
    }

    pub fn add_signer(&self, account: &AccountId, signer: &AccountId, weight: u8) {
        self.with_account(account, |a| {
            a.signers.insert(signer.clone(), weight);
        });
    }

    pub fn set_thresholds(&self, account: &AccountId, thresholds: Thresholds) {
        self.with_account(account, |a| a.thresholds = thresholds);
    }

    pub fn set_master_weight(&self, account: &AccountId, weight: u8) {
        self.with_account(account, |a| a.master_weight = weight);
    }

    /// Open (or overwrite) a trustline with a balance, outside any transaction.
    pub fn set_trustline(
        &self,
        account: &AccountId,
        asset: &Asset,
        balance: Amount,
        authorized: bool,
    ) {
        self.with_account(account, |a| {
            a.trustlines.retain(|t| &t.asset != asset);
            a.trustlines.push(Trustline {
                asset: asset.clone(),
                balance,
                authorized,
            });
        });
    }

    /// Consume one sequence number of `account`, as if another process had
    /// just submitted a transaction for it.
    pub fn simulate_competing_submission(&self, account: &AccountId) {
        self.with_account(account, |a| a.sequence += 1);
    }

    // ── Failure injection ────────────────────────────────────────────────

    /// The next submit fails with `error` and applies nothing.
    pub fn fail_next_submit(&self, error: LedgerError) {
        self.injected
            .lock()
            .unwrap()
            .push_back(InjectedFailure::Before(error));
    }

    /// The next submit applies, then reports `error` to the caller.
    pub fn fail_next_submit_after_apply(&self, error: LedgerError) {
        self.injected
            .lock()
            .unwrap()
            .push_back(InjectedFailure::After(error));
    }

    /// Reject every transaction containing an operation with this name.
    pub fn reject_operation(&self, op_name: &'static str, reason: RejectionReason) {
        self.rejected_ops.lock().unwrap().push((op_name, reason));
    }

    /// Stop rejecting operations registered with [`NullLedger::reject_operation`].
    pub fn clear_rejections(&self) {
        self.rejected_ops.lock().unwrap().clear();
    }

    /// Hold every submission for `latency` before it reaches the ledger.
    pub fn set_submit_latency(&self, latency: Duration) {
        *self.submit_latency.lock().unwrap() = latency;
    }

    // ── Inspection ───────────────────────────────────────────────────────

    pub fn account(&self, id: &AccountId) -> Option<LedgerAccountState> {
        let state = self.state.lock().unwrap();
        state.accounts.get(id).map(|a| a.snapshot(id, self.base_fee))
    }

    pub fn exists(&self, id: &AccountId) -> bool {
        self.state.lock().unwrap().accounts.contains_key(id)
    }

    /// Balance of `asset` held by `id`; `None` without account or trustline.
    pub fn balance(&self, id: &AccountId, asset: &Asset) -> Option<Amount> {
        self.account(id)
            .and_then(|s| s.balance_of(asset).map(|b| b.balance))
    }

    pub fn applied(&self) -> Vec<TxHash> {
        self.state.lock().unwrap().applied.clone()
    }

    pub fn load_calls(&self) -> usize {
        self.load_calls.load(Ordering::SeqCst)
    }

    pub fn submit_calls(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.load_calls() + self.submit_calls()
    }

    fn with_account(&self, id: &AccountId, f: impl FnOnce(&mut NullAccount)) {
        let mut state = self.state.lock().unwrap();
        let account = state
            .accounts
            .get_mut(id)
            .unwrap_or_else(|| panic!("null ledger has no account {id}"));
        f(account);
    }

    fn apply(&self, envelope: &TransactionEnvelope) -> Result<SettlementResult, LedgerError> {
        for (name, reason) in self.rejected_ops.lock().unwrap().iter() {
            if envelope.operations().iter().any(|op| op.name() == *name) {
                return Err(LedgerError::rejected(reason.clone()));
            }
        }

        let mut state = self.state.lock().unwrap();
        let source_id = envelope.source().clone();
        let Some(source) = state.accounts.get(&source_id) else {
            return Err(LedgerError::rejected(RejectionReason::from_code("tx_no_account")));
        };

        if envelope.sequence() != source.sequence + 1 {
            return Err(LedgerError::rejected(RejectionReason::BadSequence));
        }

        let needed = envelope
            .operations()
            .iter()
            .map(|op| required_threshold(op, &source.thresholds))
            .max()
            .unwrap_or(source.thresholds.low)
            .max(1);
        if signed_weight(source, &source_id, envelope, self.network) < u32::from(needed) {
            return Err(LedgerError::rejected(RejectionReason::BadAuth));
        }

        let fee = Amount::from_stroops(i64::from(envelope.fee()));
        if source.native < fee {
            return Err(LedgerError::rejected(RejectionReason::Underfunded));
        }

        let mut accounts = state.accounts.clone();
        let starting_sequence = state.starting_sequence();
        for op in envelope.operations() {
            apply_operation(&mut accounts, &source_id, op, starting_sequence)?;
        }

        let source = accounts
            .get_mut(&source_id)
            .ok_or_else(|| LedgerError::rejected(RejectionReason::from_code("tx_no_account")))?;
        source.sequence += 1;
        source.native = Amount::from_stroops(source.native.stroops() - fee.stroops());

        let hash = envelope.hash(self.network);
        state.accounts = accounts;
        state.applied.push(hash);
        let ledger = state.ledger;
        state.ledger += 1;
        Ok(SettlementResult { hash, ledger })
    }
}

impl Default for NullLedger {
    fn default() -> Self {
        Self::new(NetworkId::Test)
    }
}

#[async_trait]
impl LedgerClient for NullLedger {
    fn network(&self) -> NetworkId {
        self.network
    }

    async fn load_account(&self, account: &AccountId) -> Result<LedgerAccountState, LedgerError> {
        self.load_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.account(account)
            .ok_or_else(|| LedgerError::AccountNotFound(account.clone()))
    }

    async fn submit(
        &self,
        envelope: &TransactionEnvelope,
    ) -> Result<SettlementResult, LedgerError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        let latency = *self.submit_latency.lock().unwrap();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let injected = self.injected.lock().unwrap().pop_front();
        match injected {
            Some(InjectedFailure::Before(error)) => Err(error),
            Some(InjectedFailure::After(error)) => {
                self.apply(envelope)?;
                Err(error)
            }
            None => self.apply(envelope),
        }
    }
}

fn required_threshold(op: &Operation, thresholds: &Thresholds) -> u8 {
    match op {
        Operation::AllowTrust { .. } => thresholds.low,
        Operation::SetSignerWeights { .. } => thresholds.high,
        Operation::CreateAccount { .. }
        | Operation::ChangeTrust { .. }
        | Operation::Payment { .. } => thresholds.medium,
    }
}

/// Sum of weights of the account's keys that validly signed the envelope.
fn signed_weight(
    account: &NullAccount,
    id: &AccountId,
    envelope: &TransactionEnvelope,
    network: NetworkId,
) -> u32 {
    let keys = std::iter::once((id, account.master_weight)).chain(
        account.signers.iter().map(|(key, weight)| (key, *weight)),
    );
    keys.filter(|(_, weight)| *weight > 0)
        .filter(|(key, _)| {
            decode_account_id(key.as_str())
                .map(|pk| envelope.is_signed_by(&pk, network))
                .unwrap_or(false)
        })
        .map(|(_, weight)| u32::from(weight))
        .sum()
}

fn reject(reason: RejectionReason) -> LedgerError {
    LedgerError::rejected(reason)
}

fn apply_operation(
    accounts: &mut BTreeMap<AccountId, NullAccount>,
    source: &AccountId,
    op: &Operation,
    starting_sequence: i64,
) -> Result<(), LedgerError> {
    match op {
        Operation::CreateAccount {
            destination,
            starting_balance,
        } => {
            if accounts.contains_key(destination) {
                return Err(reject(RejectionReason::AlreadyExists));
            }
            debit_native(accounts, source, *starting_balance)?;
            accounts.insert(
                destination.clone(),
                NullAccount::new(starting_sequence, *starting_balance),
            );
        }
        Operation::Payment {
            destination,
            asset,
            amount,
        } => {
            if !accounts.contains_key(destination) {
                return Err(reject(RejectionReason::NoDestination));
            }
            match asset {
                Asset::Native => {
                    debit_native(accounts, source, *amount)?;
                    credit_native(accounts, destination, *amount)?;
                }
                Asset::Credit { issuer, .. } => {
                    if source != issuer {
                        debit_trustline(accounts, source, asset, *amount)?;
                    }
                    if destination != issuer {
                        credit_trustline(accounts, destination, asset, *amount)?;
                    }
                }
            }
        }
        Operation::ChangeTrust { asset } => {
            if asset.issuer() == Some(source) {
                return Err(reject(RejectionReason::from_code("op_self_not_allowed")));
            }
            let account = account_mut(accounts, source)?;
            if account.trustline_mut(asset).is_none() {
                account.trustlines.push(Trustline {
                    asset: asset.clone(),
                    balance: Amount::ZERO,
                    authorized: false,
                });
            }
        }
        Operation::AllowTrust {
            trustor,
            asset,
            authorize,
        } => {
            let account = accounts
                .get_mut(trustor)
                .ok_or_else(|| reject(RejectionReason::NoDestination))?;
            let line = account
                .trustline_mut(asset)
                .ok_or_else(|| reject(RejectionReason::NoTrust))?;
            line.authorized = *authorize;
        }
        Operation::SetSignerWeights {
            signers,
            master_weight,
            thresholds,
        } => {
            let account = account_mut(accounts, source)?;
            for signer in signers {
                if signer.weight == 0 {
                    account.signers.remove(&signer.key);
                } else {
                    account.signers.insert(signer.key.clone(), signer.weight);
                }
            }
            if let Some(weight) = master_weight {
                account.master_weight = *weight;
            }
            account.thresholds = *thresholds;
        }
    }
    Ok(())
}

fn account_mut<'a>(
    accounts: &'a mut BTreeMap<AccountId, NullAccount>,
    id: &AccountId,
) -> Result<&'a mut NullAccount, LedgerError> {
    accounts
        .get_mut(id)
        .ok_or_else(|| reject(RejectionReason::from_code("op_no_account")))
}

fn debit_native(
    accounts: &mut BTreeMap<AccountId, NullAccount>,
    id: &AccountId,
    amount: Amount,
) -> Result<(), LedgerError> {
    let account = account_mut(accounts, id)?;
    account.native = account
        .native
        .checked_sub(amount)
        .filter(|left| left.stroops() >= 0)
        .ok_or_else(|| reject(RejectionReason::Underfunded))?;
    Ok(())
}

fn credit_native(
    accounts: &mut BTreeMap<AccountId, NullAccount>,
    id: &AccountId,
    amount: Amount,
) -> Result<(), LedgerError> {
    let account = account_mut(accounts, id)?;
    account.native = account
        .native
        .checked_add(amount)
        .ok_or_else(|| reject(RejectionReason::LineFull))?;
    Ok(())
}

fn debit_trustline(
    accounts: &mut BTreeMap<AccountId, NullAccount>,
    id: &AccountId,
    asset: &Asset,
    amount: Amount,
) -> Result<(), LedgerError> {
    let line = account_mut(accounts, id)?
        .trustline_mut(asset)
        .ok_or_else(|| reject(RejectionReason::NoTrust))?;
    if !line.authorized {
        return Err(reject(RejectionReason::NotAuthorized));
    }
    line.balance = line
        .balance
        .checked_sub(amount)
        .filter(|left| left.stroops() >= 0)
        .ok_or_else(|| reject(RejectionReason::Underfunded))?;
    Ok(())
}

fn credit_trustline(
    accounts: &mut BTreeMap<AccountId, NullAccount>,
    id: &AccountId,
    asset: &Asset,
    amount: Amount,
) -> Result<(), LedgerError> {
    let line = account_mut(accounts, id)?
        .trustline_mut(asset)
        .ok_or_else(|| reject(RejectionReason::NoTrust))?;
    if !line.authorized {
        return Err(reject(RejectionReason::NotAuthorized));
    }
    line.balance = line
        .balance
        .checked_add(amount)
        .ok_or_else(|| reject(RejectionReason::LineFull))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_crypto::{account_id, keypair_from_seed};
    use anchor_transactions::{build, Memo};
    use anchor_types::KeyPair;

    fn keypair(n: u8) -> KeyPair {
        keypair_from_seed(&[n; 32])
    }

    fn id(n: u8) -> AccountId {
        account_id(&keypair(n).public)
    }

    fn units(n: i64) -> Amount {
        Amount::from_stroops(n * 10_000_000)
    }

    /// Issuer 1, holders 2 and 3 with authorized trustlines.
    fn setup() -> (NullLedger, Asset) {
        let ledger = NullLedger::default();
        let usd = Asset::credit("USD", id(1)).unwrap();
        for n in 1..=3 {
            ledger.create_account(&id(n), units(10));
        }
        ledger.set_trustline(&id(2), &usd, units(50), true);
        ledger.set_trustline(&id(3), &usd, Amount::ZERO, true);
        (ledger, usd)
    }

    async fn pay(
        ledger: &NullLedger,
        from: u8,
        to: u8,
        asset: &Asset,
        amount: i64,
    ) -> Result<SettlementResult, LedgerError> {
        let state = ledger.load_account(&id(from)).await?;
        let op = Operation::Payment {
            destination: id(to),
            asset: asset.clone(),
            amount: units(amount),
        };
        let mut env = build(&state, vec![op], Memo::None).unwrap();
        env.sign(&keypair(from), ledger.network());
        ledger.submit(&env).await
    }

    #[tokio::test]
    async fn payment_moves_balance_and_sequence() {
        let (ledger, usd) = setup();
        let before = ledger.account(&id(2)).unwrap().sequence;

        let result = pay(&ledger, 2, 3, &usd, 20).await.unwrap();

        assert_eq!(ledger.balance(&id(2), &usd), Some(units(30)));
        assert_eq!(ledger.balance(&id(3), &usd), Some(units(20)));
        assert_eq!(ledger.account(&id(2)).unwrap().sequence, before + 1);
        assert_eq!(ledger.applied(), vec![result.hash]);
    }

    #[tokio::test]
    async fn stale_sequence_rejected() {
        let (ledger, usd) = setup();
        let state = ledger.load_account(&id(2)).await.unwrap();
        ledger.simulate_competing_submission(&id(2));

        let op = Operation::Payment {
            destination: id(3),
            asset: usd,
            amount: units(1),
        };
        let mut env = build(&state, vec![op], Memo::None).unwrap();
        env.sign(&keypair(2), ledger.network());
        assert!(ledger.submit(&env).await.unwrap_err().is_bad_sequence());
    }

    #[tokio::test]
    async fn missing_trustline_rejected() {
        let (ledger, usd) = setup();
        ledger.create_account(&id(4), units(10));
        assert_eq!(
            pay(&ledger, 2, 4, &usd, 1).await.unwrap_err(),
            LedgerError::rejected(RejectionReason::NoTrust)
        );
        // Nothing applied.
        assert_eq!(ledger.balance(&id(2), &usd), Some(units(50)));
    }

    #[tokio::test]
    async fn unauthorized_trustline_rejected() {
        let (ledger, usd) = setup();
        ledger.set_trustline(&id(3), &usd, Amount::ZERO, false);
        assert_eq!(
            pay(&ledger, 2, 3, &usd, 1).await.unwrap_err(),
            LedgerError::rejected(RejectionReason::NotAuthorized)
        );
    }

    #[tokio::test]
    async fn overdraft_rejected() {
        let (ledger, usd) = setup();
        assert_eq!(
            pay(&ledger, 2, 3, &usd, 51).await.unwrap_err(),
            LedgerError::rejected(RejectionReason::Underfunded)
        );
    }

    #[tokio::test]
    async fn issuer_mints_and_burns() {
        let (ledger, usd) = setup();
        pay(&ledger, 1, 3, &usd, 5).await.unwrap();
        assert_eq!(ledger.balance(&id(3), &usd), Some(units(5)));
        pay(&ledger, 2, 1, &usd, 50).await.unwrap();
        assert_eq!(ledger.balance(&id(2), &usd), Some(Amount::ZERO));
    }

    #[tokio::test]
    async fn insufficient_signer_weight_rejected() {
        let (ledger, usd) = setup();
        let state = ledger.load_account(&id(2)).await.unwrap();
        let op = Operation::Payment {
            destination: id(3),
            asset: usd.clone(),
            amount: units(1),
        };

        let mut unsigned_by_owner = build(&state, vec![op.clone()], Memo::None).unwrap();
        unsigned_by_owner.sign(&keypair(9), ledger.network());
        assert_eq!(
            ledger.submit(&unsigned_by_owner).await.unwrap_err(),
            LedgerError::rejected(RejectionReason::BadAuth)
        );

        // An added signer with enough weight may sign instead of the master key.
        ledger.add_signer(&id(2), &id(9), 1);
        assert!(ledger.submit(&unsigned_by_owner).await.is_ok());
    }

    #[tokio::test]
    async fn signatures_for_other_network_rejected() {
        let (ledger, usd) = setup();
        let state = ledger.load_account(&id(2)).await.unwrap();
        let op = Operation::Payment {
            destination: id(3),
            asset: usd,
            amount: units(1),
        };
        let mut env = build(&state, vec![op], Memo::None).unwrap();
        env.sign(&keypair(2), NetworkId::Public);
        assert_eq!(
            ledger.submit(&env).await.unwrap_err(),
            LedgerError::rejected(RejectionReason::BadAuth)
        );
    }

    #[tokio::test]
    async fn operations_apply_atomically() {
        let (ledger, usd) = setup();
        ledger.create_account(&id(4), units(10));
        let state = ledger.load_account(&id(2)).await.unwrap();
        let ops = vec![
            Operation::Payment {
                destination: id(3),
                asset: usd.clone(),
                amount: units(5),
            },
            Operation::Payment {
                destination: id(4),
                asset: usd.clone(),
                amount: units(5),
            },
        ];
        let mut env = build(&state, ops, Memo::None).unwrap();
        env.sign(&keypair(2), ledger.network());

        assert!(ledger.submit(&env).await.is_err());
        assert_eq!(ledger.balance(&id(3), &usd), Some(Amount::ZERO));
        assert_eq!(ledger.account(&id(2)).unwrap().sequence, state.sequence);
    }

    #[tokio::test]
    async fn create_account_and_trust_flow() {
        let (ledger, usd) = setup();
        let state = ledger.load_account(&id(2)).await.unwrap();
        let op = Operation::CreateAccount {
            destination: id(5),
            starting_balance: units(2),
        };
        let mut env = build(&state, vec![op], Memo::None).unwrap();
        env.sign(&keypair(2), ledger.network());
        ledger.submit(&env).await.unwrap();
        assert_eq!(ledger.balance(&id(5), &Asset::Native), Some(units(2)));

        let state = ledger.load_account(&id(5)).await.unwrap();
        let trust = Operation::ChangeTrust { asset: usd.clone() };
        let mut env = build(&state, vec![trust], Memo::None).unwrap();
        env.sign(&keypair(5), ledger.network());
        ledger.submit(&env).await.unwrap();
        let line = ledger.account(&id(5)).unwrap();
        assert!(line.has_trustline(&usd));
        assert!(!line.is_authorized(&usd));
    }

    #[tokio::test]
    async fn injected_failures() {
        let (ledger, usd) = setup();
        ledger.fail_next_submit(LedgerError::ambiguous("timeout"));
        assert!(matches!(
            pay(&ledger, 2, 3, &usd, 1).await,
            Err(LedgerError::Network { ambiguous: true, .. })
        ));
        assert_eq!(ledger.balance(&id(3), &usd), Some(Amount::ZERO));

        ledger.fail_next_submit_after_apply(LedgerError::ambiguous("lost response"));
        assert!(pay(&ledger, 2, 3, &usd, 1).await.is_err());
        assert_eq!(ledger.balance(&id(3), &usd), Some(units(1)));

        ledger.reject_operation("payment", RejectionReason::LineFull);
        assert_eq!(
            pay(&ledger, 2, 3, &usd, 1).await.unwrap_err(),
            LedgerError::rejected(RejectionReason::LineFull)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn submit_latency_holds_the_submission() {
        let (ledger, usd) = setup();
        ledger.set_submit_latency(Duration::from_secs(5));
        let started = tokio::time::Instant::now();
        pay(&ledger, 2, 3, &usd, 1).await.unwrap();
        assert!(started.elapsed() >= Duration::from_secs(5));
        assert_eq!(ledger.balance(&id(3), &usd), Some(units(1)));
    }

    #[tokio::test]
    async fn unknown_account_not_found() {
        let ledger = NullLedger::default();
        assert_eq!(
            ledger.load_account(&id(7)).await.unwrap_err(),
            LedgerError::AccountNotFound(id(7))
        );
        assert_eq!(ledger.load_calls(), 1);
        assert_eq!(ledger.total_calls(), 1);
    }
}
