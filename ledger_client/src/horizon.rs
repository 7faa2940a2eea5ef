//! Horizon HTTP adapter.
//!
//! `GET /accounts/{id}` for state, `POST /transactions` (form field `tx`) for
//! submission. Status handling on submit:
//! - 200: applied, returns hash and ledger
//! - 400 with `extras.result_codes`: rejected, nothing applied
//! - timeout, 5xx, or anything unreadable: ambiguous

use anchor_transactions::{
    AccountSigner, Balance, LedgerAccountState, Thresholds, TransactionEnvelope,
};
use anchor_types::{AccountId, Amount, Asset, NetworkId, TxHash};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::client::{LedgerClient, SettlementResult};
use crate::error::{LedgerError, RejectionReason};

/// Default timeout for account reads.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Default timeout for submissions. Horizon itself gives up after about 30s.
pub const DEFAULT_SUBMIT_TIMEOUT: Duration = Duration::from_secs(60);

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct HorizonClient {
    http: reqwest::Client,
    base_url: String,
    network: NetworkId,
    base_fee: u32,
    submit_timeout: Duration,
}

impl HorizonClient {
    pub fn new(
        base_url: impl Into<String>,
        network: NetworkId,
        base_fee: u32,
    ) -> Result<Self, LedgerError> {
        Self::with_timeouts(
            base_url,
            network,
            base_fee,
            DEFAULT_REQUEST_TIMEOUT,
            DEFAULT_SUBMIT_TIMEOUT,
        )
    }

    pub fn with_timeouts(
        base_url: impl Into<String>,
        network: NetworkId,
        base_fee: u32,
        request_timeout: Duration,
        submit_timeout: Duration,
    ) -> Result<Self, LedgerError> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| LedgerError::network(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            network,
            base_fee,
            submit_timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl LedgerClient for HorizonClient {
    fn network(&self) -> NetworkId {
        self.network
    }

    async fn load_account(&self, account: &AccountId) -> Result<LedgerAccountState, LedgerError> {
        let url = format!("{}/accounts/{}", self.base_url, account);
        tracing::debug!(account = %account, "loading account state");

        let response = self.http.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                LedgerError::network(format!("request timed out: {e}"))
            } else if e.is_connect() {
                LedgerError::network(format!("connection failed: {e}"))
            } else {
                LedgerError::network(e.to_string())
            }
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(LedgerError::AccountNotFound(account.clone()));
        }
        if !status.is_success() {
            return Err(LedgerError::network(format!("horizon returned HTTP {status}")));
        }

        let body: AccountResponse = response
            .json()
            .await
            .map_err(|e| LedgerError::network(format!("invalid account response: {e}")))?;
        body.into_state(self.base_fee)
    }

    async fn submit(
        &self,
        envelope: &TransactionEnvelope,
    ) -> Result<SettlementResult, LedgerError> {
        let url = format!("{}/transactions", self.base_url);
        let hash = envelope.hash(self.network);
        tracing::info!(
            hash = %hash,
            source = %envelope.source(),
            sequence = envelope.sequence(),
            "submitting transaction"
        );

        // Once the request may have left the process, any failure is ambiguous.
        let response = self
            .http
            .post(&url)
            .timeout(self.submit_timeout)
            .form(&[("tx", envelope.to_xdr_base64())])
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    LedgerError::network(format!("connection failed: {e}"))
                } else {
                    LedgerError::ambiguous(format!("submission outcome unknown: {e}"))
                }
            })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| LedgerError::ambiguous(format!("failed to read submit response: {e}")))?;

        let result = parse_submit_response(status, &body);
        match &result {
            Ok(settled) => {
                tracing::info!(hash = %settled.hash, ledger = settled.ledger, "transaction applied")
            }
            Err(e) => tracing::warn!(hash = %hash, error = %e, "transaction not applied"),
        }
        result
    }
}

// ── Response bodies ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct AccountResponse {
    account_id: String,
    sequence: String,
    thresholds: ThresholdsResponse,
    #[serde(default)]
    signers: Vec<SignerResponse>,
    #[serde(default)]
    balances: Vec<BalanceResponse>,
}

#[derive(Debug, Deserialize)]
struct ThresholdsResponse {
    low_threshold: u8,
    med_threshold: u8,
    high_threshold: u8,
}

#[derive(Debug, Deserialize)]
struct SignerResponse {
    key: String,
    weight: u8,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct BalanceResponse {
    balance: String,
    asset_type: String,
    asset_code: Option<String>,
    asset_issuer: Option<String>,
    is_authorized: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct SubmitSuccess {
    hash: String,
    ledger: u32,
}

#[derive(Debug, Deserialize)]
struct Problem {
    #[serde(default)]
    title: String,
    extras: Option<ProblemExtras>,
}

#[derive(Debug, Deserialize)]
struct ProblemExtras {
    result_codes: Option<ResultCodes>,
}

#[derive(Debug, Deserialize)]
struct ResultCodes {
    #[serde(default)]
    transaction: String,
    #[serde(default)]
    operations: Vec<String>,
}

impl AccountResponse {
    fn into_state(self, base_fee: u32) -> Result<LedgerAccountState, LedgerError> {
        let account_id = AccountId::new(self.account_id);
        let sequence = self
            .sequence
            .parse::<i64>()
            .map_err(|e| LedgerError::network(format!("invalid sequence {:?}: {e}", self.sequence)))?;

        let mut master_weight = 0;
        let mut signers = Vec::new();
        for signer in self.signers {
            if signer.key == account_id.as_str() {
                master_weight = signer.weight;
            } else if signer.kind == "ed25519_public_key" {
                signers.push(AccountSigner {
                    key: AccountId::new(signer.key),
                    weight: signer.weight,
                });
            }
        }

        let mut balances = Vec::new();
        for line in self.balances {
            let Some(asset) = line.asset()? else {
                continue;
            };
            let balance = line
                .balance
                .parse::<Amount>()
                .map_err(|e| LedgerError::network(format!("invalid balance: {e}")))?;
            balances.push(Balance {
                authorized: asset.is_native() || line.is_authorized.unwrap_or(false),
                asset,
                balance,
            });
        }

        Ok(LedgerAccountState {
            account_id,
            sequence,
            base_fee,
            thresholds: Thresholds {
                low: self.thresholds.low_threshold,
                medium: self.thresholds.med_threshold,
                high: self.thresholds.high_threshold,
            },
            master_weight,
            signers,
            balances,
        })
    }
}

impl BalanceResponse {
    /// `None` for balance kinds the anchor never touches (pool shares).
    fn asset(&self) -> Result<Option<Asset>, LedgerError> {
        match self.asset_type.as_str() {
            "native" => Ok(Some(Asset::Native)),
            "credit_alphanum4" | "credit_alphanum12" => {
                let (Some(code), Some(issuer)) = (&self.asset_code, &self.asset_issuer) else {
                    return Err(LedgerError::network("credit balance without code or issuer"));
                };
                Asset::credit(code, AccountId::new(issuer.clone()))
                    .map(Some)
                    .map_err(|e| LedgerError::network(format!("invalid asset in balance: {e}")))
            }
            _ => Ok(None),
        }
    }
}

/// Classify a submit response by status and body.
fn parse_submit_response(status: u16, body: &str) -> Result<SettlementResult, LedgerError> {
    if (200..300).contains(&status) {
        let ok: SubmitSuccess = serde_json::from_str(body)
            .map_err(|e| LedgerError::ambiguous(format!("unreadable success response: {e}")))?;
        let hash = TxHash::from_hex(&ok.hash)
            .ok_or_else(|| LedgerError::ambiguous(format!("invalid hash {:?}", ok.hash)))?;
        return Ok(SettlementResult {
            hash,
            ledger: ok.ledger,
        });
    }

    if status == 400 {
        if let Ok(problem) = serde_json::from_str::<Problem>(body) {
            if let Some(codes) = problem.extras.and_then(|x| x.result_codes) {
                return Err(LedgerError::rejected(RejectionReason::from_result_codes(
                    &codes.transaction,
                    &codes.operations,
                )));
            }
            return Err(LedgerError::network(format!(
                "horizon rejected request: {}",
                problem.title
            )));
        }
    }

    Err(LedgerError::ambiguous(format!("horizon returned HTTP {status}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCOUNT: &str = "GBX67BEOABQAELIP2XTC6JXHJPASKYCIQNS7WF6GWPSCBEAJEK74HK36";
    const SIGNER: &str = "GCQOZGXMH6MI3JKWWO365BCXUJN6MFZR7XMKKCHGDY2K6JNCYFRH6M4C";

    fn account_json() -> String {
        format!(
            r#"{{
                "id": "{ACCOUNT}",
                "account_id": "{ACCOUNT}",
                "sequence": "4294967296",
                "thresholds": {{"low_threshold": 1, "med_threshold": 1, "high_threshold": 2}},
                "signers": [
                    {{"key": "{SIGNER}", "weight": 1, "type": "ed25519_public_key"}},
                    {{"key": "{ACCOUNT}", "weight": 0, "type": "ed25519_public_key"}}
                ],
                "balances": [
                    {{"balance": "10.0000000", "limit": "922337203685.4775807",
                      "asset_type": "credit_alphanum4", "asset_code": "USD",
                      "asset_issuer": "{SIGNER}", "is_authorized": true}},
                    {{"balance": "2.0000000", "asset_type": "native"}},
                    {{"balance": "1.0000000", "asset_type": "liquidity_pool_shares"}}
                ]
            }}"#
        )
    }

    #[test]
    fn account_response_maps_to_state() {
        let body: AccountResponse = serde_json::from_str(&account_json()).unwrap();
        let state = body.into_state(100).unwrap();

        assert_eq!(state.account_id.as_str(), ACCOUNT);
        assert_eq!(state.sequence, 4_294_967_296);
        assert_eq!(state.base_fee, 100);
        assert_eq!(state.thresholds, Thresholds { low: 1, medium: 1, high: 2 });
        assert_eq!(state.master_weight, 0);
        assert_eq!(state.signers.len(), 1);
        assert_eq!(state.signers[0].key.as_str(), SIGNER);

        let usd = Asset::credit("USD", AccountId::new(SIGNER)).unwrap();
        assert!(state.is_authorized(&usd));
        assert_eq!(
            state.balance_of(&usd).unwrap().balance,
            Amount::from_stroops(100_000_000)
        );
        assert!(state.balance_of(&Asset::Native).is_some());
        assert_eq!(state.balances.len(), 2);
    }

    #[test]
    fn success_response() {
        let hash = "ab".repeat(32);
        let body = format!(r#"{{"hash": "{hash}", "ledger": 123, "successful": true}}"#);
        let result = parse_submit_response(200, &body).unwrap();
        assert_eq!(result.ledger, 123);
        assert_eq!(result.hash.to_string(), hash);
    }

    #[test]
    fn rejection_response() {
        let body = r#"{
            "type": "https://stellar.org/horizon-errors/transaction_failed",
            "title": "Transaction Failed",
            "status": 400,
            "extras": {"result_codes": {"transaction": "tx_failed", "operations": ["op_no_trust"]}}
        }"#;
        assert_eq!(
            parse_submit_response(400, body).unwrap_err(),
            LedgerError::rejected(RejectionReason::NoTrust)
        );
    }

    #[test]
    fn bad_sequence_response() {
        let body = r#"{"title": "Transaction Failed",
            "extras": {"result_codes": {"transaction": "tx_bad_seq"}}}"#;
        assert!(parse_submit_response(400, body).unwrap_err().is_bad_sequence());
    }

    #[test]
    fn gateway_timeout_is_ambiguous() {
        assert!(matches!(
            parse_submit_response(504, "{}"),
            Err(LedgerError::Network { ambiguous: true, .. })
        ));
    }

    #[test]
    fn malformed_request_is_not_ambiguous() {
        let body = r#"{"title": "Transaction Malformed", "extras": {}}"#;
        assert!(matches!(
            parse_submit_response(400, body),
            Err(LedgerError::Network { ambiguous: false, .. })
        ));
    }

    #[test]
    fn client_trims_trailing_slash() {
        let client =
            HorizonClient::new("https://horizon-testnet.stellar.org/", NetworkId::Test, 100).unwrap();
        assert_eq!(client.base_url(), "https://horizon-testnet.stellar.org");
        assert_eq!(client.network(), NetworkId::Test);
    }

    #[tokio::test]
    async fn unreachable_server_is_a_network_error() {
        let client = HorizonClient::with_timeouts(
            "http://127.0.0.1:9",
            NetworkId::Test,
            100,
            Duration::from_millis(500),
            Duration::from_millis(500),
        )
        .unwrap();
        let err = client.load_account(&AccountId::new(ACCOUNT)).await.unwrap_err();
        assert!(matches!(err, LedgerError::Network { ambiguous: false, .. }));
    }
}
