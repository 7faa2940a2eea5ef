//! Anchor configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use anchor_custody::SealedSigner;
use anchor_transactions::Thresholds;
use anchor_types::NetworkId;

use crate::WorkflowError;

/// Configuration for the anchor.
///
/// Can be loaded from a TOML file via [`AnchorConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnchorConfig {
    /// Which network transactions are signed for.
    #[serde(default = "default_network")]
    pub network: NetworkId,

    /// Horizon endpoint. Defaults to the network's public instance.
    #[serde(default)]
    pub horizon_url: Option<String>,

    /// Fee per operation, in stroops.
    #[serde(default = "default_base_fee")]
    pub base_fee: u32,

    /// Timeout for account loads, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Timeout for a single submission, in seconds.
    #[serde(default = "default_submit_timeout_secs")]
    pub submit_timeout_secs: u64,

    /// Code of the custom asset, e.g. "USD".
    #[serde(default = "default_asset_code")]
    pub asset_code: String,

    /// Account id of the asset issuer. Must match the `issuer` signer.
    #[serde(default)]
    pub asset_issuer: String,

    /// Native balance given to newly created ledger accounts.
    #[serde(default = "default_starting_balance")]
    pub starting_balance: String,

    /// Custom-asset balance paid to an account at the end of provisioning.
    #[serde(default = "default_seed_amount")]
    pub seed_amount: String,

    /// Text memo attached to every transaction.
    #[serde(default = "default_memo_text")]
    pub memo_text: String,

    /// Sealed operational keys, one per role.
    #[serde(default)]
    pub signers: Vec<SealedSigner>,

    /// Weight given to the payment signer on custodial accounts.
    #[serde(default = "default_payment_signer_weight")]
    pub payment_signer_weight: u8,

    /// Weight given to the admin signer on custodial accounts.
    #[serde(default = "default_admin_signer_weight")]
    pub admin_signer_weight: u8,

    /// Thresholds set on custodial accounts.
    #[serde(default = "default_thresholds")]
    pub thresholds: Thresholds,

    /// Rebuild and resubmit a payment once if the ledger reports a stale
    /// sequence number.
    #[serde(default = "default_true")]
    pub rebuild_on_bad_sequence: bool,

    /// Path of the account record store.
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_network() -> NetworkId {
    NetworkId::Test
}

fn default_base_fee() -> u32 {
    100
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_submit_timeout_secs() -> u64 {
    60
}

fn default_asset_code() -> String {
    "USD".to_string()
}

fn default_starting_balance() -> String {
    "2".to_string()
}

fn default_seed_amount() -> String {
    "10".to_string()
}

fn default_memo_text() -> String {
    "https://goo.gl/6pDRPi".to_string()
}

fn default_payment_signer_weight() -> u8 {
    1
}

fn default_admin_signer_weight() -> u8 {
    2
}

fn default_thresholds() -> Thresholds {
    Thresholds {
        low: 1,
        medium: 1,
        high: 2,
    }
}

fn default_true() -> bool {
    true
}

fn default_store_path() -> PathBuf {
    PathBuf::from("./anchor_data/accounts.json")
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AnchorConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, WorkflowError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| WorkflowError::Config(format!("failed to read {path}: {e}")))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, WorkflowError> {
        toml::from_str(s).map_err(|e| WorkflowError::Config(e.to_string()))
    }

    /// Serialize this configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, WorkflowError> {
        toml::to_string_pretty(self).map_err(|e| WorkflowError::Config(e.to_string()))
    }

    /// The Horizon endpoint to talk to.
    pub fn horizon_url(&self) -> &str {
        self.horizon_url
            .as_deref()
            .unwrap_or_else(|| self.network.default_horizon_url())
    }
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self {
            network: default_network(),
            horizon_url: None,
            base_fee: default_base_fee(),
            request_timeout_secs: default_request_timeout_secs(),
            submit_timeout_secs: default_submit_timeout_secs(),
            asset_code: default_asset_code(),
            asset_issuer: String::new(),
            starting_balance: default_starting_balance(),
            seed_amount: default_seed_amount(),
            memo_text: default_memo_text(),
            signers: Vec::new(),
            payment_signer_weight: default_payment_signer_weight(),
            admin_signer_weight: default_admin_signer_weight(),
            thresholds: default_thresholds(),
            rebuild_on_bad_sequence: default_true(),
            store_path: default_store_path(),
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}
