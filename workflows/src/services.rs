//! Collaborators and validated settings shared by every workflow.

use std::sync::Arc;

use anchor_crypto::parse_account_id;
use anchor_custody::{EncryptionKey, SignerResolver, SignerRole};
use anchor_ledger_client::LedgerClient;
use anchor_store::AccountStore;
use anchor_transactions::{Memo, Thresholds};
use anchor_types::{Amount, Asset};

use crate::config::AnchorConfig;
use crate::WorkflowError;

/// Configuration values checked once at startup and shared read-only.
#[derive(Clone, Debug)]
pub struct WorkflowSettings {
    pub asset: Asset,
    pub starting_balance: Amount,
    pub seed_amount: Amount,
    pub memo: Memo,
    pub payment_signer_weight: u8,
    pub admin_signer_weight: u8,
    pub thresholds: Thresholds,
    pub rebuild_on_bad_sequence: bool,
}

impl WorkflowSettings {
    pub fn from_config(config: &AnchorConfig) -> Result<Self, WorkflowError> {
        let issuer = parse_account_id(&config.asset_issuer)
            .map_err(|e| WorkflowError::Config(format!("asset_issuer: {e}")))?;
        let asset = Asset::credit(&config.asset_code, issuer)
            .map_err(|e| WorkflowError::Config(format!("asset_code: {e}")))?;
        let starting_balance = Amount::parse_positive(&config.starting_balance)
            .map_err(|e| WorkflowError::Config(format!("starting_balance: {e}")))?;
        let seed_amount = Amount::parse_positive(&config.seed_amount)
            .map_err(|e| WorkflowError::Config(format!("seed_amount: {e}")))?;
        let memo = Memo::text(&config.memo_text)
            .map_err(|e| WorkflowError::Config(format!("memo_text: {e}")))?;

        let t = config.thresholds;
        if config.payment_signer_weight < t.medium.max(1) {
            return Err(WorkflowError::Config(format!(
                "payment_signer_weight {} cannot meet medium threshold {}",
                config.payment_signer_weight, t.medium
            )));
        }
        if config.admin_signer_weight < t.high.max(1) {
            return Err(WorkflowError::Config(format!(
                "admin_signer_weight {} cannot meet high threshold {}",
                config.admin_signer_weight, t.high
            )));
        }

        Ok(Self {
            asset,
            starting_balance,
            seed_amount,
            memo,
            payment_signer_weight: config.payment_signer_weight,
            admin_signer_weight: config.admin_signer_weight,
            thresholds: t,
            rebuild_on_bad_sequence: config.rebuild_on_bad_sequence,
        })
    }
}

/// Everything a workflow talks to. Cheap to clone.
#[derive(Clone)]
pub struct Services {
    pub ledger: Arc<dyn LedgerClient>,
    pub store: Arc<dyn AccountStore>,
    pub signers: Arc<dyn SignerResolver>,
    pub key: EncryptionKey,
    pub settings: Arc<WorkflowSettings>,
}

impl Services {
    /// Wire up collaborators, checking that the issuer signer actually issues
    /// the configured asset.
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        store: Arc<dyn AccountStore>,
        signers: Arc<dyn SignerResolver>,
        key: EncryptionKey,
        settings: WorkflowSettings,
    ) -> Result<Self, WorkflowError> {
        let issuer = signers.account_id(SignerRole::Issuer)?;
        if settings.asset.issuer() != Some(&issuer) {
            return Err(WorkflowError::Config(format!(
                "issuer signer {issuer} does not issue the configured asset"
            )));
        }
        Ok(Self {
            ledger,
            store,
            signers,
            key,
            settings: Arc::new(settings),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_crypto::{account_id, keypair_from_seed};

    fn config() -> AnchorConfig {
        AnchorConfig {
            asset_issuer: account_id(&keypair_from_seed(&[7; 32]).public).to_string(),
            ..AnchorConfig::default()
        }
    }

    #[test]
    fn settings_from_defaults() {
        let settings = WorkflowSettings::from_config(&config()).unwrap();
        assert_eq!(settings.starting_balance, Amount::from_stroops(20_000_000));
        assert_eq!(settings.seed_amount, Amount::from_stroops(100_000_000));
        assert_eq!(settings.asset.code().unwrap().as_str(), "USD");
        assert_eq!(settings.memo, Memo::Text("https://goo.gl/6pDRPi".into()));
    }

    #[test]
    fn rejects_bad_issuer_checksum() {
        let mut cfg = config();
        let last = cfg.asset_issuer.pop().unwrap();
        cfg.asset_issuer.push(if last == 'A' { 'B' } else { 'A' });
        assert!(matches!(
            WorkflowSettings::from_config(&cfg),
            Err(WorkflowError::Config(msg)) if msg.starts_with("asset_issuer")
        ));
    }

    #[test]
    fn rejects_non_positive_amounts() {
        let cfg = AnchorConfig {
            seed_amount: "0".into(),
            ..config()
        };
        assert!(matches!(
            WorkflowSettings::from_config(&cfg),
            Err(WorkflowError::Config(msg)) if msg.starts_with("seed_amount")
        ));
    }

    #[test]
    fn rejects_weights_below_thresholds() {
        let cfg = AnchorConfig {
            admin_signer_weight: 1,
            ..config()
        };
        assert!(matches!(
            WorkflowSettings::from_config(&cfg),
            Err(WorkflowError::Config(msg)) if msg.contains("high threshold")
        ));
    }

    #[test]
    fn rejects_long_memo() {
        let cfg = AnchorConfig {
            memo_text: "m".repeat(29),
            ..config()
        };
        assert!(matches!(
            WorkflowSettings::from_config(&cfg),
            Err(WorkflowError::Config(msg)) if msg.starts_with("memo_text")
        ));
    }
}
