//! `anchor`: command-line entry point for the custodial anchor.

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anchor_crypto::{account_id, keypair_from_secret};
use anchor_custody::{
    new_account_keypair, seal_keypair, EncryptionKey, SealedSigner, SealedSignerResolver,
    SignerRole, DEFAULT_KEY_ENV,
};
use anchor_ledger_client::HorizonClient;
use anchor_store::JsonFileStore;
use anchor_types::{KeyPair, NetworkId};
use anchor_utils::{init_logging, LogFormat};
use anchor_workflows::{
    Anchor, AnchorConfig, ProvisioningReport, Services, WorkflowError, WorkflowSettings,
};
use anyhow::Context;
use clap::Parser;
use serde::Serialize;

#[derive(Parser)]
#[command(name = "anchor", about = "Custodial anchor for a custom ledger asset")]
struct Cli {
    /// Path to a TOML configuration file. CLI flags and env vars override it.
    #[arg(long, env = "ANCHOR_CONFIG")]
    config: Option<PathBuf>,

    /// Network to sign for: "public" or "test".
    #[arg(long, env = "ANCHOR_NETWORK")]
    network: Option<String>,

    /// Horizon endpoint (defaults to the network's public instance).
    #[arg(long, env = "ANCHOR_HORIZON_URL")]
    horizon_url: Option<String>,

    /// Path of the account record store.
    #[arg(long, env = "ANCHOR_STORE_PATH")]
    store_path: Option<PathBuf>,

    /// Name of the environment variable holding the encryption key.
    #[arg(long, default_value = DEFAULT_KEY_ENV)]
    encryption_key_env: String,

    /// Abort a request that has not finished submitting within this many seconds.
    #[arg(long, env = "ANCHOR_DEADLINE_SECS")]
    deadline_secs: Option<u64>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "ANCHOR_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "ANCHOR_LOG_FORMAT")]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Register a username and provision its ledger account.
    Signup { username: String },

    /// Finish provisioning for a registered username.
    Resume { username: String },

    /// Pay the custom asset from one account to another.
    Transfer {
        amount: String,
        sender: String,
        recipient: String,
        /// Recorded in the log; envelopes carry the configured memo.
        #[arg(long)]
        memo: Option<String>,
    },

    /// Issue the custom asset to an account.
    Credit { amount: String, account: String },

    /// Burn the custom asset held by an account.
    Debit { amount: String, account: String },

    /// Generate a role key and print it sealed, as a `[[signers]]` entry.
    Keygen {
        #[arg(long, value_parser = parse_role)]
        role: SignerRole,
    },

    /// Seal an existing secret seed (read from stdin) for a role.
    Seal {
        #[arg(long, value_parser = parse_role)]
        role: SignerRole,
    },
}

fn parse_role(s: &str) -> Result<SignerRole, String> {
    SignerRole::ALL
        .into_iter()
        .find(|role| role.as_str() == s.replace('-', "_"))
        .ok_or_else(|| {
            let names: Vec<&str> = SignerRole::ALL.iter().map(|r| r.as_str()).collect();
            format!("unknown role {s:?}, expected one of {}", names.join(", "))
        })
}

#[derive(Serialize)]
struct SignerEntries {
    signers: Vec<SealedSigner>,
}

#[derive(Serialize)]
struct ReportOutput<'a> {
    username: &'a str,
    account_id: &'a str,
    state: String,
    existing: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    ledger_failure: Option<String>,
}

impl<'a> From<&'a ProvisioningReport> for ReportOutput<'a> {
    fn from(report: &'a ProvisioningReport) -> Self {
        Self {
            username: &report.record.username,
            account_id: report.record.account_id.as_str(),
            state: report.state().to_string(),
            existing: report.existing,
            ledger_failure: report.ledger_failure.as_ref().map(|e| e.to_string()),
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<AnchorConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let path = path.to_string_lossy();
            AnchorConfig::from_toml_file(&path)
                .with_context(|| format!("loading configuration from {path}"))?
        }
        None => AnchorConfig::default(),
    };

    if let Some(network) = &cli.network {
        config.network = NetworkId::parse(network)
            .with_context(|| format!("unknown network {network:?}, expected public or test"))?;
    }
    if let Some(url) = &cli.horizon_url {
        config.horizon_url = Some(url.clone());
    }
    if let Some(path) = &cli.store_path {
        config.store_path = path.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.log_format = format.clone();
    }
    Ok(config)
}

fn build_anchor(
    config: &AnchorConfig,
    key: EncryptionKey,
    deadline: Option<Duration>,
) -> anyhow::Result<Anchor> {
    let settings = WorkflowSettings::from_config(config)?;
    let ledger = HorizonClient::with_timeouts(
        config.horizon_url(),
        config.network,
        config.base_fee,
        Duration::from_secs(config.request_timeout_secs),
        Duration::from_secs(config.submit_timeout_secs),
    )?;
    let store = JsonFileStore::open(&config.store_path)?;
    let signers = SealedSignerResolver::new(key.clone(), config.signers.clone())?;
    let services = Services::new(
        Arc::new(ledger),
        Arc::new(store),
        Arc::new(signers),
        key,
        settings,
    )?;

    tracing::info!(
        network = config.network.as_str(),
        horizon = config.horizon_url(),
        store = %config.store_path.display(),
        "anchor ready"
    );
    let anchor = Anchor::new(services);
    Ok(match deadline {
        Some(timeout) => anchor.with_request_timeout(timeout),
        None => anchor,
    })
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_signer(role: SignerRole, keypair: &KeyPair, key: &EncryptionKey) -> anyhow::Result<()> {
    let entry = SealedSigner {
        role,
        account_id: account_id(&keypair.public),
        sealed_seed: seal_keypair(keypair, key)?,
    };
    print!(
        "{}",
        toml::to_string(&SignerEntries {
            signers: vec![entry]
        })?
    );
    Ok(())
}

/// Log the failure with its class, then hand it to anyhow.
fn report_failure(e: WorkflowError) -> anyhow::Error {
    tracing::error!(class = ?e.class(), error = %e, "request failed");
    e.into()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let format: LogFormat = config.log_format.parse()?;
    init_logging(format, &config.log_level)?;

    let key = EncryptionKey::from_env(&cli.encryption_key_env)
        .with_context(|| format!("reading encryption key from ${}", cli.encryption_key_env))?;
    let deadline = cli.deadline_secs.map(Duration::from_secs);

    match cli.command {
        Command::Keygen { role } => {
            let keypair = new_account_keypair();
            print_signer(role, &keypair, &key)?;
        }
        Command::Seal { role } => {
            let mut line = String::new();
            std::io::stdin()
                .lock()
                .read_line(&mut line)
                .context("reading secret seed from stdin")?;
            let keypair = keypair_from_secret(line.trim())?;
            print_signer(role, &keypair, &key)?;
        }
        Command::Signup { username } => {
            let anchor = build_anchor(&config, key, deadline)?;
            let report = anchor.provision(&username).await.map_err(report_failure)?;
            print_json(&ReportOutput::from(&report))?;
        }
        Command::Resume { username } => {
            let anchor = build_anchor(&config, key, deadline)?;
            let report = anchor.resume(&username).await.map_err(report_failure)?;
            print_json(&ReportOutput::from(&report))?;
        }
        Command::Transfer {
            amount,
            sender,
            recipient,
            memo,
        } => {
            let anchor = build_anchor(&config, key, deadline)?;
            let result = anchor
                .transfer(&amount, &sender, &recipient, memo.as_deref())
                .await
                .map_err(report_failure)?;
            print_json(&result)?;
        }
        Command::Credit { amount, account } => {
            let anchor = build_anchor(&config, key, deadline)?;
            let result = anchor
                .credit(&amount, &account)
                .await
                .map_err(report_failure)?;
            print_json(&result)?;
        }
        Command::Debit { amount, account } => {
            let anchor = build_anchor(&config, key, deadline)?;
            let result = anchor
                .debit(&amount, &account)
                .await
                .map_err(report_failure)?;
            print_json(&result)?;
        }
    }
    Ok(())
}
