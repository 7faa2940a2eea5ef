//! Network identifier.

use serde::{Deserialize, Serialize};

/// Identifies which ledger network transactions are signed for.
///
/// The passphrase is mixed into every transaction hash, so an envelope signed
/// for one network is rejected by the other.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkId {
    /// The production network.
    Public,
    /// The public test network.
    Test,
}

impl NetworkId {
    /// Network passphrase hashed into the signature payload.
    pub fn passphrase(&self) -> &'static str {
        match self {
            Self::Public => "Public Global Stellar Network ; September 2015",
            Self::Test => "Test SDF Network ; September 2015",
        }
    }

    /// Default Horizon endpoint for this network.
    pub fn default_horizon_url(&self) -> &'static str {
        match self {
            Self::Public => "https://horizon.stellar.org",
            Self::Test => "https://horizon-testnet.stellar.org",
        }
    }

    /// Human-readable name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Test => "test",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "public" | "live" | "mainnet" => Some(Self::Public),
            "test" | "testnet" => Some(Self::Test),
            _ => None,
        }
    }
}
