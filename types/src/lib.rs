//! Fundamental types for the custodial anchor.
//!
//! This crate defines the values shared across every other crate in the workspace:
//! ledger account ids, fixed-point amounts, assets, key material, network
//! identifiers and transaction hashes.

pub mod address;
pub mod amount;
pub mod asset;
pub mod error;
pub mod hash;
pub mod keys;
pub mod network;

pub use address::AccountId;
pub use amount::Amount;
pub use asset::{Asset, AssetCode};
pub use error::{AmountError, AssetError};
pub use hash::TxHash;
pub use keys::{KeyPair, PrivateKey, PublicKey, Signature};
pub use network::NetworkId;
