//! Cryptographic primitives for the custodial anchor.
//!
//! - **Ed25519** for account keys and transaction signatures
//! - **SHA-256** for transaction hashes and the network id
//! - **Strkey** encoding: `G…` account ids and `S…` secret seeds (base32 + CRC16-XModem)

pub mod address;
pub mod hash;
pub mod keys;
pub mod sign;

pub use address::{
    account_id, decode_account_id, decode_secret_seed, encode_secret_seed, parse_account_id,
    validate_account_id, StrKeyError,
};
pub use hash::{sha256, sha256_multi};
pub use keys::{generate_keypair, keypair_from_secret, keypair_from_seed, public_from_private};
pub use sign::{sign_message, verify_signature};
