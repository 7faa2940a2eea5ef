//! Key custody for the custodial anchor.
//!
//! Provides everything that touches secret key material:
//! - Keypair generation for newly provisioned accounts
//! - Encryption of secrets at rest (Argon2id + AES-256-GCM) under a process-wide key
//! - Decryption only at the point of signing
//! - Resolution of operational signing keys by role

pub mod error;
pub mod key;
pub mod keystore;
pub mod signer;

pub use error::{CryptoError, CustodyError};
pub use key::{EncryptionKey, DEFAULT_KEY_ENV, MIN_KEY_LEN};
pub use keystore::{decrypt_secret, encrypt_secret, new_account_keypair, seal_keypair, unseal_keypair};
pub use signer::{SealedSigner, SealedSignerResolver, SignerResolver, SignerRole};
