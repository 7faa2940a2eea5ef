use thiserror::Error;

use crate::signer::SignerRole;

/// Failures while encrypting or decrypting secret material.
///
/// Messages are fixed strings or describe the envelope shape only; they never
/// carry plaintext or key bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    #[error("encryption key is not configured")]
    MissingKey,

    #[error("encryption key is malformed: {0}")]
    InvalidKey(String),

    #[error("sealed secret is malformed: {0}")]
    Malformed(String),

    #[error("unsupported sealed secret version: {0}")]
    UnsupportedVersion(String),

    #[error("decryption failed: wrong key or corrupted data")]
    DecryptionFailed,

    #[error("encryption failed")]
    EncryptionFailed,

    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("decrypted secret is not a valid signing seed")]
    InvalidSecret,

    #[error("decrypted key for {role} does not match its configured account")]
    KeyMismatch { role: SignerRole },
}

#[derive(Debug, Error)]
pub enum CustodyError {
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error("no signer configured for role {0}")]
    MissingSigner(SignerRole),
}
