//! Cryptographic key types for ledger accounts and signing.

use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A 32-byte ed25519 public key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicKey(pub [u8; 32]);

/// A 32-byte ed25519 private key (seed).
///
/// This type intentionally does not implement `Serialize` or `Clone`, and its
/// `Debug` output is redacted. Key bytes are zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey(pub [u8; 32]);

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

/// A 64-byte ed25519 signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature(pub [u8; 64]);

/// An ed25519 key pair (public + private).
///
/// Use `anchor_crypto::generate_keypair()` or `anchor_crypto::keypair_from_seed()`
/// to construct key pairs. This struct is intentionally just data.
#[derive(Debug)]
pub struct KeyPair {
    pub public: PublicKey,
    pub private: PrivateKey,
}

impl PublicKey {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Last four bytes, used by the ledger as a signature hint.
    pub fn hint(&self) -> [u8; 4] {
        let mut hint = [0u8; 4];
        hint.copy_from_slice(&self.0[28..]);
        hint
    }
}

impl Signature {
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn private_key_debug_is_redacted() {
        let key = PrivateKey([7u8; 32]);
        let rendered = format!("{key:?}");
        assert!(!rendered.contains('7'));
        assert!(rendered.contains("redacted"));
    }

    #[test]
    fn hint_is_last_four_bytes() {
        let mut bytes = [0u8; 32];
        bytes[28..].copy_from_slice(&[1, 2, 3, 4]);
        assert_eq!(PublicKey(bytes).hint(), [1, 2, 3, 4]);
    }
}
