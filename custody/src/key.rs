//! The process-wide symmetric key that protects secrets at rest.

use std::fmt;
use zeroize::Zeroizing;

use crate::error::CryptoError;

/// Default environment variable holding the encryption key.
pub const DEFAULT_KEY_ENV: &str = "ANCHOR_ENCRYPTION_KEY";

/// Shortest key accepted, in bytes.
pub const MIN_KEY_LEN: usize = 16;

/// Symmetric key material injected at startup.
///
/// As sensitive as the private keys it protects: bytes are zeroized on drop
/// and `Debug` never prints them.
#[derive(Clone)]
pub struct EncryptionKey(Zeroizing<Vec<u8>>);

impl EncryptionKey {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, CryptoError> {
        let bytes = Zeroizing::new(bytes.into());
        if bytes.is_empty() {
            return Err(CryptoError::MissingKey);
        }
        if bytes.len() < MIN_KEY_LEN {
            return Err(CryptoError::InvalidKey(format!(
                "expected at least {MIN_KEY_LEN} bytes, got {}",
                bytes.len()
            )));
        }
        Ok(Self(bytes))
    }

    /// Read the key from an environment variable.
    pub fn from_env(var: &str) -> Result<Self, CryptoError> {
        let value = Zeroizing::new(std::env::var(var).map_err(|_| CryptoError::MissingKey)?);
        Self::new(value.as_bytes())
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EncryptionKey(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_key_is_missing() {
        assert_eq!(EncryptionKey::new(Vec::new()).unwrap_err(), CryptoError::MissingKey);
    }

    #[test]
    fn short_key_is_malformed() {
        assert!(matches!(
            EncryptionKey::new(b"short".to_vec()),
            Err(CryptoError::InvalidKey(_))
        ));
    }

    #[test]
    fn debug_is_redacted() {
        let key = EncryptionKey::new(b"super-secret-configuration".to_vec()).unwrap();
        let rendered = format!("{key:?}");
        assert!(!rendered.contains("super"));
    }

    #[test]
    fn unset_env_var_is_missing() {
        let err = EncryptionKey::from_env("ANCHOR_TEST_KEY_THAT_IS_NEVER_SET").unwrap_err();
        assert_eq!(err, CryptoError::MissingKey);
    }
}
