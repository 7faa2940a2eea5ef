//! Encryption of secret material at rest.
//!
//! A secret is sealed under the process-wide [`EncryptionKey`]:
//! 1. Argon2id derives a 32-byte cipher key from the configuration key + random salt
//! 2. AES-256-GCM encrypts the secret with a random nonce
//! 3. The result is rendered as `v1$<salt>$<nonce>$<ciphertext>` (hex fields)
//!
//! Sealing the same secret twice yields different strings; opening with the
//! wrong key fails the AEAD tag check instead of returning garbage.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use anchor_crypto::{encode_secret_seed, generate_keypair, keypair_from_secret};
use anchor_types::KeyPair;
use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use zeroize::Zeroizing;

use crate::error::CryptoError;
use crate::key::EncryptionKey;

/// Argon2id parameters: 19 MiB memory, 2 iterations, 1 lane.
const ARGON2_MEMORY_KIB: u32 = 19 * 1024;
const ARGON2_ITERATIONS: u32 = 2;
const ARGON2_PARALLELISM: u32 = 1;
const ARGON2_OUTPUT_LEN: usize = 32;

const VERSION: &str = "v1";
const SEPARATOR: char = '$';

/// Salt length in bytes.
const SALT_LEN: usize = 16;
/// AES-GCM nonce length in bytes (96 bits).
const NONCE_LEN: usize = 12;

/// Encrypt a secret string under the configuration key.
pub fn encrypt_secret(secret: &str, key: &EncryptionKey) -> Result<String, CryptoError> {
    let mut rng = rand::thread_rng();

    let mut salt = [0u8; SALT_LEN];
    rng.fill_bytes(&mut salt);

    let mut nonce_bytes = [0u8; NONCE_LEN];
    rng.fill_bytes(&mut nonce_bytes);

    let derived_key = derive_key(key, &salt)?;
    let cipher =
        Aes256Gcm::new_from_slice(&derived_key[..]).map_err(|_| CryptoError::EncryptionFailed)?;

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), secret.as_bytes())
        .map_err(|_| CryptoError::EncryptionFailed)?;

    Ok(format!(
        "{VERSION}{SEPARATOR}{}{SEPARATOR}{}{SEPARATOR}{}",
        hex::encode(salt),
        hex::encode(nonce_bytes),
        hex::encode(ciphertext)
    ))
}

/// Decrypt a sealed secret produced by [`encrypt_secret`].
pub fn decrypt_secret(
    sealed: &str,
    key: &EncryptionKey,
) -> Result<Zeroizing<String>, CryptoError> {
    let mut parts = sealed.split(SEPARATOR);
    let version = parts.next().unwrap_or_default();
    if version != VERSION {
        return Err(CryptoError::UnsupportedVersion(truncate(version)));
    }

    let (Some(salt), Some(nonce), Some(ciphertext), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(CryptoError::Malformed("expected 4 fields".to_string()));
    };

    let salt = hex::decode(salt).map_err(|e| CryptoError::Malformed(format!("salt: {e}")))?;
    let nonce_bytes =
        hex::decode(nonce).map_err(|e| CryptoError::Malformed(format!("nonce: {e}")))?;
    let ciphertext =
        hex::decode(ciphertext).map_err(|e| CryptoError::Malformed(format!("ciphertext: {e}")))?;

    if salt.len() != SALT_LEN {
        return Err(CryptoError::Malformed(format!(
            "salt must be {SALT_LEN} bytes, got {}",
            salt.len()
        )));
    }
    if nonce_bytes.len() != NONCE_LEN {
        return Err(CryptoError::Malformed(format!(
            "nonce must be {NONCE_LEN} bytes, got {}",
            nonce_bytes.len()
        )));
    }

    let derived_key = derive_key(key, &salt)?;
    let cipher =
        Aes256Gcm::new_from_slice(&derived_key[..]).map_err(|_| CryptoError::DecryptionFailed)?;

    let plaintext = Zeroizing::new(
        cipher
            .decrypt(Nonce::from_slice(&nonce_bytes), ciphertext.as_ref())
            .map_err(|_| CryptoError::DecryptionFailed)?,
    );

    let text = std::str::from_utf8(&plaintext).map_err(|_| CryptoError::DecryptionFailed)?;
    Ok(Zeroizing::new(text.to_owned()))
}

/// Generate a fresh keypair for a new custodial account.
pub fn new_account_keypair() -> KeyPair {
    generate_keypair()
}

/// Seal a keypair's secret seed (`S…` form) for storage.
pub fn seal_keypair(keypair: &KeyPair, key: &EncryptionKey) -> Result<String, CryptoError> {
    let secret = encode_secret_seed(&keypair.private.0);
    encrypt_secret(&secret, key)
}

/// Open a sealed seed and rebuild the keypair. Only call this right before signing.
pub fn unseal_keypair(sealed: &str, key: &EncryptionKey) -> Result<KeyPair, CryptoError> {
    let secret = decrypt_secret(sealed, key)?;
    keypair_from_secret(&secret).map_err(|_| CryptoError::InvalidSecret)
}

/// Derive a 32-byte cipher key from the configuration key and salt using Argon2id.
fn derive_key(key: &EncryptionKey, salt: &[u8]) -> Result<Zeroizing<[u8; 32]>, CryptoError> {
    let params = Params::new(
        ARGON2_MEMORY_KIB,
        ARGON2_ITERATIONS,
        ARGON2_PARALLELISM,
        Some(ARGON2_OUTPUT_LEN),
    )
    .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut output = Zeroizing::new([0u8; 32]);
    argon2
        .hash_password_into(key.as_bytes(), salt, &mut output[..])
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;

    Ok(output)
}

/// Keep unrecognised version tags short in error messages.
fn truncate(s: &str) -> String {
    s.chars().take(8).collect()
}
