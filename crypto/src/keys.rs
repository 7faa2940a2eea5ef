//! Ed25519 key generation.

use anchor_types::{KeyPair, PrivateKey, PublicKey};
use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;

use crate::address::{decode_secret_seed, StrKeyError};

/// Generate a new Ed25519 key pair from the operating system's CSPRNG.
///
/// Entropy failure aborts inside `OsRng`; there is no recoverable error path.
pub fn generate_keypair() -> KeyPair {
    let signing_key = SigningKey::generate(&mut OsRng);
    let verifying_key = signing_key.verifying_key();
    KeyPair {
        public: PublicKey(verifying_key.to_bytes()),
        private: PrivateKey(signing_key.to_bytes()),
    }
}

/// Derive the public key from a private key.
pub fn public_from_private(private: &PrivateKey) -> PublicKey {
    let signing_key = SigningKey::from_bytes(&private.0);
    PublicKey(signing_key.verifying_key().to_bytes())
}

/// Derive a key pair from a 32-byte seed (deterministic).
pub fn keypair_from_seed(seed: &[u8; 32]) -> KeyPair {
    let private = PrivateKey(*seed);
    let public = public_from_private(&private);
    KeyPair { public, private }
}

/// Rebuild a key pair from an `S…` secret string.
pub fn keypair_from_secret(secret: &str) -> Result<KeyPair, StrKeyError> {
    let seed = decode_secret_seed(secret)?;
    Ok(keypair_from_seed(&seed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::{account_id, encode_secret_seed};

    #[test]
    fn generate_produces_valid_keypair() {
        let kp = generate_keypair();
        assert_ne!(kp.public.0, [0u8; 32]);
        assert_ne!(kp.private.0, [0u8; 32]);
    }

    #[test]
    fn public_from_private_is_deterministic() {
        let kp = generate_keypair();
        assert_eq!(kp.public, public_from_private(&kp.private));
    }

    #[test]
    fn different_seeds_produce_different_keys() {
        let kp1 = keypair_from_seed(&[1u8; 32]);
        let kp2 = keypair_from_seed(&[2u8; 32]);
        assert_ne!(kp1.public, kp2.public);
    }

    #[test]
    fn secret_string_roundtrip() {
        let kp = generate_keypair();
        let secret = encode_secret_seed(&kp.private.0);
        let restored = keypair_from_secret(&secret).unwrap();
        assert_eq!(restored.public, kp.public);
    }

    #[test]
    fn known_secret_derives_known_account() {
        let kp =
            keypair_from_secret("SBYZ5NEJ34Y3FTKADVBO3Y76U6VLTREJSW4MXYCVMUBTL2K3V4Y644UX").unwrap();
        assert_eq!(
            account_id(&kp.public).as_str(),
            "GBX67BEOABQAELIP2XTC6JXHJPASKYCIQNS7WF6GWPSCBEAJEK74HK36"
        );
    }

    #[test]
    fn account_id_is_not_a_secret() {
        assert!(keypair_from_secret("GBX67BEOABQAELIP2XTC6JXHJPASKYCIQNS7WF6GWPSCBEAJEK74HK36")
            .is_err());
    }
}
