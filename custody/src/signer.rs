//! Operational signing keys, resolved by role.
//!
//! Workflows never hold provisioner, issuer or operational signer keys in
//! source or configuration as plaintext. They ask a [`SignerResolver`] for the
//! keypair of a role at the moment of signing and drop it straight after.

use anchor_crypto::{account_id, parse_account_id};
use anchor_types::{AccountId, KeyPair};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::{CryptoError, CustodyError};
use crate::key::EncryptionKey;
use crate::keystore::unseal_keypair;

/// The custodial roles that hold signing authority.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignerRole {
    /// Funds `CreateAccount` operations with native currency.
    Provisioner,
    /// Issues the custom asset and authorizes trustlines.
    Issuer,
    /// Signs payments on behalf of custodial accounts (medium threshold).
    PaymentSigner,
    /// Holds high-threshold weight on custodial accounts.
    AdminSigner,
}

impl SignerRole {
    pub const ALL: [SignerRole; 4] = [
        Self::Provisioner,
        Self::Issuer,
        Self::PaymentSigner,
        Self::AdminSigner,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Provisioner => "provisioner",
            Self::Issuer => "issuer",
            Self::PaymentSigner => "payment_signer",
            Self::AdminSigner => "admin_signer",
        }
    }
}

impl fmt::Display for SignerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability to obtain the signing keypair for a role.
pub trait SignerResolver: Send + Sync {
    /// The public account id of a role. Never touches secret material.
    fn account_id(&self, role: SignerRole) -> Result<AccountId, CustodyError>;

    /// Decrypt and return the keypair for a role.
    fn resolve(&self, role: SignerRole) -> Result<KeyPair, CustodyError>;
}

/// A role's key as it sits in configuration: public id plus sealed seed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SealedSigner {
    pub role: SignerRole,
    pub account_id: AccountId,
    /// Output of `seal_keypair` under the process encryption key.
    pub sealed_seed: String,
}

/// Resolver backed by sealed seeds held in memory; plaintext exists only
/// inside `resolve` and in the returned keypair.
pub struct SealedSignerResolver {
    key: EncryptionKey,
    signers: HashMap<SignerRole, SealedSigner>,
}

impl SealedSignerResolver {
    /// Build a resolver, rejecting account ids that fail checksum validation.
    pub fn new(
        key: EncryptionKey,
        signers: impl IntoIterator<Item = SealedSigner>,
    ) -> Result<Self, CustodyError> {
        let mut map = HashMap::new();
        for signer in signers {
            parse_account_id(signer.account_id.as_str()).map_err(|e| {
                CryptoError::InvalidKey(format!("{} account id: {e}", signer.role))
            })?;
            map.insert(signer.role, signer);
        }
        Ok(Self { key, signers: map })
    }

    fn sealed(&self, role: SignerRole) -> Result<&SealedSigner, CustodyError> {
        self.signers
            .get(&role)
            .ok_or(CustodyError::MissingSigner(role))
    }
}

impl SignerResolver for SealedSignerResolver {
    fn account_id(&self, role: SignerRole) -> Result<AccountId, CustodyError> {
        Ok(self.sealed(role)?.account_id.clone())
    }

    fn resolve(&self, role: SignerRole) -> Result<KeyPair, CustodyError> {
        let sealed = self.sealed(role)?;
        let keypair = unseal_keypair(&sealed.sealed_seed, &self.key).map_err(|e| {
            tracing::warn!(role = %role, error = %e, "failed to unseal signer key");
            e
        })?;
        if account_id(&keypair.public) != sealed.account_id {
            return Err(CryptoError::KeyMismatch { role }.into());
        }
        Ok(keypair)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keystore::{new_account_keypair, seal_keypair};

    fn key(s: &str) -> EncryptionKey {
        EncryptionKey::new(s.as_bytes().to_vec()).unwrap()
    }

    fn sealed_signer(role: SignerRole, kp: &KeyPair, k: &EncryptionKey) -> SealedSigner {
        SealedSigner {
            role,
            account_id: account_id(&kp.public),
            sealed_seed: seal_keypair(kp, k).unwrap(),
        }
    }

    #[test]
    fn resolves_configured_role() {
        let k = key("resolver-test-key-0001");
        let kp = new_account_keypair();
        let resolver =
            SealedSignerResolver::new(k.clone(), [sealed_signer(SignerRole::Issuer, &kp, &k)])
                .unwrap();

        let resolved = resolver.resolve(SignerRole::Issuer).unwrap();
        assert_eq!(resolved.public, kp.public);
        assert_eq!(
            resolver.account_id(SignerRole::Issuer).unwrap(),
            account_id(&kp.public)
        );
    }

    #[test]
    fn missing_role_is_reported() {
        let resolver = SealedSignerResolver::new(key("resolver-test-key-0001"), Vec::new()).unwrap();
        assert!(matches!(
            resolver.resolve(SignerRole::PaymentSigner),
            Err(CustodyError::MissingSigner(SignerRole::PaymentSigner))
        ));
    }

    #[test]
    fn wrong_process_key_is_a_crypto_error() {
        let sealing_key = key("resolver-test-key-0001");
        let kp = new_account_keypair();
        let signer = sealed_signer(SignerRole::Issuer, &kp, &sealing_key);
        let resolver =
            SealedSignerResolver::new(key("resolver-test-key-0002"), [signer]).unwrap();

        assert!(matches!(
            resolver.resolve(SignerRole::Issuer),
            Err(CustodyError::Crypto(CryptoError::DecryptionFailed))
        ));
        // The public id is still available without decrypting anything.
        assert!(resolver.account_id(SignerRole::Issuer).is_ok());
    }

    #[test]
    fn mismatched_account_id_is_rejected() {
        let k = key("resolver-test-key-0001");
        let kp = new_account_keypair();
        let other = new_account_keypair();
        let mut signer = sealed_signer(SignerRole::AdminSigner, &kp, &k);
        signer.account_id = account_id(&other.public);
        let resolver = SealedSignerResolver::new(k, [signer]).unwrap();

        assert!(matches!(
            resolver.resolve(SignerRole::AdminSigner),
            Err(CustodyError::Crypto(CryptoError::KeyMismatch { .. }))
        ));
    }

    #[test]
    fn invalid_account_id_rejected_at_construction() {
        let k = key("resolver-test-key-0001");
        let kp = new_account_keypair();
        let mut signer = sealed_signer(SignerRole::Issuer, &kp, &k);
        signer.account_id = AccountId::new("GNOTANACCOUNT");
        assert!(SealedSignerResolver::new(k, [signer]).is_err());
    }
}
