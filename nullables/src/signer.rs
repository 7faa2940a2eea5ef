//! Nullable signer custody: deterministic role keys held in memory.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anchor_crypto::{account_id, keypair_from_seed};
use anchor_custody::{CryptoError, CustodyError, SignerResolver, SignerRole};
use anchor_types::{AccountId, KeyPair};

/// Role keys derived from fixed seeds, with per-role failure switches.
pub struct NullSignerResolver {
    seeds: HashMap<SignerRole, [u8; 32]>,
    broken: Mutex<HashSet<SignerRole>>,
    resolves: AtomicUsize,
}

impl NullSignerResolver {
    pub fn new() -> Self {
        let seeds = SignerRole::ALL
            .iter()
            .enumerate()
            .map(|(i, role)| (*role, [0xA0 + i as u8; 32]))
            .collect();
        Self {
            seeds,
            broken: Mutex::new(HashSet::new()),
            resolves: AtomicUsize::new(0),
        }
    }

    /// A fresh copy of a role's keypair, for test setup and assertions.
    pub fn keypair(&self, role: SignerRole) -> KeyPair {
        keypair_from_seed(&self.seeds[&role])
    }

    pub fn id(&self, role: SignerRole) -> AccountId {
        account_id(&self.keypair(role).public)
    }

    /// Make `resolve` fail for a role as if its sealed key could not be opened.
    pub fn break_role(&self, role: SignerRole) {
        self.broken.lock().unwrap().insert(role);
    }

    pub fn resolve_calls(&self) -> usize {
        self.resolves.load(Ordering::SeqCst)
    }
}

impl Default for NullSignerResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SignerResolver for NullSignerResolver {
    fn account_id(&self, role: SignerRole) -> Result<AccountId, CustodyError> {
        Ok(self.id(role))
    }

    fn resolve(&self, role: SignerRole) -> Result<KeyPair, CustodyError> {
        self.resolves.fetch_add(1, Ordering::SeqCst);
        if self.broken.lock().unwrap().contains(&role) {
            return Err(CryptoError::DecryptionFailed.into());
        }
        Ok(self.keypair(role))
    }
}
