//! Account record storage trait.

use crate::StoreError;
use anchor_types::AccountId;
use serde::{Deserialize, Serialize};

/// The anchor's record of a custodial account, keyed by application username.
///
/// `sealed_seed` is the encrypted secret seed; plaintext seeds are never stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub username: String,
    pub account_id: AccountId,
    pub sealed_seed: String,
}

/// Trait for account record storage.
pub trait AccountStore: Send + Sync {
    fn find_by_reference(&self, username: &str) -> Result<Option<AccountRecord>, StoreError>;

    /// Records for every username that exists; unknown names are skipped.
    fn find_many_by_references(
        &self,
        usernames: &[&str],
    ) -> Result<Vec<AccountRecord>, StoreError>;

    /// Insert a new record. Fails with `Duplicate` if the username is taken.
    fn create(&self, record: &AccountRecord) -> Result<(), StoreError>;

    fn exists(&self, username: &str) -> Result<bool, StoreError> {
        self.find_by_reference(username).map(|r| r.is_some())
    }
}
