//! Nullable account store: thread-safe in-memory storage for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use anchor_store::{AccountRecord, AccountStore, StoreError};

/// An in-memory account record store for testing.
/// Thread-safe for use with tokio's multi-threaded runtime.
pub struct NullAccountStore {
    records: Mutex<HashMap<String, AccountRecord>>,
    fail_writes: AtomicBool,
}

impl NullAccountStore {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Make every subsequent `create` fail with a backend error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for NullAccountStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AccountStore for NullAccountStore {
    fn find_by_reference(&self, username: &str) -> Result<Option<AccountRecord>, StoreError> {
        Ok(self.records.lock().unwrap().get(username).cloned())
    }

    fn find_many_by_references(
        &self,
        usernames: &[&str],
    ) -> Result<Vec<AccountRecord>, StoreError> {
        let records = self.records.lock().unwrap();
        Ok(usernames
            .iter()
            .filter_map(|name| records.get(*name).cloned())
            .collect())
    }

    fn create(&self, record: &AccountRecord) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("null store write failure".into()));
        }
        let mut records = self.records.lock().unwrap();
        if records.contains_key(&record.username) {
            return Err(StoreError::Duplicate(record.username.clone()));
        }
        records.insert(record.username.clone(), record.clone());
        Ok(())
    }
}
