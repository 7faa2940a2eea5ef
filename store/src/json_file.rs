//! Account records persisted as a single JSON document.
//!
//! The whole map is held in memory behind a mutex and rewritten on every
//! insert: serialize to `<path>.tmp`, fsync, rename over the original. A crash
//! mid-write leaves the previous file intact. The temp file is owner-only from
//! the moment it is opened, since it holds sealed seeds.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::account::{AccountRecord, AccountStore};
use crate::error::StoreError;

pub struct JsonFileStore {
    path: PathBuf,
    records: Mutex<BTreeMap<String, AccountRecord>>,
}

impl JsonFileStore {
    /// Open the store at `path`, starting empty if the file does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let records = if path.exists() {
            let raw = fs::read_to_string(&path)
                .map_err(|e| StoreError::Backend(format!("read {}: {e}", path.display())))?;
            let list: Vec<AccountRecord> = serde_json::from_str(&raw)
                .map_err(|e| StoreError::Serialization(format!("{}: {e}", path.display())))?;
            list.into_iter().map(|r| (r.username.clone(), r)).collect()
        } else {
            BTreeMap::new()
        };
        tracing::debug!(path = %path.display(), records = records.len(), "opened account store");
        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<String, AccountRecord>>, StoreError> {
        self.records
            .lock()
            .map_err(|_| StoreError::Backend("account store lock poisoned".into()))
    }

    fn persist(&self, records: &BTreeMap<String, AccountRecord>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(backend)?;
            }
        }

        let list: Vec<&AccountRecord> = records.values().collect();
        let json = serde_json::to_string_pretty(&list)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let temp_path = self.path.with_extension("tmp");
        let mut file = open_private(&temp_path).map_err(backend)?;
        file.write_all(json.as_bytes()).map_err(backend)?;
        file.sync_all().map_err(backend)?;
        drop(file);
        fs::rename(&temp_path, &self.path).map_err(backend)?;
        Ok(())
    }
}

/// Open `path` for writing, truncated, readable by the owner only.
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let file = options.open(path)?;
    // `mode` only applies on creation; a leftover temp file keeps its bits.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }
    Ok(file)
}

fn backend(e: std::io::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

impl AccountStore for JsonFileStore {
    fn find_by_reference(&self, username: &str) -> Result<Option<AccountRecord>, StoreError> {
        Ok(self.lock()?.get(username).cloned())
    }

    fn find_many_by_references(
        &self,
        usernames: &[&str],
    ) -> Result<Vec<AccountRecord>, StoreError> {
        let records = self.lock()?;
        Ok(usernames
            .iter()
            .filter_map(|name| records.get(*name).cloned())
            .collect())
    }

    fn create(&self, record: &AccountRecord) -> Result<(), StoreError> {
        let mut records = self.lock()?;
        if records.contains_key(&record.username) {
            return Err(StoreError::Duplicate(record.username.clone()));
        }
        records.insert(record.username.clone(), record.clone());
        if let Err(e) = self.persist(&records) {
            records.remove(&record.username);
            return Err(e);
        }
        tracing::info!(
            username = %record.username,
            account = %record.account_id,
            "account record created"
        );
        Ok(())
    }
}
