//! Storage for custodial account records.
//!
//! Every backend (JSON file, in-memory for testing) implements
//! [`AccountStore`]. The rest of the codebase depends only on the trait.

pub mod account;
pub mod error;
pub mod json_file;

pub use account::{AccountRecord, AccountStore};
pub use error::StoreError;
pub use json_file::JsonFileStore;
