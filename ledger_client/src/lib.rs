//! Ledger client adapter.
//!
//! [`LedgerClient`] is the seam between workflows and the ledger: load an
//! account's current state, submit a signed envelope. [`HorizonClient`] talks
//! to a Horizon server over HTTP; tests use the in-memory ledger from the
//! nullables crate.

pub mod client;
pub mod error;
pub mod horizon;

pub use client::{LedgerClient, SettlementResult};
pub use error::{LedgerError, RejectionReason};
pub use horizon::HorizonClient;
