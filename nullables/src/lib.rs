//! Nullable infrastructure for deterministic testing.
//!
//! Every external dependency of the workflows (ledger, account store, signer
//! custody) sits behind a trait. This crate provides implementations that:
//! - Keep all state in memory and never touch the filesystem or network
//! - Enforce the same rules the real backends do (sequence numbers, signer
//!   weights, trustlines, duplicate usernames)
//! - Count calls and accept injected failures so tests can assert on both
//!
//! Usage: swap real implementations for nullables in tests.

pub mod ledger;
pub mod signer;
pub mod store;

pub use ledger::NullLedger;
pub use signer::NullSignerResolver;
pub use store::NullAccountStore;
