//! Transaction building for the custodial anchor.
//!
//! Operation types:
//! - **CreateAccount**: fund a new ledger account with native currency
//! - **ChangeTrust**: open a trustline to the custom asset
//! - **AllowTrust**: issuer authorizes (or revokes) a trustline
//! - **SetSignerWeights**: add operational signers, set master weight and thresholds
//! - **Payment**: move the custom asset between accounts
//!
//! [`build`] turns freshly loaded account state plus an ordered operation list
//! into a [`TransactionEnvelope`]; the envelope is hashed and signed against an
//! explicit [`anchor_types::NetworkId`].

pub mod builder;
pub mod envelope;
pub mod error;
pub mod memo;
pub mod operation;
pub mod state;
mod xdr;

pub use builder::{build, MAX_OPERATIONS};
pub use envelope::{DecoratedSignature, TransactionEnvelope};
pub use error::BuildError;
pub use memo::Memo;
pub use operation::{Operation, SignerWeight};
pub use state::{AccountSigner, Balance, LedgerAccountState, Thresholds};
