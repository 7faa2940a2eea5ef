//! Provisioning and payment workflows for the custodial anchor.
//!
//! - [`Provisioner`]: onboard a username onto the ledger, step by step
//! - [`Payments`]: transfer, credit and debit the custom asset
//! - [`Anchor`]: the request-facing surface over both
//!
//! All collaborators arrive through [`Services`]: ledger client, account store,
//! signer resolver, encryption key. Workflows hold no state between calls.

pub mod anchor;
pub mod config;
pub mod deadline;
pub mod error;
mod execute;
pub mod payments;
pub mod provisioning;
pub mod services;

pub use anchor::Anchor;
pub use config::AnchorConfig;
pub use deadline::Deadline;
pub use error::{ErrorClass, WorkflowError};
pub use payments::Payments;
pub use provisioning::{ProvisioningReport, ProvisioningState, Provisioner};
pub use services::{Services, WorkflowSettings};
