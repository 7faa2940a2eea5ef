//! Shared utilities for the custodial anchor.

pub mod logging;

pub use logging::{init_logging, LogFormat, LoggingError};
