//! Persistence-backed ledger engine.

pub mod error;
pub mod service;

pub use error::LedgerServiceError;
pub use service::{Issuance, LedgerService};
