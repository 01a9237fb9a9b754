//! Shared types, errors, and configuration for the LETS ledger.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Currencies and amount precision
//! - Caller-facing error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, DatabaseConfig, EligibilityConfig, LedgerConfig, SweeperConfig};
pub use error::AppError;
