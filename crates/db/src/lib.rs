//! Database layer and ledger engine.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Stores for lots, wallets, transactions and users
//! - The [`LedgerService`] that runs exchanges, sweeps and issuance atomically
//! - Database migrations

pub mod entities;
pub mod ledger;
pub mod migration;
pub mod repositories;

pub use ledger::{Issuance, LedgerService, LedgerServiceError};
pub use repositories::UserRepository;

use std::time::Duration;

use lets_shared::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}

/// Establishes a pooled connection sized from `config`.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect_with(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    Database::connect(options).await
}
