//! Errors raised by the persistence-backed ledger.

use lets_core::ledger::LedgerError;
use lets_shared::AppError;
use sea_orm::DbErr;
use thiserror::Error;

/// Ledger domain failure or store failure.
#[derive(Debug, Error)]
pub enum LedgerServiceError {
    /// Domain rule rejected the operation.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl LedgerServiceError {
    /// Returns the stable error code for this error.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Ledger(err) => err.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the domain error, if this is one.
    #[must_use]
    pub const fn as_ledger(&self) -> Option<&LedgerError> {
        match self {
            Self::Ledger(err) => Some(err),
            Self::Database(_) => None,
        }
    }
}

impl From<LedgerServiceError> for AppError {
    fn from(err: LedgerServiceError) -> Self {
        match err {
            LedgerServiceError::Ledger(inner) => match inner {
                LedgerError::NotFound { .. } => Self::NotFound(inner.to_string()),
                LedgerError::InvalidAmount { .. } => Self::Validation(inner.to_string()),
                LedgerError::MissingWallet(_)
                | LedgerError::InsufficientBalance { .. }
                | LedgerError::SelfExchange(_) => Self::BusinessRule(inner.to_string()),
                LedgerError::Shortfall { .. } => Self::Internal(inner.to_string()),
            },
            LedgerServiceError::Database(db) => Self::Database(db.to_string()),
        }
    }
}
