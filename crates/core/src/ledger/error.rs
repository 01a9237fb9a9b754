//! Ledger error types.
//!
//! All errors a ledger operation can raise before touching storage. Any of
//! them aborts the surrounding database transaction unchanged.

use lets_shared::types::UserId;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Which kind of record a lookup failed to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// A community member.
    User,
    /// A member wallet.
    Wallet,
    /// A token lot.
    Lot,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "User"),
            Self::Wallet => write!(f, "Wallet"),
            Self::Lot => write!(f, "Lot"),
        }
    }
}

/// Errors that can occur during ledger operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// Unknown user, wallet or lot.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Kind of record.
        kind: EntityKind,
        /// The ID that was looked up.
        id: Uuid,
    },

    /// The user exists but owns no wallet.
    #[error("User {0} has no wallet")]
    MissingWallet(UserId),

    /// Zero, negative or over-precise amount, or a reduction below zero.
    #[error("Invalid amount {amount}: {reason}")]
    InvalidAmount {
        /// The offending amount.
        amount: Decimal,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// Lots plus negative-balance allowance cannot cover the request.
    #[error(
        "Insufficient balance: requested {requested}, available {available}, credit allowance {allowance}"
    )]
    InsufficientBalance {
        /// Amount requested.
        requested: Decimal,
        /// Active lot total.
        available: Decimal,
        /// Negative-balance allowance granted by the eligibility policy.
        allowance: Decimal,
    },

    /// The consumption selector could not assemble enough lots.
    #[error("Lot shortfall: required {required}, lots cover {covered}")]
    Shortfall {
        /// Amount the plan had to cover.
        required: Decimal,
        /// Sum of the candidate lots.
        covered: Decimal,
    },

    /// Payer and payee are the same member.
    #[error("User {0} cannot exchange with themselves")]
    SelfExchange(UserId),
}

impl LedgerError {
    /// Shorthand for a missing user.
    #[must_use]
    pub fn user_not_found(id: impl Into<Uuid>) -> Self {
        Self::NotFound {
            kind: EntityKind::User,
            id: id.into(),
        }
    }

    /// Shorthand for a missing lot.
    #[must_use]
    pub fn lot_not_found(id: impl Into<Uuid>) -> Self {
        Self::NotFound {
            kind: EntityKind::Lot,
            id: id.into(),
        }
    }

    /// Shorthand for an invalid amount.
    #[must_use]
    pub const fn invalid_amount(amount: Decimal, reason: &'static str) -> Self {
        Self::InvalidAmount { amount, reason }
    }

    /// Returns the stable error code for this error.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::MissingWallet(_) => "MISSING_WALLET",
            Self::InvalidAmount { .. } => "INVALID_AMOUNT",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Self::Shortfall { .. } => "LOT_SHORTFALL",
            Self::SelfExchange(_) => "SELF_EXCHANGE",
        }
    }

    /// Returns true if the error signals a broken internal invariant rather
    /// than a bad request.
    #[must_use]
    pub const fn is_invariant_violation(&self) -> bool {
        matches!(self, Self::Shortfall { .. })
    }
}
