//! Token ledger domain logic.
//!
//! - Lot, wallet and transaction types
//! - FIFO-by-expiry consumption selector
//! - Read-time balance projection
//! - Exchange quoting and negative-balance eligibility
//! - Expiry selection for the sweep

pub mod balance;
pub mod eligibility;
pub mod error;
pub mod exchange;
pub mod expiry;
pub mod fifo;
pub mod record;
pub mod settings;
pub mod types;

#[cfg(test)]
mod balance_props;
#[cfg(test)]
mod fifo_props;

pub use balance::{BalanceReport, LotBalanceSummary, TypeBalance, WalletBalance, days_to_expiry};
pub use eligibility::{
    AccountStanding, Eligibility, EligibilityPolicy, EligibilityReport, ThresholdPolicy,
    account_age_days,
};
pub use error::{EntityKind, LedgerError};
pub use exchange::{ExchangeQuote, quote_exchange, requires_credit, validate_amount};
pub use expiry::{BatchSweepReport, SweepOutcome, select_expired};
pub use fifo::{ConsumptionPlan, LotDeduction, plan_consumption};
pub use record::{
    ConsumedLot, Direction, HistoryEntry, LedgerTransaction, TransactionKind, TransactionMetadata,
    exchange_description, expiry_description, issuance_description,
};
pub use settings::LedgerSettings;
pub use types::{LotSource, LotStatus, TokenLot, TokenType, Wallet, active_total};
