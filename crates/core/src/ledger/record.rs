//! Append-only transaction records and their tagged metadata.

use chrono::{DateTime, Utc};
use lets_shared::types::{Currency, LotId, TransactionId, UserId, WalletId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::fifo::ConsumptionPlan;
use super::types::{LotSource, TokenType};

/// Origin tag stored on exchanges started by a member.
pub const USER_INITIATED: &str = "user_initiated";

/// Kind of ledger event a transaction records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    /// Member-to-member exchange.
    Exchange,
    /// Expiry sweep.
    Expire,
    /// Issuance or other administrative credit.
    Adjustment,
}

impl TransactionKind {
    /// Stored name of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exchange => "EXCHANGE",
            Self::Expire => "EXPIRE",
            Self::Adjustment => "ADJUSTMENT",
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One lot deduction as recorded on an exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumedLot {
    /// Lot deducted from.
    pub lot_id: LotId,
    /// Amount taken.
    pub amount: Decimal,
    /// Whether the lot was drained.
    pub fully_consumed: bool,
}

/// Typed metadata, serialized with a `type` discriminator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum TransactionMetadata {
    /// Member-to-member exchange.
    Exchange {
        /// Who started the exchange.
        source: String,
        /// Lots drawn from the payer, in consumption order.
        consumed_lots: Vec<ConsumedLot>,
        /// Lot minted for the payee.
        minted_lot: LotId,
        /// Part of the amount not backed by lots.
        credit_drawn: Decimal,
    },
    /// Expiry sweep.
    Expire {
        /// Lots retired.
        lot_ids: Vec<LotId>,
    },
    /// Issuance.
    Adjustment {
        /// Lot minted.
        lot_id: LotId,
        /// Its token type.
        token_type: TokenType,
        /// Its provenance.
        lot_source: LotSource,
    },
}

impl TransactionMetadata {
    /// Metadata for a member-initiated exchange.
    #[must_use]
    pub fn exchange(plan: &ConsumptionPlan, minted_lot: LotId, credit_drawn: Decimal) -> Self {
        Self::Exchange {
            source: USER_INITIATED.to_string(),
            consumed_lots: plan
                .deductions
                .iter()
                .map(|d| ConsumedLot {
                    lot_id: d.lot_id,
                    amount: d.amount_to_deduct,
                    fully_consumed: d.fully_consumed,
                })
                .collect(),
            minted_lot,
            credit_drawn,
        }
    }

    /// Kind of the record this metadata belongs to.
    #[must_use]
    pub const fn kind(&self) -> TransactionKind {
        match self {
            Self::Exchange { .. } => TransactionKind::Exchange,
            Self::Expire { .. } => TransactionKind::Expire,
            Self::Adjustment { .. } => TransactionKind::Adjustment,
        }
    }
}

/// Default description of an exchange.
#[must_use]
pub fn exchange_description(amount: Decimal) -> String {
    format!("LETS exchange of {} Ünits", amount.normalize())
}

/// Description of an expiry sweep.
#[must_use]
pub fn expiry_description(lot_count: u64) -> String {
    format!("Automatic expiry of {lot_count} lots")
}

/// Description of an issuance.
#[must_use]
pub fn issuance_description(amount: Decimal, token_type: TokenType) -> String {
    format!("Issued {} Ünits ({token_type})", amount.normalize())
}

/// A committed ledger transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerTransaction {
    /// Transaction ID.
    pub id: TransactionId,
    /// Sender.
    pub from_user_id: UserId,
    /// Receiver.
    pub to_user_id: UserId,
    /// Sender wallet.
    pub from_wallet_id: WalletId,
    /// Receiver wallet.
    pub to_wallet_id: WalletId,
    /// Amount moved.
    pub amount: Decimal,
    /// Currency.
    pub currency: Currency,
    /// Free-text description.
    pub description: String,
    /// Typed metadata.
    pub metadata: TransactionMetadata,
    /// Commit instant.
    pub created_at: DateTime<Utc>,
}

impl LedgerTransaction {
    /// Kind of the record.
    #[must_use]
    pub const fn kind(&self) -> TransactionKind {
        self.metadata.kind()
    }

    /// Direction of the record from `user_id`'s point of view.
    ///
    /// Self-directed records (sweeps, issuance) count as outgoing.
    #[must_use]
    pub fn direction_for(&self, user_id: UserId) -> Direction {
        if self.from_user_id == user_id {
            Direction::Outgoing
        } else {
            Direction::Incoming
        }
    }
}

/// Direction of a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    /// The member received the amount.
    Incoming,
    /// The member sent the amount.
    Outgoing,
}

/// A transaction seen from one member's side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Direction for the member.
    pub direction: Direction,
    /// The record.
    pub transaction: LedgerTransaction,
}

impl HistoryEntry {
    /// Tags `transaction` for `user_id`.
    #[must_use]
    pub fn for_user(user_id: UserId, transaction: LedgerTransaction) -> Self {
        Self {
            direction: transaction.direction_for(user_id),
            transaction,
        }
    }
}
