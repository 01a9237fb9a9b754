//! Expiry selection for the sweep.

use chrono::{DateTime, Utc};
use lets_shared::types::LotId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::{TokenLot, TokenType};

/// Lots a sweep at `now` retires: active, matching the type filter, with an
/// expiry at or before `now`.
#[must_use]
pub fn select_expired(
    lots: &[TokenLot],
    now: DateTime<Utc>,
    token_type: Option<TokenType>,
) -> Vec<&TokenLot> {
    lots.iter()
        .filter(|lot| lot.is_active() && lot.is_expired_at(now))
        .filter(|lot| token_type.is_none_or(|t| lot.token_type == t))
        .collect()
}

/// Result of sweeping one member.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepOutcome {
    /// Number of lots retired.
    pub expired_count: u64,
    /// Sum of their amounts.
    pub total_expired_amount: Decimal,
    /// IDs of the retired lots.
    pub lot_ids: Vec<LotId>,
}

impl SweepOutcome {
    /// Builds the outcome for a set of selected lots.
    #[must_use]
    pub fn from_lots(lots: &[&TokenLot]) -> Self {
        Self {
            expired_count: lots.len() as u64,
            total_expired_amount: lots.iter().map(|lot| lot.amount).sum(),
            lot_ids: lots.iter().map(|lot| lot.id).collect(),
        }
    }

    /// Returns true if nothing was retired.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.expired_count == 0
    }
}

/// Aggregate of a sweep over every member with due lots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSweepReport {
    /// Members that had at least one lot retired.
    pub users_swept: u64,
    /// Lots retired across all members.
    pub expired_count: u64,
    /// Amount retired across all members.
    pub total_expired_amount: Decimal,
    /// Members whose sweep failed and was rolled back.
    pub failures: u64,
}

impl BatchSweepReport {
    /// Folds one member's outcome into the report.
    pub fn record(&mut self, outcome: &SweepOutcome) {
        if outcome.is_empty() {
            return;
        }
        self.users_swept += 1;
        self.expired_count += outcome.expired_count;
        self.total_expired_amount += outcome.total_expired_amount;
    }

    /// Counts a failed member sweep.
    pub fn record_failure(&mut self) {
        self.failures += 1;
    }
}
