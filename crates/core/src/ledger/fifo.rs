//! FIFO-by-expiry consumption selector.
//!
//! Given a payer's active lots and the amount to cover, builds the ordered
//! plan of deductions: soonest-to-expire lots first, never-expiring lots last,
//! creation order breaking ties. Every lot in the plan is fully consumed
//! except possibly the last one.

use std::cmp::Ordering;

use lets_shared::types::LotId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::LedgerError;
use super::types::TokenLot;

/// One step of a consumption plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotDeduction {
    /// Lot to deduct from.
    pub lot_id: LotId,
    /// Amount taken from the lot.
    pub amount_to_deduct: Decimal,
    /// Amount the lot keeps afterwards.
    pub remaining: Decimal,
    /// True if the lot is drained and becomes `USED`.
    pub fully_consumed: bool,
}

/// Ordered deductions covering a required amount.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumptionPlan {
    /// Deductions in the order they apply.
    pub deductions: Vec<LotDeduction>,
}

impl ConsumptionPlan {
    /// Total amount deducted by the plan.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.deductions.iter().map(|d| d.amount_to_deduct).sum()
    }

    /// Lots the plan drains completely.
    pub fn consumed_lots(&self) -> impl Iterator<Item = LotId> + '_ {
        self.deductions
            .iter()
            .filter(|d| d.fully_consumed)
            .map(|d| d.lot_id)
    }

    /// Returns true if the plan touches no lot.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deductions.is_empty()
    }
}

/// Orders two lots by expiry, lots without expiry last.
fn expiry_order(a: &TokenLot, b: &TokenLot) -> Ordering {
    match (a.expires_at, b.expires_at) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Builds the consumption plan for `required` out of `lots`.
///
/// Only active lots with a positive amount are considered. A `required` of
/// zero yields an empty plan.
///
/// # Errors
///
/// Returns `InvalidAmount` for a negative `required` and `Shortfall` when the
/// candidate lots sum to less than `required`.
pub fn plan_consumption(
    lots: &[TokenLot],
    required: Decimal,
) -> Result<ConsumptionPlan, LedgerError> {
    if required < Decimal::ZERO {
        return Err(LedgerError::invalid_amount(
            required,
            "consumption cannot be negative",
        ));
    }

    let mut candidates: Vec<&TokenLot> = lots
        .iter()
        .filter(|lot| lot.is_active() && lot.amount > Decimal::ZERO)
        .collect();

    let covered: Decimal = candidates.iter().map(|lot| lot.amount).sum();
    if covered < required {
        return Err(LedgerError::Shortfall { required, covered });
    }

    candidates.sort_by(|a, b| expiry_order(a, b).then_with(|| a.created_at.cmp(&b.created_at)));

    let mut outstanding = required;
    let mut deductions = Vec::new();

    for lot in candidates {
        if outstanding <= Decimal::ZERO {
            break;
        }

        let amount_to_deduct = lot.amount.min(outstanding);
        let remaining = lot.amount - amount_to_deduct;
        deductions.push(LotDeduction {
            lot_id: lot.id,
            amount_to_deduct,
            remaining,
            fully_consumed: remaining.is_zero(),
        });
        outstanding -= amount_to_deduct;
    }

    Ok(ConsumptionPlan { deductions })
}
