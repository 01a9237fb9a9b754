//! Exchange quoting.
//!
//! Decides, from the payer's active lots and cached wallet balance, whether an
//! exchange may proceed and which lots it consumes. The persistence layer
//! applies the resulting quote inside one database transaction.

use lets_shared::types::{is_representable, is_within_range};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::eligibility::Eligibility;
use super::error::LedgerError;
use super::fifo::{ConsumptionPlan, plan_consumption};
use super::types::{TokenLot, active_total};

/// Checks that `amount` is positive and fits the ledger's precision and
/// range.
///
/// # Errors
///
/// Returns `InvalidAmount` otherwise.
pub fn validate_amount(amount: Decimal) -> Result<(), LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::invalid_amount(amount, "must be positive"));
    }
    if !is_representable(amount) {
        return Err(LedgerError::invalid_amount(
            amount,
            "more than four decimal places",
        ));
    }
    if !is_within_range(amount) {
        return Err(LedgerError::invalid_amount(amount, "exceeds the largest storable amount"));
    }
    Ok(())
}

/// Returns true if `lots` cannot cover `amount` on their own, meaning the
/// eligibility policy has to be consulted.
#[must_use]
pub fn requires_credit(lots: &[TokenLot], amount: Decimal) -> bool {
    active_total(lots) < amount
}

/// An approved exchange, ready to apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeQuote {
    /// Amount moved.
    pub amount: Decimal,
    /// Payer's active lot total before the exchange.
    pub available: Decimal,
    /// Lot deductions covering the lot-backed part.
    pub consumption: ConsumptionPlan,
    /// Part of `amount` drawn from the payer's negative-balance allowance.
    pub credit_drawn: Decimal,
}

impl ExchangeQuote {
    /// Payer's wallet balance once the quote is applied.
    #[must_use]
    pub fn payer_balance_after(&self, wallet_balance: Decimal) -> Decimal {
        wallet_balance - self.amount
    }

    /// Returns true if part of the amount is not backed by lots.
    #[must_use]
    pub fn draws_credit(&self) -> bool {
        self.credit_drawn > Decimal::ZERO
    }
}

/// Quotes an exchange of `amount` paid out of `lots`.
///
/// `eligibility` is only read when the lots fall short; pass `None` when
/// [`requires_credit`] is false. A shortfall is allowed when the payer is
/// eligible, the gap fits the allowance, and the wallet stays at or above
/// the floor.
///
/// # Errors
///
/// Returns `InvalidAmount` for a bad amount and `InsufficientBalance` when
/// neither lots nor credit can cover it.
pub fn quote_exchange(
    lots: &[TokenLot],
    wallet_balance: Decimal,
    amount: Decimal,
    eligibility: Option<&Eligibility>,
) -> Result<ExchangeQuote, LedgerError> {
    validate_amount(amount)?;

    let available = active_total(lots);
    let covered = amount.min(available);
    let credit_drawn = amount - covered;

    if credit_drawn > Decimal::ZERO {
        let eligibility = eligibility.copied().unwrap_or(Eligibility::INELIGIBLE);
        let allowance = eligibility.credit_allowance();
        let within_floor = wallet_balance - amount >= eligibility.max_negative_balance;

        if !eligibility.is_eligible || credit_drawn > allowance || !within_floor {
            return Err(LedgerError::InsufficientBalance {
                requested: amount,
                available,
                allowance,
            });
        }
    }

    let consumption = plan_consumption(lots, covered)?;

    Ok(ExchangeQuote {
        amount,
        available,
        consumption,
        credit_drawn,
    })
}
