//! Property-based tests for the FIFO consumption selector.
//!
//! - Plans cover exactly the required amount
//! - Only the last deduction may be partial
//! - Deductions follow expiry order, never-expiring lots last

use chrono::{Duration, TimeZone, Utc};
use lets_shared::types::{LotId, UserId};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::error::LedgerError;
use super::fifo::plan_consumption;
use super::types::{LotSource, LotStatus, TokenLot, TokenType};

/// Strategy for lot amounts (0.01 to 1,000.00).
fn lot_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for a set of lots with optional expiry offsets in days.
fn lots_strategy() -> impl Strategy<Value = Vec<TokenLot>> {
    prop::collection::vec((lot_amount(), prop::option::of(1i64..400)), 1..12).prop_map(|specs| {
        let t0 = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let user_id = UserId::new();
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (amount, expiry))| TokenLot {
                id: LotId::new(),
                user_id,
                amount,
                token_type: TokenType::CirculatingUnit,
                status: LotStatus::Active,
                source: LotSource::Issuance,
                expires_at: expiry.map(|d| t0 + Duration::days(d)),
                created_at: t0 + Duration::seconds(i64::try_from(i).unwrap_or_default()),
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// *For any* lots and any required amount within their total, the plan
    /// SHALL deduct exactly the required amount.
    #[test]
    fn prop_plan_covers_exactly(lots in lots_strategy(), fraction in 0u32..=100) {
        let total: Decimal = lots.iter().map(|l| l.amount).sum();
        let required = (total * Decimal::from(fraction) / Decimal::from(100)).round_dp(2);

        let plan = plan_consumption(&lots, required).unwrap();

        prop_assert_eq!(plan.total(), required);
    }

    /// *For any* plan, every deduction except the last SHALL drain its lot.
    #[test]
    fn prop_only_last_deduction_partial(lots in lots_strategy(), fraction in 1u32..=100) {
        let total: Decimal = lots.iter().map(|l| l.amount).sum();
        let required = (total * Decimal::from(fraction) / Decimal::from(100)).round_dp(2);

        let plan = plan_consumption(&lots, required).unwrap();

        if let Some((_, init)) = plan.deductions.split_last() {
            for d in init {
                prop_assert!(d.fully_consumed);
                prop_assert_eq!(d.remaining, Decimal::ZERO);
            }
        }
        for d in &plan.deductions {
            prop_assert!(d.amount_to_deduct > Decimal::ZERO);
            prop_assert_eq!(d.fully_consumed, d.remaining.is_zero());
        }
    }

    /// *For any* plan, deductions SHALL follow ascending expiry with
    /// never-expiring lots after all expiring ones.
    #[test]
    fn prop_plan_follows_expiry_order(lots in lots_strategy()) {
        let total: Decimal = lots.iter().map(|l| l.amount).sum();

        let plan = plan_consumption(&lots, total).unwrap();

        let expiries: Vec<_> = plan
            .deductions
            .iter()
            .map(|d| lots.iter().find(|l| l.id == d.lot_id).and_then(|l| l.expires_at))
            .collect();
        for pair in expiries.windows(2) {
            match (pair[0], pair[1]) {
                (Some(a), Some(b)) => prop_assert!(a <= b),
                (None, Some(_)) => prop_assert!(false, "never-expiring lot consumed before an expiring one"),
                _ => {}
            }
        }
    }

    /// *For any* required amount above the lot total, the selector SHALL
    /// report a shortfall.
    #[test]
    fn prop_over_request_is_shortfall(lots in lots_strategy(), extra in lot_amount()) {
        let total: Decimal = lots.iter().map(|l| l.amount).sum();

        let result = plan_consumption(&lots, total + extra);

        let is_shortfall = matches!(result, Err(LedgerError::Shortfall { .. }));
        prop_assert!(is_shortfall);
    }
}
