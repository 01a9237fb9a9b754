//! Property-based tests for the balance projection.
//!
//! - Bucket totals add up to the active total
//! - Expiring and expired buckets never exceed their type total
//! - Consuming a plan lowers the projected total by exactly the plan total

use chrono::{DateTime, Duration, TimeZone, Utc};
use lets_shared::types::{LotId, UserId};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::balance::LotBalanceSummary;
use super::fifo::plan_consumption;
use super::types::{LotSource, LotStatus, TokenLot, TokenType};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap()
}

fn token_type() -> impl Strategy<Value = TokenType> {
    prop_oneof![
        Just(TokenType::PromotionalUnit),
        Just(TokenType::SubscriptionUnit),
        Just(TokenType::CirculatingUnit),
    ]
}

fn status() -> impl Strategy<Value = LotStatus> {
    prop_oneof![
        4 => Just(LotStatus::Active),
        1 => Just(LotStatus::Used),
        1 => Just(LotStatus::Expired),
    ]
}

/// Lots with expiry offsets in hours between -60 and +60 days.
fn lots_strategy() -> impl Strategy<Value = Vec<TokenLot>> {
    prop::collection::vec(
        (
            (1i64..50_000i64).prop_map(|cents| Decimal::new(cents, 2)),
            token_type(),
            status(),
            prop::option::of(-1_440i64..1_440),
        ),
        0..15,
    )
    .prop_map(|specs| {
        let user_id = UserId::new();
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (amount, token_type, status, expiry_hours))| TokenLot {
                id: LotId::new(),
                user_id,
                amount,
                token_type,
                status,
                source: LotSource::Issuance,
                expires_at: expiry_hours.map(|h| now() + Duration::hours(h)),
                created_at: now() - Duration::days(90) + Duration::seconds(i64::try_from(i).unwrap_or_default()),
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// *For any* lots, per-type totals SHALL sum to the active total.
    #[test]
    fn prop_type_totals_sum_to_units_total(lots in lots_strategy()) {
        let summary = LotBalanceSummary::project(&lots, now(), 30);

        let by_type: Decimal = summary.by_type.values().map(|b| b.total).sum();
        let active: Decimal = lots.iter().filter(|l| l.is_active()).map(|l| l.amount).sum();

        prop_assert_eq!(by_type, summary.units_total);
        prop_assert_eq!(summary.units_total, active);
    }

    /// *For any* lots, the expiring and expired buckets SHALL be disjoint
    /// parts of the type total.
    #[test]
    fn prop_buckets_within_total(lots in lots_strategy(), window in 0i64..90) {
        let summary = LotBalanceSummary::project(&lots, now(), window);

        for bucket in summary.by_type.values() {
            prop_assert!(bucket.expiring_soon >= Decimal::ZERO);
            prop_assert!(bucket.expired >= Decimal::ZERO);
            prop_assert!(bucket.expiring_soon + bucket.expired <= bucket.total);
        }
    }

    /// *For any* plan over the lots, applying it SHALL lower the projected
    /// total by exactly the plan total.
    #[test]
    fn prop_consumption_conserves_total(mut lots in lots_strategy(), fraction in 0u32..=100) {
        let before = LotBalanceSummary::project(&lots, now(), 30).units_total;
        let required = (before * Decimal::from(fraction) / Decimal::from(100)).round_dp(2);

        let plan = plan_consumption(&lots, required).unwrap();
        for deduction in &plan.deductions {
            if let Some(lot) = lots.iter_mut().find(|l| l.id == deduction.lot_id) {
                lot.amount = deduction.remaining;
                if deduction.fully_consumed {
                    lot.status = LotStatus::Used;
                }
            }
        }
        let after = LotBalanceSummary::project(&lots, now(), 30).units_total;

        prop_assert_eq!(before - after, plan.total());
        prop_assert_eq!(plan.total(), required);
    }
}
