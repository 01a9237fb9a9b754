//! Read-time balance projection over a member's active lots.
//!
//! Lots are bucketed per token type by days to expiry (rounded up):
//! - `0 < days <= window` counts as expiring soon
//! - `days <= 0` counts as expired (the sweep has not retired it yet)
//!
//! The projection never mutates anything; retirement is the sweep's job.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use lets_shared::types::UserId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::{TokenLot, TokenType, Wallet};
use crate::clock::ceil_days;

/// Whole days until `expiry`, rounded up. Zero or negative once reached.
#[must_use]
pub fn days_to_expiry(expiry: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    ceil_days(expiry - now)
}

/// Per-type balance buckets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeBalance {
    /// Sum of active lots of this type.
    pub total: Decimal,
    /// Portion expiring within the window.
    pub expiring_soon: Decimal,
    /// Portion already past expiry but not yet swept.
    pub expired: Decimal,
}

/// Projection of a set of active lots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotBalanceSummary {
    /// Sum of all active lots.
    pub units_total: Decimal,
    /// Buckets keyed by token type.
    pub by_type: BTreeMap<TokenType, TypeBalance>,
}

impl LotBalanceSummary {
    /// Projects `lots` at `now` with an expiring window of `window_days`.
    ///
    /// Lots that are not active are skipped.
    #[must_use]
    pub fn project(lots: &[TokenLot], now: DateTime<Utc>, window_days: i64) -> Self {
        let mut summary = Self::default();

        for lot in lots.iter().filter(|lot| lot.is_active()) {
            summary.units_total += lot.amount;
            let bucket = summary.by_type.entry(lot.token_type).or_default();
            bucket.total += lot.amount;

            if let Some(expiry) = lot.expires_at {
                let days = days_to_expiry(expiry, now);
                if days <= 0 {
                    bucket.expired += lot.amount;
                } else if days <= window_days {
                    bucket.expiring_soon += lot.amount;
                }
            }
        }

        summary
    }
}

/// Cached wallet balances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletBalance {
    /// Ünits.
    pub units: Decimal,
    /// Töins.
    pub toins: Decimal,
}

impl From<&Wallet> for WalletBalance {
    fn from(wallet: &Wallet) -> Self {
        Self {
            units: wallet.balance_units,
            toins: wallet.balance_toins,
        }
    }
}

/// Balance report returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceReport {
    /// Member.
    pub user_id: UserId,
    /// Type filter the lots were read with, if any.
    pub token_type: Option<TokenType>,
    /// Cached wallet balances; `None` if the member has no wallet.
    pub wallet: Option<WalletBalance>,
    /// Lot projection.
    pub lots: LotBalanceSummary,
}

impl BalanceReport {
    /// Sum of the active lots in the report.
    #[must_use]
    pub fn total_active_tokens(&self) -> Decimal {
        self.lots.units_total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::types::{LotSource, LotStatus};
    use chrono::{Duration, TimeZone};
    use lets_shared::types::LotId;
    use rust_decimal_macros::dec;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 10, 8, 0, 0).unwrap()
    }

    fn lot(amount: Decimal, token_type: TokenType, expires_at: Option<DateTime<Utc>>) -> TokenLot {
        TokenLot {
            id: LotId::new(),
            user_id: UserId::new(),
            amount,
            token_type,
            status: LotStatus::Active,
            source: LotSource::Issuance,
            expires_at,
            created_at: now() - Duration::days(400),
        }
    }

    #[test]
    fn test_days_to_expiry_rounds_up() {
        assert_eq!(days_to_expiry(now() + Duration::hours(1), now()), 1);
        assert_eq!(days_to_expiry(now() + Duration::days(30), now()), 30);
        assert_eq!(
            days_to_expiry(now() + Duration::days(30) + Duration::minutes(1), now()),
            31
        );
        assert_eq!(days_to_expiry(now(), now()), 0);
        assert_eq!(days_to_expiry(now() - Duration::hours(23), now()), 0);
        assert_eq!(days_to_expiry(now() - Duration::days(2), now()), -2);
    }

    #[test]
    fn test_projection_buckets() {
        let lots = vec![
            lot(dec!(10), TokenType::CirculatingUnit, None),
            lot(dec!(20), TokenType::CirculatingUnit, Some(now() + Duration::days(30))),
            lot(dec!(5), TokenType::CirculatingUnit, Some(now() + Duration::days(31))),
            lot(dec!(7), TokenType::PromotionalUnit, Some(now())),
            lot(dec!(3), TokenType::PromotionalUnit, Some(now() - Duration::days(3))),
        ];

        let summary = LotBalanceSummary::project(&lots, now(), 30);

        assert_eq!(summary.units_total, dec!(45));
        assert_eq!(
            summary.by_type[&TokenType::CirculatingUnit],
            TypeBalance {
                total: dec!(35),
                expiring_soon: dec!(20),
                expired: dec!(0),
            }
        );
        assert_eq!(
            summary.by_type[&TokenType::PromotionalUnit],
            TypeBalance {
                total: dec!(10),
                expiring_soon: dec!(0),
                expired: dec!(10),
            }
        );
        assert!(!summary.by_type.contains_key(&TokenType::SubscriptionUnit));
    }

    #[test]
    fn test_projection_skips_retired_lots() {
        let mut used = lot(dec!(50), TokenType::CirculatingUnit, None);
        used.status = LotStatus::Used;

        let summary = LotBalanceSummary::project(&[used], now(), 30);

        assert_eq!(summary, LotBalanceSummary::default());
    }

    #[test]
    fn test_wallet_balance_from_wallet() {
        let wallet = Wallet {
            id: lets_shared::types::WalletId::new(),
            user_id: UserId::new(),
            balance_units: dec!(-12.5),
            balance_toins: dec!(3),
        };
        assert_eq!(
            WalletBalance::from(&wallet),
            WalletBalance {
                units: dec!(-12.5),
                toins: dec!(3),
            }
        );
    }
}
