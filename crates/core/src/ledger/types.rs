//! Domain types for token lots and wallets.

use chrono::{DateTime, Utc};
use lets_shared::types::{LotId, UserId, WalletId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Kind of value a lot carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenType {
    /// Promotional grant.
    PromotionalUnit,
    /// Units bundled with a subscription.
    SubscriptionUnit,
    /// Units received through member exchanges.
    CirculatingUnit,
}

impl TokenType {
    /// Stored name of the type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PromotionalUnit => "PROMOTIONAL_UNIT",
            Self::SubscriptionUnit => "SUBSCRIPTION_UNIT",
            Self::CirculatingUnit => "CIRCULATING_UNIT",
        }
    }
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a lot. `Used` and `Expired` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LotStatus {
    /// Spendable.
    Active,
    /// Fully consumed by an exchange.
    Used,
    /// Retired by the expiry sweep.
    Expired,
}

impl LotStatus {
    /// Stored name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Used => "USED",
            Self::Expired => "EXPIRED",
        }
    }

    /// Returns true for states a lot can never leave.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Used | Self::Expired)
    }
}

/// Provenance of a lot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LotSource {
    /// Initial issuance to a member.
    Issuance,
    /// Minted on the receiving side of an exchange.
    Conversion,
    /// Granted as a reward.
    Reward,
}

impl LotSource {
    /// Stored name of the source.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Issuance => "ISSUANCE",
            Self::Conversion => "CONVERSION",
            Self::Reward => "REWARD",
        }
    }
}

/// A discrete, independently expiring slice of a member's balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenLot {
    /// Lot ID.
    pub id: LotId,
    /// Owner.
    pub user_id: UserId,
    /// Remaining amount.
    pub amount: Decimal,
    /// Token type.
    pub token_type: TokenType,
    /// Lifecycle status.
    pub status: LotStatus,
    /// Provenance.
    pub source: LotSource,
    /// Expiry instant; `None` never expires.
    pub expires_at: Option<DateTime<Utc>>,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
}

impl TokenLot {
    /// Returns true if the lot is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == LotStatus::Active
    }

    /// Returns true if the lot has an expiry at or before `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expiry| expiry <= now)
    }
}

/// A member's cached balances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    /// Wallet ID.
    pub id: WalletId,
    /// Owner.
    pub user_id: UserId,
    /// Ünit balance; may be negative when credit was drawn.
    pub balance_units: Decimal,
    /// Töin balance.
    pub balance_toins: Decimal,
}

/// Sums the amounts of the active lots in `lots`.
#[must_use]
pub fn active_total(lots: &[TokenLot]) -> Decimal {
    lots.iter()
        .filter(|lot| lot.is_active())
        .map(|lot| lot.amount)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn lot(amount: Decimal, status: LotStatus, expires_at: Option<DateTime<Utc>>) -> TokenLot {
        TokenLot {
            id: LotId::new(),
            user_id: UserId::new(),
            amount,
            token_type: TokenType::CirculatingUnit,
            status,
            source: LotSource::Issuance,
            expires_at,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!LotStatus::Active.is_terminal());
        assert!(LotStatus::Used.is_terminal());
        assert!(LotStatus::Expired.is_terminal());
    }

    #[test]
    fn test_is_expired_at_boundary() {
        let now = Utc::now();
        assert!(lot(dec!(1), LotStatus::Active, Some(now)).is_expired_at(now));
        assert!(!lot(dec!(1), LotStatus::Active, Some(now + Duration::seconds(1))).is_expired_at(now));
        assert!(!lot(dec!(1), LotStatus::Active, None).is_expired_at(now));
    }

    #[test]
    fn test_active_total_ignores_retired_lots() {
        let lots = vec![
            lot(dec!(10), LotStatus::Active, None),
            lot(dec!(5.5), LotStatus::Active, None),
            lot(dec!(100), LotStatus::Used, None),
            lot(dec!(7), LotStatus::Expired, None),
        ];
        assert_eq!(active_total(&lots), dec!(15.5));
    }

    #[test]
    fn test_token_type_serde_names() {
        assert_eq!(
            serde_json::to_string(&TokenType::CirculatingUnit).unwrap(),
            "\"CIRCULATING_UNIT\""
        );
        assert_eq!(
            serde_json::to_string(&LotSource::Conversion).unwrap(),
            "\"CONVERSION\""
        );
        assert_eq!(TokenType::SubscriptionUnit.to_string(), "SUBSCRIPTION_UNIT");
        assert_eq!(LotStatus::Expired.as_str(), "EXPIRED");
    }
}
