//! Negative-balance eligibility policy.
//!
//! The exchange processor asks the policy whether a payer may go below zero
//! and how far. The reference policy requires a minimum account age and a
//! minimum number of committed exchanges; both thresholds and the floor come
//! from configuration.

use chrono::{DateTime, Utc};
use lets_shared::config::EligibilityConfig;
use lets_shared::types::UserId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::clock::ceil_days;

/// Account age in whole days, rounded up.
#[must_use]
pub fn account_age_days(created_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    ceil_days(now - created_at)
}

/// Facts about a member the policy decides on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountStanding {
    /// Account age in days.
    pub account_age_days: i64,
    /// Committed exchanges the member took part in.
    pub successful_transaction_count: u64,
}

/// Outcome of a policy evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Eligibility {
    /// Whether the member may go below zero.
    pub is_eligible: bool,
    /// Lowest balance the member may reach; zero when not eligible.
    pub max_negative_balance: Decimal,
}

impl Eligibility {
    /// Not eligible; the balance floor is zero.
    pub const INELIGIBLE: Self = Self {
        is_eligible: false,
        max_negative_balance: Decimal::ZERO,
    };

    /// How far below zero the member may go, as a non-negative amount.
    #[must_use]
    pub fn credit_allowance(&self) -> Decimal {
        if self.is_eligible {
            self.max_negative_balance.abs()
        } else {
            Decimal::ZERO
        }
    }
}

/// Pluggable negative-balance policy.
pub trait EligibilityPolicy: Send + Sync {
    /// Decides eligibility for a member in the given standing.
    fn evaluate(&self, standing: &AccountStanding) -> Eligibility;
}

/// Threshold policy: eligible iff old enough and active enough.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdPolicy {
    /// Minimum account age in days.
    pub min_account_age_days: i64,
    /// Minimum committed exchanges.
    pub min_successful_transactions: u64,
    /// Floor granted to eligible members.
    pub max_negative_balance: Decimal,
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        Self::from(&EligibilityConfig::default())
    }
}

impl From<&EligibilityConfig> for ThresholdPolicy {
    fn from(config: &EligibilityConfig) -> Self {
        Self {
            min_account_age_days: config.min_account_age_days,
            min_successful_transactions: config.min_successful_transactions,
            max_negative_balance: -config.max_negative_balance.abs(),
        }
    }
}

impl EligibilityPolicy for ThresholdPolicy {
    fn evaluate(&self, standing: &AccountStanding) -> Eligibility {
        let is_eligible = standing.account_age_days >= self.min_account_age_days
            && standing.successful_transaction_count >= self.min_successful_transactions;

        if is_eligible {
            Eligibility {
                is_eligible,
                max_negative_balance: self.max_negative_balance,
            }
        } else {
            Eligibility::INELIGIBLE
        }
    }
}

/// Eligibility report returned to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityReport {
    /// Member.
    pub user_id: UserId,
    /// Whether the member may go below zero.
    pub is_eligible: bool,
    /// Lowest balance the member may reach.
    pub max_negative_balance: Decimal,
    /// Account age in days.
    pub account_age_days: i64,
    /// Committed exchanges the member took part in.
    pub successful_transactions: u64,
    /// Cached Ünit balance, zero without a wallet.
    pub current_balance: Decimal,
}

impl EligibilityReport {
    /// Assembles a report from a standing and its evaluation.
    #[must_use]
    pub const fn new(
        user_id: UserId,
        standing: AccountStanding,
        eligibility: Eligibility,
        current_balance: Decimal,
    ) -> Self {
        Self {
            user_id,
            is_eligible: eligibility.is_eligible,
            max_negative_balance: eligibility.max_negative_balance,
            account_age_days: standing.account_age_days,
            successful_transactions: standing.successful_transaction_count,
            current_balance,
        }
    }
}
