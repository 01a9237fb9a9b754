//! Ledger currencies and amount precision.
//!
//! CRITICAL: Never use floating-point for ledger amounts.
//! Amounts are `rust_decimal::Decimal` with at most [`UNIT_SCALE`] fractional digits.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Number of fractional digits the ledger stores for any amount.
pub const UNIT_SCALE: u32 = 4;

/// Total significant digits of a stored amount (`numeric(20, 4)`).
pub const UNIT_PRECISION: u32 = 20;

/// Largest magnitude a stored amount can hold: 9,999,999,999,999,999.9999.
pub const MAX_AMOUNT: Decimal =
    Decimal::from_parts(0x630F_FFFF, 0x6BC7_5E2D, 0x5, false, UNIT_SCALE);

/// Currencies held in a member wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Ünits, the circulating unit of account.
    Units,
    /// Töins, the secondary wallet currency.
    Toins,
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Units => write!(f, "UNITS"),
            Self::Toins => write!(f, "TOINS"),
        }
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "UNITS" => Ok(Self::Units),
            "TOINS" => Ok(Self::Toins),
            _ => Err(format!("Unknown currency: {s}")),
        }
    }
}

/// Returns true if `amount` fits the ledger precision without rounding.
#[must_use]
pub fn is_representable(amount: Decimal) -> bool {
    amount.normalize().scale() <= UNIT_SCALE
}

/// Returns true if `amount` fits a stored amount column.
#[must_use]
pub fn is_within_range(amount: Decimal) -> bool {
    amount.abs() <= MAX_AMOUNT
}
