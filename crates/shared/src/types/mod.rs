//! Common types used across the ledger crates.

pub mod id;
pub mod money;

pub use id::*;
pub use money::{
    Currency, MAX_AMOUNT, UNIT_PRECISION, UNIT_SCALE, is_representable, is_within_range,
};
