//! Enum columns.
//!
//! Stored as text so the same schema runs on Postgres and SQLite. Each enum
//! mirrors a domain enum and converts both ways.

use lets_core::ledger as domain;
use lets_shared::types as shared;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Token type column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum TokenType {
    /// `PROMOTIONAL_UNIT`
    #[sea_orm(string_value = "PROMOTIONAL_UNIT")]
    PromotionalUnit,
    /// `SUBSCRIPTION_UNIT`
    #[sea_orm(string_value = "SUBSCRIPTION_UNIT")]
    SubscriptionUnit,
    /// `CIRCULATING_UNIT`
    #[sea_orm(string_value = "CIRCULATING_UNIT")]
    CirculatingUnit,
}

/// Lot status column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum LotStatus {
    /// `ACTIVE`
    #[sea_orm(string_value = "ACTIVE")]
    Active,
    /// `USED`
    #[sea_orm(string_value = "USED")]
    Used,
    /// `EXPIRED`
    #[sea_orm(string_value = "EXPIRED")]
    Expired,
}

/// Lot source column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum LotSource {
    /// `ISSUANCE`
    #[sea_orm(string_value = "ISSUANCE")]
    Issuance,
    /// `CONVERSION`
    #[sea_orm(string_value = "CONVERSION")]
    Conversion,
    /// `REWARD`
    #[sea_orm(string_value = "REWARD")]
    Reward,
}

/// Currency column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
pub enum Currency {
    /// `UNITS`
    #[sea_orm(string_value = "UNITS")]
    Units,
    /// `TOINS`
    #[sea_orm(string_value = "TOINS")]
    Toins,
}

/// Transaction kind column, mirrors the metadata tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum TransactionKind {
    /// `EXCHANGE`
    #[sea_orm(string_value = "EXCHANGE")]
    Exchange,
    /// `EXPIRE`
    #[sea_orm(string_value = "EXPIRE")]
    Expire,
    /// `ADJUSTMENT`
    #[sea_orm(string_value = "ADJUSTMENT")]
    Adjustment,
}

/// Generates `From` conversions in both directions between a column enum
/// and its domain twin with identically named variants.
macro_rules! mirror_enum {
    ($column:ident, $module:ident :: $domain:ident, [$($variant:ident),+ $(,)?]) => {
        impl From<$column> for $module::$domain {
            fn from(value: $column) -> Self {
                match value {
                    $($column::$variant => Self::$variant,)+
                }
            }
        }

        impl From<$module::$domain> for $column {
            fn from(value: $module::$domain) -> Self {
                match value {
                    $($module::$domain::$variant => Self::$variant,)+
                }
            }
        }
    };
}

mirror_enum!(TokenType, domain::TokenType, [PromotionalUnit, SubscriptionUnit, CirculatingUnit]);
mirror_enum!(LotStatus, domain::LotStatus, [Active, Used, Expired]);
mirror_enum!(LotSource, domain::LotSource, [Issuance, Conversion, Reward]);
mirror_enum!(Currency, shared::Currency, [Units, Toins]);
mirror_enum!(TransactionKind, domain::TransactionKind, [Exchange, Expire, Adjustment]);
