//! `SeaORM` Entity for transactions table.
//!
//! Append-only: rows are inserted once and never updated or deleted.

use lets_core::ledger::{LedgerTransaction, TransactionMetadata};
use lets_shared::types::{TransactionId, UserId, WalletId};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{Currency, TransactionKind};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub from_user_id: Uuid,
    pub to_user_id: Uuid,
    pub from_wallet_id: Uuid,
    pub to_wallet_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((20, 4)))")]
    pub amount: Decimal,
    pub currency: Currency,
    pub kind: TransactionKind,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub metadata: Json,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::FromUserId",
        to = "super::users::Column::Id"
    )]
    FromUser,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::ToUserId",
        to = "super::users::Column::Id"
    )]
    ToUser,
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for LedgerTransaction {
    type Error = DbErr;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let metadata: TransactionMetadata = serde_json::from_value(model.metadata)
            .map_err(|e| DbErr::Json(format!("transaction {} metadata: {e}", model.id)))?;

        Ok(Self {
            id: TransactionId::from_uuid(model.id),
            from_user_id: UserId::from_uuid(model.from_user_id),
            to_user_id: UserId::from_uuid(model.to_user_id),
            from_wallet_id: WalletId::from_uuid(model.from_wallet_id),
            to_wallet_id: WalletId::from_uuid(model.to_wallet_id),
            amount: model.amount,
            currency: model.currency.into(),
            description: model.description,
            metadata,
            created_at: model.created_at,
        })
    }
}
