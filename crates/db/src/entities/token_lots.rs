//! `SeaORM` Entity for token_lots table.

use lets_core::ledger::TokenLot;
use lets_shared::types::{LotId, UserId};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{LotSource, LotStatus, TokenType};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "token_lots")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((20, 4)))")]
    pub amount: Decimal,
    pub token_type: TokenType,
    pub status: LotStatus,
    pub source: LotSource,
    pub expires_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_delete = "Cascade"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for TokenLot {
    fn from(model: Model) -> Self {
        Self {
            id: LotId::from_uuid(model.id),
            user_id: UserId::from_uuid(model.user_id),
            amount: model.amount,
            token_type: model.token_type.into(),
            status: model.status.into(),
            source: model.source.into(),
            expires_at: model.expires_at,
            created_at: model.created_at,
        }
    }
}
