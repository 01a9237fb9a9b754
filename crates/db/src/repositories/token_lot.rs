//! Token lot store.
//!
//! Row-level access to lots. Holds no transaction logic: every function runs
//! on the connection or transaction the caller passes in, and callers hold
//! the owner's wallet lock around any mutation.

use chrono::{DateTime, Utc};
use lets_core::ledger::{LedgerError, LotSource, LotStatus, TokenLot, TokenType};
use lets_shared::types::{LotId, UserId};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::entities::{sea_orm_active_enums, token_lots};
use crate::ledger::LedgerServiceError;

/// Input for minting a lot.
#[derive(Debug, Clone)]
pub struct NewLot {
    /// Owner.
    pub user_id: UserId,
    /// Amount, positive.
    pub amount: Decimal,
    /// Token type.
    pub token_type: TokenType,
    /// Provenance.
    pub source: LotSource,
    /// Expiry; `None` never expires.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Token lot store.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenLotStore;

impl TokenLotStore {
    /// Lists a member's active lots in creation order, optionally of one type.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_active<C: ConnectionTrait>(
        conn: &C,
        user_id: UserId,
        token_type: Option<TokenType>,
    ) -> Result<Vec<TokenLot>, DbErr> {
        let mut query = token_lots::Entity::find()
            .filter(token_lots::Column::UserId.eq(user_id.into_inner()))
            .filter(token_lots::Column::Status.eq(sea_orm_active_enums::LotStatus::Active));

        if let Some(token_type) = token_type {
            query = query.filter(
                token_lots::Column::TokenType.eq(sea_orm_active_enums::TokenType::from(token_type)),
            );
        }

        let rows = query
            .order_by_asc(token_lots::Column::CreatedAt)
            .order_by_asc(token_lots::Column::Id)
            .all(conn)
            .await?;

        Ok(rows.into_iter().map(TokenLot::from).collect())
    }

    /// Finds a lot by ID, whatever its status.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find<C: ConnectionTrait>(conn: &C, lot_id: LotId) -> Result<Option<TokenLot>, DbErr> {
        Ok(token_lots::Entity::find_by_id(lot_id.into_inner())
            .one(conn)
            .await?
            .map(TokenLot::from))
    }

    /// Reduces an active lot by `amount`. The lot keeps its status; draining
    /// it is done with [`Self::retire`].
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown lot and `InvalidAmount` for a
    /// non-positive amount, an inactive lot, or a reduction below zero.
    pub async fn reduce<C: ConnectionTrait>(
        conn: &C,
        lot_id: LotId,
        amount: Decimal,
        now: DateTime<Utc>,
    ) -> Result<TokenLot, LedgerServiceError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::invalid_amount(amount, "reduction must be positive").into());
        }

        let lot = token_lots::Entity::find_by_id(lot_id.into_inner())
            .one(conn)
            .await?
            .ok_or_else(|| LedgerError::lot_not_found(lot_id))?;

        if lot.status != sea_orm_active_enums::LotStatus::Active {
            return Err(LedgerError::invalid_amount(amount, "lot is not active").into());
        }
        if lot.amount < amount {
            return Err(LedgerError::invalid_amount(amount, "reduction exceeds lot amount").into());
        }

        let remaining = lot.amount - amount;
        let mut active: token_lots::ActiveModel = lot.into();
        active.amount = Set(remaining);
        active.updated_at = Set(now);
        let updated = active.update(conn).await?;

        Ok(TokenLot::from(updated))
    }

    /// Moves an active lot into a terminal status.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAmount` for a non-terminal target or an inactive lot,
    /// and `NotFound` for an unknown lot.
    pub async fn retire<C: ConnectionTrait>(
        conn: &C,
        lot_id: LotId,
        status: LotStatus,
        now: DateTime<Utc>,
    ) -> Result<(), LedgerServiceError> {
        if !status.is_terminal() {
            return Err(
                LedgerError::invalid_amount(Decimal::ZERO, "retirement status must be terminal").into(),
            );
        }

        let result = token_lots::Entity::update_many()
            .col_expr(
                token_lots::Column::Status,
                Expr::value(sea_orm_active_enums::LotStatus::from(status)),
            )
            .col_expr(token_lots::Column::UpdatedAt, Expr::value(now))
            .filter(token_lots::Column::Id.eq(lot_id.into_inner()))
            .filter(token_lots::Column::Status.eq(sea_orm_active_enums::LotStatus::Active))
            .exec(conn)
            .await?;

        if result.rows_affected == 0 {
            return match Self::find(conn, lot_id).await? {
                Some(lot) => Err(LedgerError::invalid_amount(lot.amount, "lot is not active").into()),
                None => Err(LedgerError::lot_not_found(lot_id).into()),
            };
        }

        Ok(())
    }

    /// Mints an active lot.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAmount` for a non-positive amount.
    pub async fn create<C: ConnectionTrait>(
        conn: &C,
        lot: NewLot,
        now: DateTime<Utc>,
    ) -> Result<TokenLot, LedgerServiceError> {
        if lot.amount <= Decimal::ZERO {
            return Err(LedgerError::invalid_amount(lot.amount, "lot amount must be positive").into());
        }

        let model = token_lots::ActiveModel {
            id: Set(LotId::new().into_inner()),
            user_id: Set(lot.user_id.into_inner()),
            amount: Set(lot.amount),
            token_type: Set(lot.token_type.into()),
            status: Set(sea_orm_active_enums::LotStatus::Active),
            source: Set(lot.source.into()),
            expires_at: Set(lot.expires_at),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(conn)
        .await?;

        Ok(TokenLot::from(model))
    }

    /// Members holding at least one active lot with `expires_at <= now`, in
    /// ascending ID order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn users_with_due_lots<C: ConnectionTrait>(
        conn: &C,
        now: DateTime<Utc>,
    ) -> Result<Vec<UserId>, DbErr> {
        let ids: Vec<uuid::Uuid> = token_lots::Entity::find()
            .select_only()
            .column(token_lots::Column::UserId)
            .distinct()
            .filter(token_lots::Column::Status.eq(sea_orm_active_enums::LotStatus::Active))
            .filter(token_lots::Column::ExpiresAt.is_not_null())
            .filter(token_lots::Column::ExpiresAt.lte(now))
            .order_by_asc(token_lots::Column::UserId)
            .into_tuple()
            .all(conn)
            .await?;

        Ok(ids.into_iter().map(UserId::from_uuid).collect())
    }
}
