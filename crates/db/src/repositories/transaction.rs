//! Append-only transaction store.

use chrono::{DateTime, Utc};
use lets_core::ledger::{LedgerTransaction, TransactionKind, TransactionMetadata};
use lets_shared::types::{Currency, TransactionId, UserId, WalletId};
use rust_decimal::Decimal;
use sea_orm::sea_query::Condition;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::entities::{sea_orm_active_enums, transactions};

/// Input for appending a transaction.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    /// Sender.
    pub from_user_id: UserId,
    /// Receiver.
    pub to_user_id: UserId,
    /// Sender wallet.
    pub from_wallet_id: WalletId,
    /// Receiver wallet.
    pub to_wallet_id: WalletId,
    /// Amount.
    pub amount: Decimal,
    /// Currency.
    pub currency: Currency,
    /// Description.
    pub description: String,
    /// Typed metadata; its tag also fills the `kind` column.
    pub metadata: TransactionMetadata,
}

/// Transaction store.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransactionStore;

impl TransactionStore {
    /// Appends a transaction record.
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata cannot be encoded or the insert fails.
    pub async fn append<C: ConnectionTrait>(
        conn: &C,
        input: NewTransaction,
        now: DateTime<Utc>,
    ) -> Result<LedgerTransaction, DbErr> {
        let metadata =
            serde_json::to_value(&input.metadata).map_err(|e| DbErr::Json(e.to_string()))?;

        let model = transactions::ActiveModel {
            id: Set(TransactionId::new().into_inner()),
            from_user_id: Set(input.from_user_id.into_inner()),
            to_user_id: Set(input.to_user_id.into_inner()),
            from_wallet_id: Set(input.from_wallet_id.into_inner()),
            to_wallet_id: Set(input.to_wallet_id.into_inner()),
            amount: Set(input.amount),
            currency: Set(input.currency.into()),
            kind: Set(input.metadata.kind().into()),
            description: Set(input.description),
            metadata: Set(metadata),
            created_at: Set(now),
        }
        .insert(conn)
        .await?;

        LedgerTransaction::try_from(model)
    }

    /// Most recent transactions a member took part in, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored record is malformed.
    pub async fn history<C: ConnectionTrait>(
        conn: &C,
        user_id: UserId,
        limit: u64,
    ) -> Result<Vec<LedgerTransaction>, DbErr> {
        transactions::Entity::find()
            .filter(involving(user_id))
            .order_by_desc(transactions::Column::CreatedAt)
            .order_by_desc(transactions::Column::Id)
            .limit(limit)
            .all(conn)
            .await?
            .into_iter()
            .map(LedgerTransaction::try_from)
            .collect()
    }

    /// Number of committed exchanges a member took part in, on either side.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn count_successful_exchanges<C: ConnectionTrait>(
        conn: &C,
        user_id: UserId,
    ) -> Result<u64, DbErr> {
        transactions::Entity::find()
            .filter(
                transactions::Column::Kind
                    .eq(sea_orm_active_enums::TransactionKind::from(TransactionKind::Exchange)),
            )
            .filter(involving(user_id))
            .count(conn)
            .await
    }
}

fn involving(user_id: UserId) -> Condition {
    Condition::any()
        .add(transactions::Column::FromUserId.eq(user_id.into_inner()))
        .add(transactions::Column::ToUserId.eq(user_id.into_inner()))
}
