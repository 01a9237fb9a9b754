//! Wallet aggregate access.
//!
//! Wallet rows double as the per-member lock: every mutation of a member's
//! lots or balance happens while that member's wallet row is locked.

use chrono::{DateTime, Utc};
use lets_core::ledger::{LedgerError, Wallet};
use lets_shared::types::UserId;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};

use crate::entities::wallets;
use crate::ledger::LedgerServiceError;

/// Wallet store. All functions run on the caller's connection or transaction.
#[derive(Debug, Clone, Copy, Default)]
pub struct WalletStore;

impl WalletStore {
    /// Reads a member's wallet without locking it.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_user<C: ConnectionTrait>(
        conn: &C,
        user_id: UserId,
    ) -> Result<Option<Wallet>, DbErr> {
        Ok(wallets::Entity::find()
            .filter(wallets::Column::UserId.eq(user_id.into_inner()))
            .one(conn)
            .await?
            .map(Wallet::from))
    }

    /// Locks the wallets of `user_ids` (`SELECT ... FOR UPDATE`) in ascending
    /// user-id order and returns them in that order.
    ///
    /// Must be called inside a transaction; the locks are held until it ends.
    ///
    /// # Errors
    ///
    /// Returns `MissingWallet` for the first member without a wallet.
    pub async fn lock<C: ConnectionTrait>(
        conn: &C,
        user_ids: &[UserId],
    ) -> Result<Vec<Wallet>, LedgerServiceError> {
        let mut ids: Vec<UserId> = user_ids.to_vec();
        ids.sort_unstable();
        ids.dedup();

        let rows = wallets::Entity::find()
            .filter(wallets::Column::UserId.is_in(ids.iter().map(|id| id.into_inner())))
            .order_by_asc(wallets::Column::UserId)
            .lock_exclusive()
            .all(conn)
            .await?;

        let mut locked = Vec::with_capacity(ids.len());
        for id in ids {
            let wallet = rows
                .iter()
                .find(|row| row.user_id == id.into_inner())
                .cloned()
                .ok_or(LedgerError::MissingWallet(id))?;
            locked.push(Wallet::from(wallet));
        }

        Ok(locked)
    }

    /// Adds `delta` to a member's Ünit balance.
    ///
    /// # Errors
    ///
    /// Returns `MissingWallet` if no row was updated.
    pub async fn adjust_units<C: ConnectionTrait>(
        conn: &C,
        user_id: UserId,
        delta: Decimal,
        now: DateTime<Utc>,
    ) -> Result<(), LedgerServiceError> {
        let result = wallets::Entity::update_many()
            .col_expr(
                wallets::Column::BalanceUnits,
                Expr::col(wallets::Column::BalanceUnits).add(delta),
            )
            .col_expr(wallets::Column::UpdatedAt, Expr::value(now))
            .filter(wallets::Column::UserId.eq(user_id.into_inner()))
            .exec(conn)
            .await?;

        if result.rows_affected == 0 {
            return Err(LedgerError::MissingWallet(user_id).into());
        }

        Ok(())
    }
}
