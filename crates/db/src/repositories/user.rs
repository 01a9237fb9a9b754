//! User repository for database operations.

use chrono::{DateTime, Utc};
use lets_core::ledger::LedgerError;
use lets_shared::types::{UserId, WalletId};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, Set, TransactionTrait,
};

use crate::entities::{users, wallets};
use crate::ledger::LedgerServiceError;

/// User repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a user by email.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
    }

    /// Creates a user without a wallet.
    ///
    /// `created_at` is the account-age origin used by the eligibility policy.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(
        &self,
        email: &str,
        display_name: &str,
        created_at: DateTime<Utc>,
    ) -> Result<users::Model, DbErr> {
        insert_user(&self.db, email, display_name, created_at).await
    }

    /// Creates a user together with an empty wallet, atomically.
    ///
    /// # Errors
    ///
    /// Returns an error if either insert fails.
    pub async fn create_with_wallet(
        &self,
        email: &str,
        display_name: &str,
        created_at: DateTime<Utc>,
    ) -> Result<(users::Model, wallets::Model), DbErr> {
        let txn = self.db.begin().await?;

        let user = insert_user(&txn, email, display_name, created_at).await?;
        let wallet = wallets::ActiveModel {
            id: Set(WalletId::new().into_inner()),
            user_id: Set(user.id),
            balance_units: Set(Decimal::ZERO),
            balance_toins: Set(Decimal::ZERO),
            created_at: Set(created_at),
            updated_at: Set(created_at),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        Ok((user, wallet))
    }
}

async fn insert_user<C: ConnectionTrait>(
    conn: &C,
    email: &str,
    display_name: &str,
    created_at: DateTime<Utc>,
) -> Result<users::Model, DbErr> {
    users::ActiveModel {
        id: Set(UserId::new().into_inner()),
        email: Set(email.to_string()),
        display_name: Set(display_name.to_string()),
        created_at: Set(created_at),
        updated_at: Set(created_at),
    }
    .insert(conn)
    .await
}

/// Loads a user inside the caller's transaction.
///
/// # Errors
///
/// Returns `NotFound` for an unknown ID.
pub async fn require_user<C: ConnectionTrait>(
    conn: &C,
    id: UserId,
) -> Result<users::Model, LedgerServiceError> {
    users::Entity::find_by_id(id.into_inner())
        .one(conn)
        .await?
        .ok_or_else(|| LedgerError::user_not_found(id).into())
}
