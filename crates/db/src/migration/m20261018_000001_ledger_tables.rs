//! Ledger tables: users, wallets, token lots and transactions.
//!
//! Built with the schema builder rather than raw SQL so the same migration
//! runs on Postgres and on the SQLite test database. Enum columns are text.

use lets_shared::types::{UNIT_PRECISION, UNIT_SCALE};
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::DbBackend;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// SQLite caps declared decimal precision at 16 digits.
const SQLITE_AMOUNT_PRECISION: u32 = 16;

/// Amount column: exact `numeric(20, 4)` on Postgres. SQLite has no exact
/// decimal type and SeaORM reads its decimals through `f64`, so the column
/// is declared as a 16-digit real there.
fn amount_column<T: IntoIden>(backend: DbBackend, name: T) -> ColumnDef {
    let precision = match backend {
        DbBackend::Sqlite => SQLITE_AMOUNT_PRECISION,
        DbBackend::Postgres | DbBackend::MySql => UNIT_PRECISION,
    };
    let mut column = ColumnDef::new(name);
    column.decimal_len(precision, UNIT_SCALE);
    column
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();

        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Users::Email).string_len(255).not_null().unique_key())
                    .col(ColumnDef::new(Users::DisplayName).string_len(255).not_null())
                    .col(ColumnDef::new(Users::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Users::UpdatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Wallets::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Wallets::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Wallets::UserId).uuid().not_null().unique_key())
                    .col(
                        amount_column(backend, Wallets::BalanceUnits)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        amount_column(backend, Wallets::BalanceToins)
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Wallets::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Wallets::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_wallets_user")
                            .from(Wallets::Table, Wallets::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TokenLots::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(TokenLots::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(TokenLots::UserId).uuid().not_null())
                    .col(amount_column(backend, TokenLots::Amount).not_null())
                    .col(ColumnDef::new(TokenLots::TokenType).string_len(32).not_null())
                    .col(ColumnDef::new(TokenLots::Status).string_len(16).not_null())
                    .col(ColumnDef::new(TokenLots::Source).string_len(16).not_null())
                    .col(ColumnDef::new(TokenLots::ExpiresAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(TokenLots::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(TokenLots::UpdatedAt).timestamp_with_time_zone().not_null())
                    .check(Expr::col(TokenLots::Amount).gte(0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_token_lots_user")
                            .from(TokenLots::Table, TokenLots::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Active-lot reads and the sweep both filter on (user, status).
        manager
            .create_index(
                Index::create()
                    .name("idx_token_lots_user_status")
                    .table(TokenLots::Table)
                    .col(TokenLots::UserId)
                    .col(TokenLots::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_token_lots_status_expiry")
                    .table(TokenLots::Table)
                    .col(TokenLots::Status)
                    .col(TokenLots::ExpiresAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Transactions::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Transactions::FromUserId).uuid().not_null())
                    .col(ColumnDef::new(Transactions::ToUserId).uuid().not_null())
                    .col(ColumnDef::new(Transactions::FromWalletId).uuid().not_null())
                    .col(ColumnDef::new(Transactions::ToWalletId).uuid().not_null())
                    .col(amount_column(backend, Transactions::Amount).not_null())
                    .col(ColumnDef::new(Transactions::Currency).string_len(8).not_null())
                    .col(ColumnDef::new(Transactions::Kind).string_len(16).not_null())
                    .col(ColumnDef::new(Transactions::Description).text().not_null())
                    .col(ColumnDef::new(Transactions::Metadata).json().not_null())
                    .col(
                        ColumnDef::new(Transactions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_from_user")
                            .from(Transactions::Table, Transactions::FromUserId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_to_user")
                            .from(Transactions::Table, Transactions::ToUserId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_from_wallet")
                            .from(Transactions::Table, Transactions::FromWalletId)
                            .to(Wallets::Table, Wallets::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_to_wallet")
                            .from(Transactions::Table, Transactions::ToWalletId)
                            .to(Wallets::Table, Wallets::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_transactions_from_user")
                    .table(Transactions::Table)
                    .col(Transactions::FromUserId)
                    .col(Transactions::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_transactions_to_user")
                    .table(Transactions::Table)
                    .col(Transactions::ToUserId)
                    .col(Transactions::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_transactions_kind")
                    .table(Transactions::Table)
                    .col(Transactions::Kind)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Transactions::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TokenLots::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Wallets::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).if_exists().to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Email,
    DisplayName,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Wallets {
    Table,
    Id,
    UserId,
    BalanceUnits,
    BalanceToins,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum TokenLots {
    Table,
    Id,
    UserId,
    Amount,
    TokenType,
    Status,
    Source,
    ExpiresAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Transactions {
    Table,
    Id,
    FromUserId,
    ToUserId,
    FromWalletId,
    ToWalletId,
    Amount,
    Currency,
    Kind,
    Description,
    Metadata,
    CreatedAt,
}
