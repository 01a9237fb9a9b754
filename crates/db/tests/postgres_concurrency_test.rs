//! Concurrent access tests for the ledger against a real Postgres pool.
//!
//! These verify that the per-member wallet lock serializes every mutation of
//! a member's lots and balance:
//! - Parallel exchanges from one payer never spend the same lot twice
//! - An exchange racing a sweep on the same member leaves lots and wallet
//!   in agreement
//!
//! Skipped unless `DATABASE_URL` points at a Postgres database.

#![allow(clippy::items_after_statements)]

use std::env;
use std::sync::Arc;

use chrono::{Duration, Utc};
use futures::future::join_all;
use lets_core::ledger::{LotSource, TokenType};
use lets_db::migration::{Migrator, MigratorTrait};
use lets_db::repositories::{TokenLotStore, WalletStore};
use lets_db::{LedgerService, LedgerServiceError, UserRepository};
use lets_shared::types::UserId;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tokio::sync::{Barrier, OnceCell};
use uuid::Uuid;

static MIGRATED: OnceCell<()> = OnceCell::const_new();

async fn connect() -> Option<DatabaseConnection> {
    let Ok(url) = env::var("DATABASE_URL") else {
        eprintln!("Skipping test - DATABASE_URL not set");
        return None;
    };
    if !url.starts_with("postgres") {
        eprintln!("Skipping test - DATABASE_URL is not a Postgres url");
        return None;
    }

    let mut options = ConnectOptions::new(url);
    options.max_connections(32).sqlx_logging(false);
    let db = match Database::connect(options).await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Skipping test - database not available: {e}");
            return None;
        }
    };

    MIGRATED
        .get_or_try_init(|| Migrator::up(&db, None))
        .await
        .expect("run migrations");

    Some(db)
}

/// Creates a member whose account is old enough but who has no exchange
/// history, so they cannot draw credit.
async fn member(users: &UserRepository, name: &str) -> UserId {
    let (user, _) = users
        .create_with_wallet(
            &format!("{name}-{}@lets.test", Uuid::new_v4()),
            name,
            Utc::now() - Duration::days(60),
        )
        .await
        .expect("create member");
    UserId::from_uuid(user.id)
}

async fn wallet_units(db: &DatabaseConnection, user: UserId) -> Decimal {
    WalletStore::find_by_user(db, user)
        .await
        .expect("read wallet")
        .expect("wallet exists")
        .balance_units
}

async fn active_total(db: &DatabaseConnection, user: UserId) -> Decimal {
    TokenLotStore::list_active(db, user, None)
        .await
        .expect("list lots")
        .iter()
        .map(|lot| lot.amount)
        .sum()
}

fn error_code<T>(result: &Result<T, LedgerServiceError>) -> Option<&'static str> {
    result.as_ref().err().map(LedgerServiceError::error_code)
}

#[tokio::test]
async fn test_parallel_exchanges_spend_each_lot_once() {
    let Some(db) = connect().await else {
        return;
    };
    let users = UserRepository::new(db.clone());
    let ledger = LedgerService::new(db.clone());

    let payer = member(&users, "payer").await;
    let payees = [member(&users, "payee-a").await, member(&users, "payee-b").await];
    ledger
        .issue(payer, dec!(50), TokenType::CirculatingUnit, LotSource::Issuance, None)
        .await
        .expect("issue lot");

    const NUM_EXCHANGES: usize = 10;
    let barrier = Arc::new(Barrier::new(NUM_EXCHANGES));
    let mut handles = Vec::with_capacity(NUM_EXCHANGES);

    for i in 0..NUM_EXCHANGES {
        let ledger = ledger.clone();
        let barrier = Arc::clone(&barrier);
        let payee = payees[i % payees.len()];

        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            ledger.exchange(payer, payee, dec!(10), None).await
        }));
    }

    let results: Vec<_> = join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.expect("task panicked"))
        .collect();

    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 5, "50 Ünits cover exactly five exchanges of 10");
    for result in results.iter().filter(|r| r.is_err()) {
        assert_eq!(error_code(result), Some("INSUFFICIENT_BALANCE"));
    }

    assert_eq!(wallet_units(&db, payer).await, Decimal::ZERO);
    assert_eq!(active_total(&db, payer).await, Decimal::ZERO);

    let mut received = Decimal::ZERO;
    for payee in payees {
        let units = wallet_units(&db, payee).await;
        assert_eq!(active_total(&db, payee).await, units);
        received += units;
    }
    assert_eq!(received, dec!(50));
}

#[tokio::test]
async fn test_sweep_racing_exchange_keeps_wallet_and_lots_in_agreement() {
    let Some(db) = connect().await else {
        return;
    };
    let users = UserRepository::new(db.clone());
    let ledger = LedgerService::new(db.clone());

    const ROUNDS: usize = 10;
    for _ in 0..ROUNDS {
        let payer = member(&users, "payer").await;
        let payee = member(&users, "payee").await;
        // 30 already past expiry, 20 that never expires.
        ledger
            .issue(
                payer,
                dec!(30),
                TokenType::PromotionalUnit,
                LotSource::Reward,
                Some(Utc::now() - Duration::hours(1)),
            )
            .await
            .expect("issue expired lot");
        ledger
            .issue(payer, dec!(20), TokenType::CirculatingUnit, LotSource::Issuance, None)
            .await
            .expect("issue lot");

        let barrier = Arc::new(Barrier::new(2));
        let exchange = tokio::spawn({
            let ledger = ledger.clone();
            let barrier = Arc::clone(&barrier);
            async move {
                barrier.wait().await;
                ledger.exchange(payer, payee, dec!(40), None).await
            }
        });
        let sweep = tokio::spawn({
            let ledger = ledger.clone();
            let barrier = Arc::clone(&barrier);
            async move {
                barrier.wait().await;
                ledger.sweep_expired(payer, None).await
            }
        });

        let exchanged = exchange.await.expect("exchange task panicked");
        let swept = sweep.await.expect("sweep task panicked").expect("sweep");

        if exchanged.is_ok() {
            // The exchange drained the expiring lot before the sweep saw it.
            assert!(swept.is_empty());
            assert_eq!(wallet_units(&db, payer).await, dec!(10));
            assert_eq!(wallet_units(&db, payee).await, dec!(40));
        } else {
            assert_eq!(error_code(&exchanged), Some("INSUFFICIENT_BALANCE"));
            assert_eq!(swept.expired_count, 1);
            assert_eq!(swept.total_expired_amount, dec!(30));
            assert_eq!(wallet_units(&db, payer).await, dec!(20));
            assert_eq!(wallet_units(&db, payee).await, Decimal::ZERO);
        }
        assert_eq!(active_total(&db, payer).await, wallet_units(&db, payer).await);
        assert_eq!(active_total(&db, payee).await, wallet_units(&db, payee).await);
    }
}
