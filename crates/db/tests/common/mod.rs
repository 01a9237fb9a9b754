//! Shared harness: an in-memory SQLite ledger on a fixed clock.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use lets_core::clock::FixedClock;
use lets_core::ledger::{LotSource, TokenLot, TokenType};
use lets_db::migration::{Migrator, MigratorTrait};
use lets_db::repositories::{TokenLotStore, WalletStore};
use lets_db::{LedgerService, UserRepository};
use lets_shared::types::UserId;
use rust_decimal::Decimal;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

/// Instant the test clock starts at.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
}

pub struct TestLedger {
    pub db: DatabaseConnection,
    pub clock: Arc<FixedClock>,
    pub ledger: LedgerService,
    pub users: UserRepository,
}

pub async fn setup() -> TestLedger {
    let mut options = ConnectOptions::new("sqlite::memory:");
    // One connection: a second one would open a different in-memory database.
    options.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(options).await.expect("connect sqlite");
    Migrator::up(&db, None).await.expect("run migrations");

    let clock = Arc::new(FixedClock::new(t0()));
    let ledger = LedgerService::new(db.clone()).with_clock(clock.clone());
    let users = UserRepository::new(db.clone());

    TestLedger {
        db,
        clock,
        ledger,
        users,
    }
}

impl TestLedger {
    /// Creates a member with a wallet whose account is `age_days` old.
    pub async fn member(&self, name: &str, age_days: i64) -> UserId {
        let (user, _) = self
            .users
            .create_with_wallet(
                &format!("{name}@lets.test"),
                name,
                t0() - Duration::days(age_days),
            )
            .await
            .expect("create member");
        UserId::from_uuid(user.id)
    }

    /// Creates a member without a wallet.
    pub async fn member_without_wallet(&self, name: &str) -> UserId {
        let user = self
            .users
            .create(&format!("{name}@lets.test"), name, t0() - Duration::days(100))
            .await
            .expect("create member");
        UserId::from_uuid(user.id)
    }

    /// Issues a circulating lot, optionally expiring `days` from now.
    pub async fn grant(&self, user: UserId, amount: Decimal, days: Option<i64>) -> TokenLot {
        self.grant_typed(user, amount, TokenType::CirculatingUnit, days).await
    }

    pub async fn grant_typed(
        &self,
        user: UserId,
        amount: Decimal,
        token_type: TokenType,
        days: Option<i64>,
    ) -> TokenLot {
        let expires_at = days.map(|d| self.now() + Duration::days(d));
        self.ledger
            .issue(user, amount, token_type, LotSource::Issuance, expires_at)
            .await
            .expect("issue lot")
            .lot
    }

    pub fn now(&self) -> DateTime<Utc> {
        use lets_core::clock::Clock;
        self.clock.now()
    }

    pub async fn wallet_units(&self, user: UserId) -> Decimal {
        WalletStore::find_by_user(&self.db, user)
            .await
            .expect("read wallet")
            .expect("wallet exists")
            .balance_units
    }

    pub async fn active_lots(&self, user: UserId) -> Vec<TokenLot> {
        TokenLotStore::list_active(&self.db, user, None)
            .await
            .expect("list lots")
    }

    pub async fn active_total(&self, user: UserId) -> Decimal {
        self.active_lots(user).await.iter().map(|lot| lot.amount).sum()
    }

    pub async fn lot(&self, lot: &TokenLot) -> TokenLot {
        TokenLotStore::find(&self.db, lot.id)
            .await
            .expect("read lot")
            .expect("lot exists")
    }

    /// Gives `user` five committed exchanges with a throwaway partner.
    pub async fn build_history(&self, user: UserId, partner: UserId) {
        self.grant(partner, Decimal::from(5), None).await;
        for _ in 0..5 {
            self.ledger
                .exchange(partner, user, Decimal::ONE, None)
                .await
                .expect("history exchange");
        }
    }
}
