//! Database seeder for LETS ledger development and testing.
//!
//! Seeds a handful of demo members with wallets, issues them opening lots
//! of each token type, and runs a first exchange between two of them.
//! Members that already exist are left untouched, so the seeder can be run
//! repeatedly.
//!
//! Usage: cargo run --bin seeder

use chrono::{Duration, Utc};
use lets_core::ledger::{LotSource, TokenType};
use lets_db::{LedgerService, UserRepository, connect_with};
use lets_shared::AppConfig;
use lets_shared::types::UserId;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::info;

/// Demo members: email, display name, account age in days.
const MEMBERS: [(&str, &str, i64); 3] = [
    ("alice@lets.local", "Alice", 120),
    ("bob@lets.local", "Bob", 45),
    ("carol@lets.local", "Carol", 3),
];

/// Opening lots: token type, source, amount, lifetime in days.
const OPENING_LOTS: [(TokenType, LotSource, Decimal, Option<i64>); 3] = [
    (TokenType::SubscriptionUnit, LotSource::Issuance, dec!(100), Some(30)),
    (TokenType::PromotionalUnit, LotSource::Reward, dec!(25), Some(7)),
    (TokenType::CirculatingUnit, LotSource::Issuance, dec!(50), None),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lets=info,seeder=info".into()),
        )
        .init();

    let config = AppConfig::load()?;

    info!("Connecting to database...");
    let db = connect_with(&config.database).await?;
    let users = UserRepository::new(db.clone());
    let ledger = LedgerService::from_config(db, &config);

    info!("Seeding members...");
    let mut seeded = Vec::new();
    for (email, name, age_days) in MEMBERS {
        if let Some(existing) = users.find_by_email(email).await? {
            info!(email, user_id = %existing.id, "member already exists, skipping");
            continue;
        }
        let (user, _wallet) = users
            .create_with_wallet(email, name, Utc::now() - Duration::days(age_days))
            .await?;
        seeded.push(UserId::from_uuid(user.id));
        info!(email, user_id = %user.id, "member created");
    }

    info!("Issuing opening lots...");
    for &user_id in &seeded {
        for (token_type, source, amount, lifetime) in OPENING_LOTS {
            let expires_at = lifetime.map(|days| Utc::now() + Duration::days(days));
            let issued = ledger
                .issue(user_id, amount, token_type, source, expires_at)
                .await?;
            info!(%user_id, lot_id = %issued.lot.id, %amount, %token_type, "lot issued");
        }
    }

    if let [alice, bob, ..] = seeded[..] {
        info!("Running a first exchange...");
        let tx = ledger
            .exchange(alice, bob, dec!(40), Some("Seeded garden help".to_string()))
            .await?;
        info!(transaction_id = %tx.id, amount = %tx.amount, "exchange committed");
    }

    info!("Seeding complete!");
    Ok(())
}
