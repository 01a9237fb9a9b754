//! LETS expiry sweeper
//!
//! Periodically retires every active lot whose expiry has passed and
//! reconciles the owners' wallets.

use std::time::Duration;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lets_db::{LedgerService, connect_with};
use lets_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lets=info,sweeper=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;

    let db = connect_with(&config.database).await?;
    info!("Connected to database");

    let ledger = LedgerService::from_config(db, &config);
    // A zero period would make the interval panic.
    let interval_secs = config.sweeper.interval_secs.max(1);
    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
    info!(interval_secs, "Sweeper started");

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => run_once(&ledger).await,
            () = &mut shutdown => break,
        }
    }

    info!("Sweeper stopped");
    Ok(())
}

async fn run_once(ledger: &LedgerService) {
    match ledger.sweep_all_due().await {
        Ok(report) => info!(
            users_swept = report.users_swept,
            expired_count = report.expired_count,
            total_expired_amount = %report.total_expired_amount,
            failures = report.failures,
            "Sweep pass finished"
        ),
        Err(e) => error!(error = %e, "Sweep pass failed"),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
