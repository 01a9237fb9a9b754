//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Ledger behaviour (retention, projections, history).
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Negative-balance eligibility thresholds.
    #[serde(default)]
    pub eligibility: EligibilityConfig,
    /// Background expiry sweeper.
    #[serde(default)]
    pub sweeper: SweeperConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Ledger configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Lifetime of a lot minted by an exchange, in days.
    #[serde(default = "default_retention_days")]
    pub retention_days: i64,
    /// Lots expiring within this many days are reported as "expiring".
    #[serde(default = "default_expiring_window_days")]
    pub expiring_window_days: i64,
    /// Default number of records returned by a history query.
    #[serde(default = "default_history_limit")]
    pub history_limit: u64,
}

fn default_retention_days() -> i64 {
    365
}

fn default_expiring_window_days() -> i64 {
    30
}

fn default_history_limit() -> u64 {
    50
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            retention_days: default_retention_days(),
            expiring_window_days: default_expiring_window_days(),
            history_limit: default_history_limit(),
        }
    }
}

/// Negative-balance eligibility thresholds.
#[derive(Debug, Clone, Deserialize)]
pub struct EligibilityConfig {
    /// Minimum account age, in days.
    #[serde(default = "default_min_account_age_days")]
    pub min_account_age_days: i64,
    /// Minimum number of committed exchanges.
    #[serde(default = "default_min_successful_transactions")]
    pub min_successful_transactions: u64,
    /// Lowest balance an eligible member may reach (zero or negative).
    #[serde(default = "default_max_negative_balance")]
    pub max_negative_balance: Decimal,
}

fn default_min_account_age_days() -> i64 {
    30
}

fn default_min_successful_transactions() -> u64 {
    5
}

fn default_max_negative_balance() -> Decimal {
    Decimal::from(-100)
}

impl Default for EligibilityConfig {
    fn default() -> Self {
        Self {
            min_account_age_days: default_min_account_age_days(),
            min_successful_transactions: default_min_successful_transactions(),
            max_negative_balance: default_max_negative_balance(),
        }
    }
}

/// Background sweeper configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SweeperConfig {
    /// Seconds between two batch sweeps.
    #[serde(default = "default_sweep_interval_secs")]
    pub interval_secs: u64,
}

fn default_sweep_interval_secs() -> u64 {
    3600
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("LETS").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_load_applies_defaults() {
        temp_env::with_vars(
            [
                ("LETS__DATABASE__URL", Some("sqlite::memory:")),
                ("LETS__LEDGER__RETENTION_DAYS", None::<&str>),
                ("RUN_MODE", None),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.database.url, "sqlite::memory:");
                assert_eq!(config.database.max_connections, 10);
                assert_eq!(config.ledger.retention_days, 365);
                assert_eq!(config.ledger.expiring_window_days, 30);
                assert_eq!(config.ledger.history_limit, 50);
                assert_eq!(config.eligibility.min_account_age_days, 30);
                assert_eq!(config.eligibility.min_successful_transactions, 5);
                assert_eq!(config.eligibility.max_negative_balance, dec!(-100));
                assert_eq!(config.sweeper.interval_secs, 3600);
            },
        );
    }

    #[test]
    fn test_load_reads_environment_overrides() {
        temp_env::with_vars(
            [
                ("LETS__DATABASE__URL", Some("postgres://localhost/lets")),
                ("LETS__LEDGER__RETENTION_DAYS", Some("90")),
                ("LETS__ELIGIBILITY__MAX_NEGATIVE_BALANCE", Some("-250")),
                ("RUN_MODE", None),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.ledger.retention_days, 90);
                assert_eq!(config.eligibility.max_negative_balance, dec!(-250));
            },
        );
    }

    #[test]
    fn test_load_requires_database_url() {
        temp_env::with_vars(
            [("LETS__DATABASE__URL", None::<&str>), ("RUN_MODE", None)],
            || {
                assert!(AppConfig::load().is_err());
            },
        );
    }
}
