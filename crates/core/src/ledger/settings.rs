//! Runtime knobs of the ledger engine.

use chrono::Duration;
use lets_shared::config::LedgerConfig;

/// Ledger engine settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerSettings {
    /// Lifetime of a lot minted by an exchange, in days.
    pub retention_days: i64,
    /// Window used by the balance projection, in days.
    pub expiring_window_days: i64,
    /// Default history page size.
    pub history_limit: u64,
}

impl LedgerSettings {
    /// Lifetime of a minted lot.
    #[must_use]
    pub fn retention(&self) -> Duration {
        Duration::days(self.retention_days)
    }
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self::from(&LedgerConfig::default())
    }
}

impl From<&LedgerConfig> for LedgerSettings {
    fn from(config: &LedgerConfig) -> Self {
        Self {
            retention_days: config.retention_days,
            expiring_window_days: config.expiring_window_days,
            history_limit: config.history_limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = LedgerSettings::default();
        assert_eq!(settings.retention_days, 365);
        assert_eq!(settings.expiring_window_days, 30);
        assert_eq!(settings.history_limit, 50);
        assert_eq!(settings.retention(), Duration::days(365));
    }
}
