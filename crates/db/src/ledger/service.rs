//! Ledger engine: exchange, expiry sweep, issuance and read models.
//!
//! Every mutating operation samples the clock once, opens one database
//! transaction, locks the wallets of every member it touches (ascending user
//! id), and commits at the end. Returning early with an error, or dropping
//! the future before commit, rolls everything back.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use lets_core::clock::{Clock, SystemClock};
use lets_core::ledger::{
    AccountStanding, BalanceReport, BatchSweepReport, Eligibility, EligibilityPolicy,
    EligibilityReport, HistoryEntry, LedgerError, LedgerSettings, LedgerTransaction,
    LotBalanceSummary, LotSource, LotStatus, SweepOutcome, ThresholdPolicy, TokenLot, TokenType,
    TransactionMetadata, WalletBalance, account_age_days, exchange_description,
    expiry_description, issuance_description, quote_exchange, requires_credit, select_expired,
    validate_amount,
};
use lets_shared::AppConfig;
use lets_shared::types::{Currency, UserId};
use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use tracing::{debug, info, instrument, warn};

use super::error::LedgerServiceError;
use crate::entities::users;
use crate::repositories::{
    NewLot, NewTransaction, TokenLotStore, TransactionStore, WalletStore, require_user,
};

/// Result of an issuance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issuance {
    /// Minted lot.
    pub lot: TokenLot,
    /// `ADJUSTMENT` record.
    pub transaction: LedgerTransaction,
}

/// Persistence-backed ledger.
#[derive(Clone)]
pub struct LedgerService {
    db: DatabaseConnection,
    clock: Arc<dyn Clock>,
    policy: Arc<dyn EligibilityPolicy>,
    settings: LedgerSettings,
}

impl std::fmt::Debug for LedgerService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerService")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl LedgerService {
    /// Creates a ledger on the system clock with the default policy and
    /// settings.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            clock: Arc::new(SystemClock),
            policy: Arc::new(ThresholdPolicy::default()),
            settings: LedgerSettings::default(),
        }
    }

    /// Creates a ledger configured from `config`.
    #[must_use]
    pub fn from_config(db: DatabaseConnection, config: &AppConfig) -> Self {
        Self::new(db)
            .with_policy(Arc::new(ThresholdPolicy::from(&config.eligibility)))
            .with_settings(LedgerSettings::from(&config.ledger))
    }

    /// Replaces the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the eligibility policy.
    #[must_use]
    pub fn with_policy(mut self, policy: Arc<dyn EligibilityPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Replaces the settings.
    #[must_use]
    pub const fn with_settings(mut self, settings: LedgerSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Returns the settings in use.
    #[must_use]
    pub const fn settings(&self) -> &LedgerSettings {
        &self.settings
    }

    /// Balance report projected from the member's active lots.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown member.
    pub async fn get_balance(
        &self,
        user_id: UserId,
        token_type: Option<TokenType>,
    ) -> Result<BalanceReport, LedgerServiceError> {
        let now = self.clock.now();
        require_user(&self.db, user_id).await?;

        let wallet = WalletStore::find_by_user(&self.db, user_id).await?;
        let lots = TokenLotStore::list_active(&self.db, user_id, token_type).await?;

        Ok(BalanceReport {
            user_id,
            token_type,
            wallet: wallet.as_ref().map(WalletBalance::from),
            lots: LotBalanceSummary::project(&lots, now, self.settings.expiring_window_days),
        })
    }

    /// Moves `amount` Ünits from `from` to `to`.
    ///
    /// Lots are consumed soonest-expiry first; any part they cannot cover is
    /// drawn from the payer's negative-balance allowance. The payee receives
    /// a fresh circulating lot expiring after the retention period.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAmount`, `SelfExchange`, `NotFound`, `MissingWallet`
    /// or `InsufficientBalance`; store failures surface as `Database`. Nothing
    /// is written on error.
    #[instrument(skip(self, description), fields(from = %from, to = %to, amount = %amount))]
    pub async fn exchange(
        &self,
        from: UserId,
        to: UserId,
        amount: Decimal,
        description: Option<String>,
    ) -> Result<LedgerTransaction, LedgerServiceError> {
        validate_amount(amount)?;
        if from == to {
            warn!("rejected self exchange");
            return Err(LedgerError::SelfExchange(from).into());
        }

        let now = self.clock.now();
        let txn = self.db.begin().await?;

        let payer = require_user(&txn, from).await?;
        require_user(&txn, to).await?;

        // Ascending user-id order, one wallet per member.
        let wallets = WalletStore::lock(&txn, &[from, to]).await?;
        let (payer_wallet, payee_wallet) = if from < to {
            (&wallets[0], &wallets[1])
        } else {
            (&wallets[1], &wallets[0])
        };

        let lots = TokenLotStore::list_active(&txn, from, None).await?;
        let eligibility = if requires_credit(&lots, amount) {
            Some(self.evaluate(&txn, &payer, now).await?)
        } else {
            None
        };

        let quote = match quote_exchange(
            &lots,
            payer_wallet.balance_units,
            amount,
            eligibility.as_ref(),
        ) {
            Ok(quote) => quote,
            Err(err) => {
                warn!(error = %err, "exchange rejected");
                return Err(err.into());
            }
        };
        debug!(
            deductions = quote.consumption.deductions.len(),
            credit_drawn = %quote.credit_drawn,
            "exchange quoted"
        );

        for deduction in &quote.consumption.deductions {
            if deduction.fully_consumed {
                TokenLotStore::retire(&txn, deduction.lot_id, LotStatus::Used, now).await?;
            } else {
                TokenLotStore::reduce(&txn, deduction.lot_id, deduction.amount_to_deduct, now)
                    .await?;
            }
        }

        WalletStore::adjust_units(&txn, from, -amount, now).await?;
        WalletStore::adjust_units(&txn, to, amount, now).await?;

        let minted = TokenLotStore::create(
            &txn,
            NewLot {
                user_id: to,
                amount,
                token_type: TokenType::CirculatingUnit,
                source: LotSource::Conversion,
                expires_at: Some(now + self.settings.retention()),
            },
            now,
        )
        .await?;

        let record = TransactionStore::append(
            &txn,
            NewTransaction {
                from_user_id: from,
                to_user_id: to,
                from_wallet_id: payer_wallet.id,
                to_wallet_id: payee_wallet.id,
                amount,
                currency: Currency::Units,
                description: description.unwrap_or_else(|| exchange_description(amount)),
                metadata: TransactionMetadata::exchange(
                    &quote.consumption,
                    minted.id,
                    quote.credit_drawn,
                ),
            },
            now,
        )
        .await?;

        txn.commit().await?;

        info!(transaction_id = %record.id, credit_drawn = %quote.credit_drawn, "exchange committed");
        Ok(record)
    }

    /// Retires the member's active lots whose expiry has passed and lowers
    /// the wallet by their sum. Returns zeros, writing nothing, when no lot
    /// is due.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `MissingWallet`; store failures surface as
    /// `Database`.
    #[instrument(skip(self), fields(user = %user_id))]
    pub async fn sweep_expired(
        &self,
        user_id: UserId,
        token_type: Option<TokenType>,
    ) -> Result<SweepOutcome, LedgerServiceError> {
        let now = self.clock.now();
        let txn = self.db.begin().await?;

        require_user(&txn, user_id).await?;
        let wallets = WalletStore::lock(&txn, &[user_id]).await?;
        let Some(wallet) = wallets.first() else {
            return Err(LedgerError::MissingWallet(user_id).into());
        };

        let lots = TokenLotStore::list_active(&txn, user_id, token_type).await?;
        let due = select_expired(&lots, now, token_type);
        let outcome = SweepOutcome::from_lots(&due);
        if outcome.is_empty() {
            txn.commit().await?;
            debug!("nothing to sweep");
            return Ok(outcome);
        }

        for lot_id in &outcome.lot_ids {
            TokenLotStore::retire(&txn, *lot_id, LotStatus::Expired, now).await?;
        }
        WalletStore::adjust_units(&txn, user_id, -outcome.total_expired_amount, now).await?;

        TransactionStore::append(
            &txn,
            NewTransaction {
                from_user_id: user_id,
                to_user_id: user_id,
                from_wallet_id: wallet.id,
                to_wallet_id: wallet.id,
                amount: outcome.total_expired_amount,
                currency: Currency::Units,
                description: expiry_description(outcome.expired_count),
                metadata: TransactionMetadata::Expire {
                    lot_ids: outcome.lot_ids.clone(),
                },
            },
            now,
        )
        .await?;

        txn.commit().await?;

        info!(
            expired_count = outcome.expired_count,
            total = %outcome.total_expired_amount,
            "expired lots swept"
        );
        Ok(outcome)
    }

    /// Sweeps every member holding a due lot, each in its own transaction.
    ///
    /// A failing member is logged and counted; the others still run.
    ///
    /// # Errors
    ///
    /// Returns an error only if the due members cannot be listed.
    #[instrument(skip(self))]
    pub async fn sweep_all_due(&self) -> Result<BatchSweepReport, LedgerServiceError> {
        let now = self.clock.now();
        let users = TokenLotStore::users_with_due_lots(&self.db, now).await?;

        let mut report = BatchSweepReport::default();
        for user_id in users {
            match self.sweep_expired(user_id, None).await {
                Ok(outcome) => report.record(&outcome),
                Err(err) => {
                    warn!(user = %user_id, error = %err, "member sweep failed");
                    report.record_failure();
                }
            }
        }

        info!(
            users_swept = report.users_swept,
            expired_count = report.expired_count,
            failures = report.failures,
            "batch sweep finished"
        );
        Ok(report)
    }

    /// Whether the member may go below zero, with the facts behind it.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown member.
    pub async fn check_negative_balance_eligibility(
        &self,
        user_id: UserId,
    ) -> Result<EligibilityReport, LedgerServiceError> {
        let now = self.clock.now();
        let user = require_user(&self.db, user_id).await?;

        let standing = standing(&self.db, &user, now).await?;
        let eligibility = self.policy.evaluate(&standing);
        let balance = WalletStore::find_by_user(&self.db, user_id)
            .await?
            .map_or(Decimal::ZERO, |w| w.balance_units);

        Ok(EligibilityReport::new(user_id, standing, eligibility, balance))
    }

    /// The member's most recent transactions, newest first.
    ///
    /// `limit` defaults to the configured history limit.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown member.
    pub async fn history(
        &self,
        user_id: UserId,
        limit: Option<u64>,
    ) -> Result<Vec<HistoryEntry>, LedgerServiceError> {
        require_user(&self.db, user_id).await?;

        let limit = limit.unwrap_or(self.settings.history_limit);
        let records = TransactionStore::history(&self.db, user_id, limit).await?;

        Ok(records
            .into_iter()
            .map(|record| HistoryEntry::for_user(user_id, record))
            .collect())
    }

    /// Mints a lot for the member, credits the wallet and records an
    /// `ADJUSTMENT`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAmount`, `NotFound` or `MissingWallet`.
    #[instrument(skip(self), fields(user = %user_id, amount = %amount))]
    pub async fn issue(
        &self,
        user_id: UserId,
        amount: Decimal,
        token_type: TokenType,
        source: LotSource,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<Issuance, LedgerServiceError> {
        validate_amount(amount)?;

        let now = self.clock.now();
        let txn = self.db.begin().await?;

        require_user(&txn, user_id).await?;
        let wallets = WalletStore::lock(&txn, &[user_id]).await?;
        let Some(wallet) = wallets.first() else {
            return Err(LedgerError::MissingWallet(user_id).into());
        };

        let lot = TokenLotStore::create(
            &txn,
            NewLot {
                user_id,
                amount,
                token_type,
                source,
                expires_at,
            },
            now,
        )
        .await?;
        WalletStore::adjust_units(&txn, user_id, amount, now).await?;

        let transaction = TransactionStore::append(
            &txn,
            NewTransaction {
                from_user_id: user_id,
                to_user_id: user_id,
                from_wallet_id: wallet.id,
                to_wallet_id: wallet.id,
                amount,
                currency: Currency::Units,
                description: issuance_description(amount, token_type),
                metadata: TransactionMetadata::Adjustment {
                    lot_id: lot.id,
                    token_type,
                    lot_source: source,
                },
            },
            now,
        )
        .await?;

        txn.commit().await?;

        info!(lot_id = %lot.id, "lot issued");
        Ok(Issuance { lot, transaction })
    }

    async fn evaluate<C: ConnectionTrait>(
        &self,
        conn: &C,
        user: &users::Model,
        now: DateTime<Utc>,
    ) -> Result<Eligibility, LedgerServiceError> {
        let standing = standing(conn, user, now).await?;
        let eligibility = self.policy.evaluate(&standing);
        debug!(
            is_eligible = eligibility.is_eligible,
            account_age_days = standing.account_age_days,
            successful_transactions = standing.successful_transaction_count,
            "eligibility evaluated"
        );
        Ok(eligibility)
    }
}

async fn standing<C: ConnectionTrait>(
    conn: &C,
    user: &users::Model,
    now: DateTime<Utc>,
) -> Result<AccountStanding, LedgerServiceError> {
    let user_id = UserId::from_uuid(user.id);
    Ok(AccountStanding {
        account_age_days: account_age_days(user.created_at, now),
        successful_transaction_count: TransactionStore::count_successful_exchanges(conn, user_id)
            .await?,
    })
}
