//! Settings store — a small key/value table with typed accessors.
//!
//! A stored value always wins; a missing key falls back to the service's
//! configured costing defaults (target margin) or `Settings::default()`.

use rust_decimal::Decimal;

use est_core::entities::Settings;
use est_core::enums::Currency;
use est_core::errors::CoreError;

use crate::error::DatabaseError;
use crate::helpers::{parse_decimal, parse_enum};
use crate::service::EstimateService;

impl EstimateService {
    /// Current settings. Keys absent from the table fall back to the
    /// configured costing defaults.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or a stored value does
    /// not parse.
    pub async fn get_settings(&self) -> Result<Settings, DatabaseError> {
        let mut settings = Settings {
            target_margin_percent: self.costing().target_margin_percent,
            ..Settings::default()
        };
        let mut rows = self
            .db()
            .conn()
            .query("SELECT key, value FROM settings", ())
            .await?;
        while let Some(row) = rows.next().await? {
            let key: String = row.get(0)?;
            let value: String = row.get(1)?;
            match key.as_str() {
                "target_margin_percent" => {
                    settings.target_margin_percent = parse_decimal(&value)?;
                }
                "default_currency" => {
                    settings.default_currency = parse_enum(&value)?;
                }
                other => {
                    tracing::debug!(key = other, "ignoring unknown settings key");
                }
            }
        }
        Ok(settings)
    }

    /// Update settings in one transaction. Only the fields provided are
    /// touched; nothing is persisted on failure.
    ///
    /// # Errors
    ///
    /// `CoreError::Validation` via `Core` if the target margin is negative
    /// or above 100.
    pub async fn update_settings(
        &self,
        target_margin_percent: Option<Decimal>,
        default_currency: Option<Currency>,
    ) -> Result<Settings, DatabaseError> {
        if let Some(target) = target_margin_percent {
            if target < Decimal::ZERO || target > Decimal::ONE_HUNDRED {
                return Err(CoreError::Validation(format!(
                    "target margin must be between 0 and 100, got {target}"
                ))
                .into());
            }
        }

        let tx = self.db().conn().transaction().await?;
        match Self::upsert_settings(&tx, target_margin_percent, default_currency).await {
            Ok(()) => {
                tx.commit().await?;
                tracing::debug!("settings updated");
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::error!(error = %rollback_err, "rollback failed");
                }
                return Err(e);
            }
        }
        self.get_settings().await
    }

    async fn upsert_settings(
        tx: &libsql::Transaction,
        target_margin_percent: Option<Decimal>,
        default_currency: Option<Currency>,
    ) -> Result<(), DatabaseError> {
        if let Some(target) = target_margin_percent {
            tx.execute(
                "INSERT OR REPLACE INTO settings (key, value)
                 VALUES ('target_margin_percent', ?1)",
                [target.to_string()],
            )
            .await?;
        }
        if let Some(currency) = default_currency {
            tx.execute(
                "INSERT OR REPLACE INTO settings (key, value)
                 VALUES ('default_currency', ?1)",
                [currency.as_str()],
            )
            .await?;
        }
        Ok(())
    }
}
