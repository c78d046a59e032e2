//! Marketplace-wide settings
//!
//! `system_settings` holds a single row with `id = 1`. It is created on
//! first read with the configured default.

use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::error::DatabaseError;

const SETTINGS_ROW_ID: i32 = 1;

#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: PgPool,
}

impl SettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Reads the global commission percent, seeding the row if absent
    pub async fn commission_percent_or_seed(&self, default: Decimal) -> Result<Decimal, DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO system_settings (id, default_commission_percent)
            VALUES ($1, $2)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(SETTINGS_ROW_ID)
        .bind(default)
        .execute(&self.pool)
        .await?;

        let percent = sqlx::query_scalar::<_, Decimal>(
            "SELECT default_commission_percent FROM system_settings WHERE id = $1",
        )
        .bind(SETTINGS_ROW_ID)
        .fetch_one(&self.pool)
        .await?;

        Ok(percent)
    }
}
