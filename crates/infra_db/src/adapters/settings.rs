//! PostgreSQL commission settings adapter

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;

use core_kernel::{DomainPort, HealthCheckResult, HealthCheckable, Percentage, PortError};
use domain_billing::CommissionSettingsPort;

use crate::repositories::SettingsRepository;

#[derive(Debug, Clone)]
pub struct PostgresSettingsAdapter {
    repository: SettingsRepository,
    pool: PgPool,
}

impl PostgresSettingsAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: SettingsRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresSettingsAdapter {}

#[async_trait]
impl HealthCheckable for PostgresSettingsAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        super::probe(&self.pool, "postgres-settings-adapter").await
    }
}

#[async_trait]
impl CommissionSettingsPort for PostgresSettingsAdapter {
    #[instrument(skip(self), fields(default = %default))]
    async fn global_commission_percent(&self, default: Percentage) -> Result<Decimal, PortError> {
        let percent = self.repository.commission_percent_or_seed(default.value()).await?;
        Ok(percent)
    }
}
