//! PostgreSQL check-in code adapter

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{
    BookingId, CheckinCodeId, DomainPort, HealthCheckResult, HealthCheckable, PortError,
};
use domain_billing::{CheckinCode, CheckinCodePort, CheckinCodeStatus, NewCheckinCode};

use crate::repositories::checkin_code::{
    CheckinCodeRepository, CheckinCodeRow, CheckinCodeStatus as DbCheckinCodeStatus, NewCheckinCodeRow,
};

#[derive(Debug, Clone)]
pub struct PostgresCheckinCodeAdapter {
    repository: CheckinCodeRepository,
    pool: PgPool,
}

impl PostgresCheckinCodeAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: CheckinCodeRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresCheckinCodeAdapter {}

#[async_trait]
impl HealthCheckable for PostgresCheckinCodeAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        super::probe(&self.pool, "postgres-checkin-code-adapter").await
    }
}

#[async_trait]
impl CheckinCodePort for PostgresCheckinCodeAdapter {
    #[instrument(skip(self), fields(booking_id = %booking_id))]
    async fn find_by_booking(&self, booking_id: BookingId) -> Result<Option<CheckinCode>, PortError> {
        let row = self.repository.find_by_booking(booking_id.value()).await?;
        Ok(row.map(row_to_code))
    }

    #[instrument(skip(self, code), fields(booking_id = %code.booking_id))]
    async fn insert(&self, code: NewCheckinCode) -> Result<CheckinCode, PortError> {
        debug!("Inserting check-in code");
        let row = self
            .repository
            .insert(NewCheckinCodeRow {
                booking_id: code.booking_id.value(),
                code: code.code,
                code_hash: code.code_hash,
                status: code.status.into(),
                generated_at: code.generated_at,
            })
            .await?;
        Ok(row_to_code(row))
    }
}

fn row_to_code(row: CheckinCodeRow) -> CheckinCode {
    CheckinCode {
        id: CheckinCodeId::new(row.id),
        booking_id: BookingId::new(row.booking_id),
        code: row.code,
        code_hash: row.code_hash,
        status: match row.status {
            DbCheckinCodeStatus::Active => CheckinCodeStatus::Active,
            DbCheckinCodeStatus::Used => CheckinCodeStatus::Used,
            DbCheckinCodeStatus::Revoked => CheckinCodeStatus::Revoked,
        },
        generated_at: row.generated_at,
    }
}

impl From<CheckinCodeStatus> for DbCheckinCodeStatus {
    fn from(status: CheckinCodeStatus) -> Self {
        match status {
            CheckinCodeStatus::Active => DbCheckinCodeStatus::Active,
            CheckinCodeStatus::Used => DbCheckinCodeStatus::Used,
            CheckinCodeStatus::Revoked => DbCheckinCodeStatus::Revoked,
        }
    }
}
