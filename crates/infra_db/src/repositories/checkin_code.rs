//! Check-in code repository

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::DatabaseError;

#[derive(Debug, Clone)]
pub struct CheckinCodeRepository {
    pool: PgPool,
}

impl CheckinCodeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_booking(&self, booking_id: i64) -> Result<Option<CheckinCodeRow>, DatabaseError> {
        let row = sqlx::query_as::<_, CheckinCodeRow>(
            r#"
            SELECT id, booking_id, code, code_hash, status, generated_at
            FROM checkin_codes
            WHERE booking_id = $1
            "#,
        )
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Inserts a code
    ///
    /// A taken code or a booking that already has one fails with
    /// `DatabaseError::DuplicateEntry`.
    pub async fn insert(&self, code: NewCheckinCodeRow) -> Result<CheckinCodeRow, DatabaseError> {
        let row = sqlx::query_as::<_, CheckinCodeRow>(
            r#"
            INSERT INTO checkin_codes (booking_id, code, code_hash, status, generated_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, booking_id, code, code_hash, status, generated_at
            "#,
        )
        .bind(code.booking_id)
        .bind(&code.code)
        .bind(&code.code_hash)
        .bind(code.status)
        .bind(code.generated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CheckinCodeRow {
    pub id: i64,
    pub booking_id: i64,
    pub code: String,
    pub code_hash: String,
    pub status: CheckinCodeStatus,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCheckinCodeRow {
    pub booking_id: i64,
    pub code: String,
    pub code_hash: String,
    pub status: CheckinCodeStatus,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "checkin_code_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckinCodeStatus {
    Active,
    Used,
    Revoked,
}
