//! Transport trip repository
//!
//! Trips reference their stay only through `correlation_key`
//! (`BOOKING:<id>`). Every write here is a single statement guarded by its
//! `WHERE` clause, so concurrent activations of one booking flip each trip
//! at most once and never overwrite a field someone else has filled.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::error::DatabaseError;

const TRIP_COLUMNS: &str = r#"
    id, correlation_key, property_id, vehicle_type, scheduled_at, origin_address,
    destination_label, destination_lat, destination_lng, amount, currency, status,
    payment_status, payment_ref, payment_method, notes, created_at, updated_at
"#;

#[derive(Debug, Clone)]
pub struct TransportRepository {
    pool: PgPool,
}

impl TransportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Trips of one stay, oldest first
    pub async fn find_by_correlation(&self, correlation_key: &str) -> Result<Vec<TripRow>, DatabaseError> {
        let sql = format!(
            "SELECT {TRIP_COLUMNS} FROM transport_bookings WHERE correlation_key = $1 ORDER BY created_at, id"
        );
        let rows = sqlx::query_as::<_, TripRow>(&sql)
            .bind(correlation_key)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Flips waiting trips to `AWAITING_ASSIGNMENT` / `PAID`
    ///
    /// Only rows still in a pre-assignment status are touched, and rows
    /// already awaiting assignment with payment recorded are skipped.
    /// Returns the rows this statement changed, oldest first.
    pub async fn mark_paid(
        &self,
        correlation_key: &str,
        payment_ref: &str,
        payment_method: &str,
    ) -> Result<Vec<TripRow>, DatabaseError> {
        let sql = format!(
            r#"
            WITH flipped AS (
                UPDATE transport_bookings
                SET status = 'AWAITING_ASSIGNMENT',
                    payment_status = 'PAID',
                    payment_ref = $2,
                    payment_method = $3,
                    updated_at = NOW()
                WHERE correlation_key = $1
                  AND status IN ('PENDING_PAYMENT', 'AWAITING_ASSIGNMENT')
                  AND NOT (status = 'AWAITING_ASSIGNMENT' AND payment_status = 'PAID')
                RETURNING {TRIP_COLUMNS}
            )
            SELECT {TRIP_COLUMNS} FROM flipped ORDER BY created_at, id
            "#
        );
        let rows = sqlx::query_as::<_, TripRow>(&sql)
            .bind(correlation_key)
            .bind(payment_ref)
            .bind(payment_method)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Fills blank fields of one trip
    ///
    /// Each column is written only if it is still empty at update time.
    /// Notes are replaced only when empty or machine-generated.
    pub async fn backfill(&self, id: i64, fill: TripFill) -> Result<TripRow, DatabaseError> {
        let sql = format!(
            r#"
            UPDATE transport_bookings
            SET property_id = COALESCE(property_id, $2),
                vehicle_type = CASE WHEN NULLIF(BTRIM(vehicle_type), '') IS NULL
                                    THEN COALESCE($3, vehicle_type) ELSE vehicle_type END,
                scheduled_at = COALESCE(scheduled_at, $4),
                origin_address = CASE WHEN NULLIF(BTRIM(origin_address), '') IS NULL
                                      THEN COALESCE($5, origin_address) ELSE origin_address END,
                destination_label = CASE WHEN NULLIF(BTRIM(destination_label), '') IS NULL
                                         THEN COALESCE($6, destination_label) ELSE destination_label END,
                destination_lat = COALESCE(destination_lat, $7),
                destination_lng = COALESCE(destination_lng, $8),
                currency = CASE WHEN NULLIF(BTRIM(currency), '') IS NULL
                                THEN COALESCE($9, currency) ELSE currency END,
                amount = CASE WHEN amount IS NULL OR amount <= 0
                              THEN COALESCE($10, amount) ELSE amount END,
                notes = CASE WHEN NULLIF(BTRIM(notes), '') IS NULL OR BTRIM(notes) LIKE 'Auto-generated:%'
                             THEN COALESCE($11, notes) ELSE notes END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {TRIP_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, TripRow>(&sql)
            .bind(id)
            .bind(fill.property_id)
            .bind(fill.vehicle_type)
            .bind(fill.scheduled_at)
            .bind(fill.origin_address)
            .bind(fill.destination_label)
            .bind(fill.destination_lat)
            .bind(fill.destination_lng)
            .bind(fill.currency)
            .bind(fill.amount)
            .bind(fill.notes)
            .fetch_optional(&self.pool)
            .await?;

        row.ok_or_else(|| DatabaseError::not_found("TransportBooking", id))
    }
}

/// Row of the `transport_bookings` table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TripRow {
    pub id: i64,
    pub correlation_key: String,
    pub property_id: Option<i64>,
    pub vehicle_type: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub origin_address: Option<String>,
    pub destination_label: Option<String>,
    pub destination_lat: Option<f64>,
    pub destination_lng: Option<f64>,
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
    pub status: TripStatus,
    pub payment_status: TripPaymentStatus,
    pub payment_ref: Option<String>,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Candidate values for [`TransportRepository::backfill`]; `None` leaves a column alone
#[derive(Debug, Clone, Default)]
pub struct TripFill {
    pub property_id: Option<i64>,
    pub vehicle_type: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub origin_address: Option<String>,
    pub destination_label: Option<String>,
    pub destination_lat: Option<f64>,
    pub destination_lng: Option<f64>,
    pub currency: Option<String>,
    pub amount: Option<Decimal>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "trip_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TripStatus {
    PendingPayment,
    AwaitingAssignment,
    Assigned,
    InProgress,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "trip_payment_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TripPaymentStatus {
    Unpaid,
    Paid,
    Refunded,
}
