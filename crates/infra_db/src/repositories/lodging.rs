//! Bookings and properties
//!
//! Both tables are owned by the booking flow; settlement only reads them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::PgPool;

use crate::error::DatabaseError;

/// Read access to bookings and the properties they reference
#[derive(Debug, Clone)]
pub struct LodgingRepository {
    pool: PgPool,
}

impl LodgingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_booking(&self, id: i64) -> Result<Option<BookingRow>, DatabaseError> {
        let row = sqlx::query_as::<_, BookingRow>(
            r#"
            SELECT id, property_id, check_in, check_out, rooms, total_amount,
                   include_transport, transport_fare, transport_origin_address,
                   transport_vehicle_type, transport_scheduled_at, notes, created_at
            FROM bookings
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn find_property(&self, id: i64) -> Result<Option<PropertyRow>, DatabaseError> {
        let row = sqlx::query_as::<_, PropertyRow>(
            r#"
            SELECT id, owner_id, title, status, currency, street, ward, district,
                   region, city, latitude, longitude, base_price, services, created_at
            FROM properties
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }
}

/// Row of the `bookings` table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BookingRow {
    pub id: i64,
    pub property_id: i64,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    pub rooms: i32,
    pub total_amount: Option<Decimal>,
    pub include_transport: bool,
    pub transport_fare: Option<Decimal>,
    pub transport_origin_address: Option<String>,
    pub transport_vehicle_type: Option<String>,
    pub transport_scheduled_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Row of the `properties` table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PropertyRow {
    pub id: i64,
    pub owner_id: i64,
    pub title: String,
    pub status: PropertyStatus,
    pub currency: String,
    pub street: Option<String>,
    pub ward: Option<String>,
    pub district: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub base_price: Option<Decimal>,
    /// Free-form JSON; older rows hold a JSON-encoded string
    pub services: Option<Value>,
    pub created_at: DateTime<Utc>,
}

/// Listing lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "property_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyStatus {
    Draft,
    Pending,
    Approved,
    Rejected,
    Suspended,
}
