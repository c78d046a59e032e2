//! Database Test Utilities
//!
//! Starts PostgreSQL in a testcontainer, applies the workspace migrations
//! and seeds the rows the settlement pipeline reads.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use testcontainers::{
    core::{IntoContainerPort, WaitFor},
    runners::AsyncRunner,
    ContainerAsync, GenericImage, ImageExt,
};
use tokio::sync::OnceCell;

use core_kernel::{BookingId, InvoiceId, PropertyId, TransportBookingId};
use domain_booking::{Booking, Property, TransportBooking};

type TestResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

const POSTGRES_IMAGE: &str = "postgres";
const POSTGRES_TAG: &str = "16-alpine";
const POSTGRES_USER: &str = "test_user";
const POSTGRES_PASSWORD: &str = "test_password";
const POSTGRES_DB: &str = "settlement_test";

/// Connection settings for the test database
#[derive(Debug, Clone)]
pub struct TestDatabaseConfig {
    pub user: String,
    pub password: String,
    pub database: String,
    pub host: String,
    pub port: u16,
}

impl Default for TestDatabaseConfig {
    fn default() -> Self {
        Self {
            user: POSTGRES_USER.to_string(),
            password: POSTGRES_PASSWORD.to_string(),
            database: POSTGRES_DB.to_string(),
            host: "localhost".to_string(),
            port: 5432,
        }
    }
}

impl TestDatabaseConfig {
    pub fn connection_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.database
        )
    }
}

/// A migrated PostgreSQL container
pub struct TestDatabase {
    _container: ContainerAsync<GenericImage>,
    pub config: TestDatabaseConfig,
    pub pool: PgPool,
}

impl TestDatabase {
    /// Starts a container and applies the migrations
    pub async fn new() -> TestResult<Self> {
        let container = GenericImage::new(POSTGRES_IMAGE, POSTGRES_TAG)
            .with_exposed_port(5432.tcp())
            .with_wait_for(WaitFor::message_on_stderr("database system is ready to accept connections"))
            .with_env_var("POSTGRES_USER", POSTGRES_USER)
            .with_env_var("POSTGRES_PASSWORD", POSTGRES_PASSWORD)
            .with_env_var("POSTGRES_DB", POSTGRES_DB)
            .start()
            .await?;

        let port = container.get_host_port_ipv4(5432).await?;
        let host = container.get_host().await?.to_string();

        let config = TestDatabaseConfig {
            host,
            port,
            ..TestDatabaseConfig::default()
        };

        // Concurrency tests need more than one connection.
        let pool = PgPoolOptions::new()
            .max_connections(16)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&config.connection_url())
            .await?;

        infra_db::run_migrations(&pool).await?;

        Ok(Self {
            _container: container,
            config,
            pool,
        })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Empties every settlement table, keeping the schema
    pub async fn clear_data(&self) -> TestResult<()> {
        sqlx::query(
            "TRUNCATE TABLE invoices, checkin_codes, transport_bookings, bookings, properties, system_settings \
             RESTART IDENTITY CASCADE",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Inserts a property; the builder's id is ignored
    pub async fn seed_property(&self, property: &Property) -> TestResult<PropertyId> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO properties (
                owner_id, title, status, currency, street, ward, district, region, city,
                latitude, longitude, base_price, services
            ) VALUES ($1, $2, $3::property_status, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING id
            "#,
        )
        .bind(property.owner_id.value())
        .bind(&property.title)
        .bind(property.status.as_str())
        .bind(&property.currency)
        .bind(&property.street)
        .bind(&property.ward)
        .bind(&property.district)
        .bind(&property.region)
        .bind(&property.city)
        .bind(property.latitude)
        .bind(property.longitude)
        .bind(property.base_price)
        .bind(&property.services.0)
        .fetch_one(&self.pool)
        .await?;
        Ok(PropertyId::new(id))
    }

    /// Inserts a booking; the builder's id is ignored
    pub async fn seed_booking(&self, booking: &Booking) -> TestResult<BookingId> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO bookings (
                property_id, check_in, check_out, rooms, total_amount, include_transport,
                transport_fare, transport_origin_address, transport_vehicle_type,
                transport_scheduled_at, notes
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id
            "#,
        )
        .bind(booking.property_id.value())
        .bind(booking.check_in)
        .bind(booking.check_out)
        .bind(booking.rooms)
        .bind(booking.total_amount)
        .bind(booking.include_transport)
        .bind(booking.transport_fare)
        .bind(&booking.transport_origin_address)
        .bind(&booking.transport_vehicle_type)
        .bind(booking.transport_scheduled_at)
        .bind(&booking.notes)
        .fetch_one(&self.pool)
        .await?;
        Ok(BookingId::new(id))
    }

    /// Inserts a trip; the builder's id is ignored
    pub async fn seed_trip(&self, trip: &TransportBooking) -> TestResult<TransportBookingId> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO transport_bookings (
                correlation_key, property_id, vehicle_type, scheduled_at, origin_address,
                destination_label, destination_lat, destination_lng, amount, currency,
                status, payment_status, payment_ref, payment_method, notes, created_at
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                $11::trip_status, $12::trip_payment_status, $13, $14, $15, $16
            )
            RETURNING id
            "#,
        )
        .bind(&trip.correlation_key)
        .bind(trip.property_id.map(|p| p.value()))
        .bind(&trip.vehicle_type)
        .bind(trip.scheduled_at)
        .bind(&trip.origin_address)
        .bind(&trip.destination_label)
        .bind(trip.destination_lat)
        .bind(trip.destination_lng)
        .bind(trip.amount)
        .bind(&trip.currency)
        .bind(trip.status.as_str())
        .bind(trip.payment_status.as_str())
        .bind(&trip.payment_ref)
        .bind(&trip.payment_method)
        .bind(&trip.notes)
        .bind(trip.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(TransportBookingId::new(id))
    }

    /// Records payment the way the payment collaborator does
    pub async fn mark_invoice_paid(&self, invoice_id: InvoiceId, method: &str) -> TestResult<()> {
        sqlx::query(
            "UPDATE invoices SET status = 'PAID', payment_method = $2, paid_at = NOW(), updated_at = NOW() WHERE id = $1",
        )
        .bind(invoice_id.value())
        .bind(method)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

static SHARED_TEST_DB: OnceCell<Arc<TestDatabase>> = OnceCell::const_new();

/// One container shared by every test in the binary
///
/// # Panics
///
/// Panics if the container cannot be started
pub async fn get_shared_test_database() -> Arc<TestDatabase> {
    SHARED_TEST_DB
        .get_or_init(|| async {
            Arc::new(
                TestDatabase::new()
                    .await
                    .expect("Failed to create shared test database"),
            )
        })
        .await
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_connection_url() {
        let url = TestDatabaseConfig::default().connection_url();

        assert!(url.starts_with("postgres://"));
        assert!(url.contains(POSTGRES_USER));
        assert!(url.ends_with("/settlement_test"));
    }
}
