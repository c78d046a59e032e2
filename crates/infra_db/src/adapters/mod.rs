//! Domain Adapters
//!
//! PostgreSQL implementations of the settlement ports. Each adapter:
//! - implements one port trait from `domain_billing`
//! - translates row types into domain models
//! - maps `DatabaseError` into `PortError`
//!
//! ```rust,ignore
//! use infra_db::adapters::PostgresLodgingAdapter;
//! use domain_billing::LodgingPort;
//!
//! let lodging = PostgresLodgingAdapter::new(pool);
//! let booking = lodging.find_booking(BookingId::new(42)).await?;
//! ```

pub mod lodging;
pub mod invoice;
pub mod checkin_code;
pub mod transport;
pub mod settings;

pub use lodging::PostgresLodgingAdapter;
pub use invoice::PostgresInvoiceAdapter;
pub use checkin_code::PostgresCheckinCodeAdapter;
pub use transport::PostgresTransportAdapter;
pub use settings::PostgresSettingsAdapter;

use chrono::Utc;
use sqlx::PgPool;

use core_kernel::{AdapterHealth, HealthCheckResult};

/// Round-trips `SELECT 1` and reports the latency
pub(crate) async fn probe(pool: &PgPool, adapter_id: &str) -> HealthCheckResult {
    let start = std::time::Instant::now();

    let result = sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(pool).await;
    let latency_ms = start.elapsed().as_millis() as u64;

    let (status, message) = match result {
        Ok(_) => (AdapterHealth::Healthy, None),
        Err(e) => (AdapterHealth::Unhealthy, Some(format!("Database error: {}", e))),
    };

    HealthCheckResult {
        adapter_id: adapter_id.to_string(),
        status,
        latency_ms,
        message,
        checked_at: Utc::now(),
    }
}
