//! PostgreSQL lodging adapter

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{
    BookingId, DomainPort, HealthCheckResult, HealthCheckable, OwnerId, PortError, PropertyId,
};
use domain_billing::LodgingPort;
use domain_booking::{Booking, Property, PropertyServices, PropertyStatus};

use crate::repositories::lodging::{
    BookingRow, LodgingRepository, PropertyRow, PropertyStatus as DbPropertyStatus,
};

/// Reads bookings and properties for settlement
#[derive(Debug, Clone)]
pub struct PostgresLodgingAdapter {
    repository: LodgingRepository,
    pool: PgPool,
}

impl PostgresLodgingAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: LodgingRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresLodgingAdapter {}

#[async_trait]
impl HealthCheckable for PostgresLodgingAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        super::probe(&self.pool, "postgres-lodging-adapter").await
    }
}

#[async_trait]
impl LodgingPort for PostgresLodgingAdapter {
    #[instrument(skip(self), fields(booking_id = %id))]
    async fn find_booking(&self, id: BookingId) -> Result<Option<Booking>, PortError> {
        debug!("Fetching booking");
        let row = self.repository.find_booking(id.value()).await?;
        Ok(row.map(row_to_booking))
    }

    #[instrument(skip(self), fields(property_id = %id))]
    async fn find_property(&self, id: PropertyId) -> Result<Option<Property>, PortError> {
        debug!("Fetching property");
        let row = self.repository.find_property(id.value()).await?;
        Ok(row.map(row_to_property))
    }
}

fn row_to_booking(row: BookingRow) -> Booking {
    Booking {
        id: BookingId::new(row.id),
        property_id: PropertyId::new(row.property_id),
        check_in: row.check_in,
        check_out: row.check_out,
        rooms: row.rooms,
        total_amount: row.total_amount,
        include_transport: row.include_transport,
        transport_fare: row.transport_fare,
        transport_origin_address: row.transport_origin_address,
        transport_vehicle_type: row.transport_vehicle_type,
        transport_scheduled_at: row.transport_scheduled_at,
        notes: row.notes,
        created_at: row.created_at,
    }
}

fn row_to_property(row: PropertyRow) -> Property {
    Property {
        id: PropertyId::new(row.id),
        owner_id: OwnerId::new(row.owner_id),
        title: row.title,
        status: row.status.into(),
        currency: row.currency,
        street: row.street,
        ward: row.ward,
        district: row.district,
        region: row.region,
        city: row.city,
        latitude: row.latitude,
        longitude: row.longitude,
        base_price: row.base_price,
        services: row.services.map(PropertyServices::new).unwrap_or_default(),
        created_at: row.created_at,
    }
}

impl From<DbPropertyStatus> for PropertyStatus {
    fn from(status: DbPropertyStatus) -> Self {
        match status {
            DbPropertyStatus::Draft => PropertyStatus::Draft,
            DbPropertyStatus::Pending => PropertyStatus::Pending,
            DbPropertyStatus::Approved => PropertyStatus::Approved,
            DbPropertyStatus::Rejected => PropertyStatus::Rejected,
            DbPropertyStatus::Suspended => PropertyStatus::Suspended,
        }
    }
}
