//! PostgreSQL transport adapter

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{
    DomainPort, HealthCheckResult, HealthCheckable, PortError, PropertyId, TransportBookingId,
};
use domain_billing::TransportPort;
use domain_booking::{TransportBooking, TripBackfill, TripPaymentStatus, TripStatus};

use crate::repositories::transport::{
    TransportRepository, TripFill, TripPaymentStatus as DbTripPaymentStatus, TripRow,
    TripStatus as DbTripStatus,
};

#[derive(Debug, Clone)]
pub struct PostgresTransportAdapter {
    repository: TransportRepository,
    pool: PgPool,
}

impl PostgresTransportAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: TransportRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresTransportAdapter {}

#[async_trait]
impl HealthCheckable for PostgresTransportAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        super::probe(&self.pool, "postgres-transport-adapter").await
    }
}

#[async_trait]
impl TransportPort for PostgresTransportAdapter {
    #[instrument(skip(self))]
    async fn find_by_correlation(&self, correlation_key: &str) -> Result<Vec<TransportBooking>, PortError> {
        let rows = self.repository.find_by_correlation(correlation_key).await?;
        Ok(rows.into_iter().map(row_to_trip).collect())
    }

    #[instrument(skip(self, payment_ref))]
    async fn mark_paid(
        &self,
        correlation_key: &str,
        payment_ref: &str,
        payment_method: &str,
    ) -> Result<Vec<TransportBooking>, PortError> {
        let rows = self
            .repository
            .mark_paid(correlation_key, payment_ref, payment_method)
            .await?;
        debug!(flipped = rows.len(), "Trips marked paid");
        Ok(rows.into_iter().map(row_to_trip).collect())
    }

    #[instrument(skip(self, backfill), fields(trip_id = %id))]
    async fn apply_backfill(
        &self,
        id: TransportBookingId,
        backfill: &TripBackfill,
    ) -> Result<TransportBooking, PortError> {
        let fill = TripFill {
            property_id: backfill.property_id.map(|p| p.value()),
            vehicle_type: backfill.vehicle_type.clone(),
            scheduled_at: backfill.scheduled_at,
            origin_address: backfill.origin_address.clone(),
            destination_label: backfill.destination_label.clone(),
            destination_lat: backfill.destination_lat,
            destination_lng: backfill.destination_lng,
            currency: backfill.currency.clone(),
            amount: backfill.amount,
            notes: backfill.notes.clone(),
        };
        let row = self.repository.backfill(id.value(), fill).await?;
        Ok(row_to_trip(row))
    }
}

fn row_to_trip(row: TripRow) -> TransportBooking {
    TransportBooking {
        id: TransportBookingId::new(row.id),
        correlation_key: row.correlation_key,
        property_id: row.property_id.map(PropertyId::new),
        vehicle_type: row.vehicle_type,
        scheduled_at: row.scheduled_at,
        origin_address: row.origin_address,
        destination_label: row.destination_label,
        destination_lat: row.destination_lat,
        destination_lng: row.destination_lng,
        amount: row.amount,
        currency: row.currency,
        status: row.status.into(),
        payment_status: row.payment_status.into(),
        payment_ref: row.payment_ref,
        payment_method: row.payment_method,
        notes: row.notes,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

impl From<DbTripStatus> for TripStatus {
    fn from(status: DbTripStatus) -> Self {
        match status {
            DbTripStatus::PendingPayment => TripStatus::PendingPayment,
            DbTripStatus::AwaitingAssignment => TripStatus::AwaitingAssignment,
            DbTripStatus::Assigned => TripStatus::Assigned,
            DbTripStatus::InProgress => TripStatus::InProgress,
            DbTripStatus::Completed => TripStatus::Completed,
            DbTripStatus::Cancelled => TripStatus::Cancelled,
        }
    }
}

impl From<DbTripPaymentStatus> for TripPaymentStatus {
    fn from(status: DbTripPaymentStatus) -> Self {
        match status {
            DbTripPaymentStatus::Unpaid => TripPaymentStatus::Unpaid,
            DbTripPaymentStatus::Paid => TripPaymentStatus::Paid,
            DbTripPaymentStatus::Refunded => TripPaymentStatus::Refunded,
        }
    }
}
