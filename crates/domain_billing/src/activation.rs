//! Transport activation
//!
//! Trips requested alongside a stay stay dormant until the stay's invoice is
//! paid. Activation flips them to "awaiting assignment", fills in any details
//! the transport request left blank and tells available drivers about them.
//!
//! Only the status flip is authoritative. Backfill writes and notifications
//! are best-effort: their failures are logged and never undo the flip.

use std::sync::Arc;
use tracing::{info, instrument, warn};

use core_kernel::{BookingId, TransportBookingId};
use domain_booking::{correlation_key, TransportBooking, TripBackfill};

use crate::error::SettlementError;
use crate::events::{TripAvailableEvent, DRIVERS_AVAILABLE_CHANNEL};
use crate::ports::{DriverNotifier, LodgingPort, TransportPort};

/// Payment method recorded when the caller supplies none
pub const DEFAULT_PAYMENT_METHOD: &str = "INVOICE";

/// What one activation run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivationReport {
    /// Trips flipped to awaiting assignment
    pub activated: Vec<TransportBookingId>,
    /// Trips whose blank fields were filled
    pub backfilled: usize,
    /// Events delivered to the drivers channel
    pub notified: usize,
}

impl ActivationReport {
    pub fn is_noop(&self) -> bool {
        self.activated.is_empty()
    }
}

/// Activates a booking's trips once its invoice is paid
pub struct TransportActivationService {
    lodging: Arc<dyn LodgingPort>,
    transport: Arc<dyn TransportPort>,
    notifier: Arc<dyn DriverNotifier>,
}

impl TransportActivationService {
    pub fn new(
        lodging: Arc<dyn LodgingPort>,
        transport: Arc<dyn TransportPort>,
        notifier: Arc<dyn DriverNotifier>,
    ) -> Self {
        Self {
            lodging,
            transport,
            notifier,
        }
    }

    /// Activates every pending trip correlated to the booking
    ///
    /// Callers must only invoke this for a booking whose invoice is paid-like.
    /// A missing payment reference falls back to the correlation key.
    #[instrument(skip(self), fields(booking_id = %booking_id))]
    pub async fn activate(
        &self,
        booking_id: BookingId,
        payment_ref: Option<&str>,
        payment_method: Option<&str>,
    ) -> Result<ActivationReport, SettlementError> {
        let key = correlation_key(booking_id);

        let pending = self.transport.find_by_correlation(&key).await?;
        if !pending.iter().any(TransportBooking::awaits_activation) {
            return Ok(ActivationReport::default());
        }

        let booking = self
            .lodging
            .find_booking(booking_id)
            .await?
            .ok_or(SettlementError::BookingNotFound(booking_id))?;
        let property = self.lodging.find_property(booking.property_id).await?;

        let payment_ref = non_blank(payment_ref).unwrap_or(key.as_str());
        let payment_method = non_blank(payment_method).unwrap_or(DEFAULT_PAYMENT_METHOD);

        let flipped = self.transport.mark_paid(&key, payment_ref, payment_method).await?;
        let mut report = ActivationReport {
            activated: flipped.iter().map(|t| t.id).collect(),
            ..Default::default()
        };

        let mut ready = Vec::with_capacity(flipped.len());
        for trip in flipped {
            let plan = TripBackfill::plan(&trip, &booking, property.as_ref());
            if plan.is_empty() {
                ready.push(trip);
                continue;
            }
            match self.transport.apply_backfill(trip.id, &plan).await {
                Ok(updated) => {
                    report.backfilled += 1;
                    ready.push(updated);
                }
                Err(err) => {
                    warn!(trip_id = %trip.id, error = %err, "Trip backfill failed, skipping");
                    ready.push(trip);
                }
            }
        }

        for trip in &ready {
            let event = TripAvailableEvent::from_trip(trip, booking_id);
            match self.notifier.publish(DRIVERS_AVAILABLE_CHANNEL, &event).await {
                Ok(()) => report.notified += 1,
                Err(err) => {
                    warn!(trip_id = %trip.id, error = %err, "Driver notification failed");
                }
            }
        }

        info!(
            activated = report.activated.len(),
            backfilled = report.backfilled,
            notified = report.notified,
            "Transport activated"
        );
        Ok(report)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
