//! Events published to drivers

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{BookingId, TransportBookingId};
use domain_booking::TransportBooking;

/// Channel that available drivers subscribe to
pub const DRIVERS_AVAILABLE_CHANNEL: &str = "drivers:available";

/// A paid trip is ready to be claimed
///
/// Carries what a driver client needs to evaluate the trip without a
/// second lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripAvailableEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub trip_id: TransportBookingId,
    pub booking_id: BookingId,
    pub correlation_key: String,
    pub vehicle_type: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub origin_address: Option<String>,
    pub destination_label: Option<String>,
    pub destination_lat: Option<f64>,
    pub destination_lng: Option<f64>,
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
    pub notes: Option<String>,
    pub published_at: DateTime<Utc>,
}

impl TripAvailableEvent {
    pub const EVENT_TYPE: &'static str = "TRIP_AVAILABLE";

    pub fn from_trip(trip: &TransportBooking, booking_id: BookingId) -> Self {
        Self {
            event_type: Self::EVENT_TYPE.to_string(),
            trip_id: trip.id,
            booking_id,
            correlation_key: trip.correlation_key.clone(),
            vehicle_type: trip.vehicle_type.clone(),
            scheduled_at: trip.scheduled_at,
            origin_address: trip.origin_address.clone(),
            destination_label: trip.destination_label.clone(),
            destination_lat: trip.destination_lat,
            destination_lng: trip.destination_lng,
            amount: trip.amount,
            currency: trip.currency.clone(),
            notes: trip.notes.clone(),
            published_at: Utc::now(),
        }
    }
}
