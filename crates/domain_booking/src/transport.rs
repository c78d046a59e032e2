//! Provisional transport bookings attached to a stay
//!
//! A trip references its stay through a `BOOKING:<id>` correlation key rather
//! than a foreign key. Trips wait in a pre-assignment state until the stay's
//! invoice is paid; activation then flips them to "awaiting assignment" and
//! fills in any descriptive fields the original transport request left blank.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{BookingId, PropertyId, TransportBookingId};

use crate::booking::Booking;
use crate::error::BookingError;
use crate::property::Property;

const CORRELATION_PREFIX: &str = "BOOKING:";

/// Prefix marking notes that were written by the system, not the requester
pub const AUTO_NOTES_PREFIX: &str = "Auto-generated:";

/// Notice written onto activated trips in place of a system placeholder
pub const TRANSPORT_POLICY_NOTICE: &str = "Auto-generated: Stay paid in full. \
The fare is prepaid through the platform; drivers must not collect cash from the guest. \
Confirm the guest's check-in code at pickup.";

/// Builds the correlation key linking a trip to a booking
pub fn correlation_key(booking_id: BookingId) -> String {
    format!("{}{}", CORRELATION_PREFIX, booking_id.value())
}

/// Extracts the booking id from a correlation key
pub fn parse_correlation_key(key: &str) -> Result<BookingId, BookingError> {
    key.trim()
        .strip_prefix(CORRELATION_PREFIX)
        .and_then(|raw| raw.parse::<i64>().ok())
        .and_then(BookingId::positive)
        .ok_or_else(|| BookingError::InvalidCorrelationKey(key.to_string()))
}

/// Assignment lifecycle of a trip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TripStatus {
    /// Waiting for the stay to be paid
    PendingPayment,
    /// Paid and visible to drivers
    AwaitingAssignment,
    /// A driver claimed the trip
    Assigned,
    InProgress,
    Completed,
    Cancelled,
}

impl TripStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripStatus::PendingPayment => "PENDING_PAYMENT",
            TripStatus::AwaitingAssignment => "AWAITING_ASSIGNMENT",
            TripStatus::Assigned => "ASSIGNED",
            TripStatus::InProgress => "IN_PROGRESS",
            TripStatus::Completed => "COMPLETED",
            TripStatus::Cancelled => "CANCELLED",
        }
    }

    /// States from which activation may move a trip
    pub fn is_pre_assignment(&self) -> bool {
        matches!(self, TripStatus::PendingPayment | TripStatus::AwaitingAssignment)
    }
}

impl fmt::Display for TripStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TripStatus {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING_PAYMENT" => Ok(TripStatus::PendingPayment),
            "AWAITING_ASSIGNMENT" => Ok(TripStatus::AwaitingAssignment),
            "ASSIGNED" => Ok(TripStatus::Assigned),
            "IN_PROGRESS" => Ok(TripStatus::InProgress),
            "COMPLETED" => Ok(TripStatus::Completed),
            "CANCELLED" => Ok(TripStatus::Cancelled),
            other => Err(BookingError::UnknownTripStatus(other.to_string())),
        }
    }
}

/// Payment state of a trip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TripPaymentStatus {
    Unpaid,
    Paid,
    Refunded,
}

impl TripPaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripPaymentStatus::Unpaid => "UNPAID",
            TripPaymentStatus::Paid => "PAID",
            TripPaymentStatus::Refunded => "REFUNDED",
        }
    }
}

impl fmt::Display for TripPaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TripPaymentStatus {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "UNPAID" => Ok(TripPaymentStatus::Unpaid),
            "PAID" => Ok(TripPaymentStatus::Paid),
            "REFUNDED" => Ok(TripPaymentStatus::Refunded),
            other => Err(BookingError::UnknownTripPaymentStatus(other.to_string())),
        }
    }
}

/// A ride tied to a stay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportBooking {
    pub id: TransportBookingId,
    /// `BOOKING:<id>` key of the originating stay
    pub correlation_key: String,
    pub property_id: Option<PropertyId>,
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

impl TransportBooking {
    /// Whether activation still has work to do on this trip
    ///
    /// A trip that is already awaiting assignment and paid has been activated
    /// before and is left alone, so repeated activation does not re-notify.
    pub fn awaits_activation(&self) -> bool {
        self.status.is_pre_assignment()
            && !(self.status == TripStatus::AwaitingAssignment
                && self.payment_status == TripPaymentStatus::Paid)
    }

    /// Whether the requester left a note of their own
    pub fn has_custom_notes(&self) -> bool {
        match self.notes.as_deref().map(str::trim) {
            None | Some("") => false,
            Some(notes) => !notes.starts_with(AUTO_NOTES_PREFIX),
        }
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map(str::trim).map_or(true, str::is_empty)
}

/// Fields to fill on a trip at activation
///
/// Every field is `Some` only when the trip lacks it and the stay can supply
/// it, so applying a backfill never overwrites data the requester provided.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripBackfill {
    pub property_id: Option<PropertyId>,
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

impl TripBackfill {
    /// Plans the backfill for one trip from its stay
    pub fn plan(trip: &TransportBooking, booking: &Booking, property: Option<&Property>) -> Self {
        let mut plan = TripBackfill::default();

        if trip.property_id.is_none() {
            plan.property_id = Some(booking.property_id);
        }
        if is_blank(trip.vehicle_type.as_deref()) {
            plan.vehicle_type = booking
                .transport_vehicle_type
                .clone()
                .filter(|v| !v.trim().is_empty());
        }
        if trip.scheduled_at.is_none() {
            plan.scheduled_at = booking.transport_scheduled_at;
        }
        if is_blank(trip.origin_address.as_deref()) {
            plan.origin_address = booking
                .transport_origin_address
                .clone()
                .filter(|v| !v.trim().is_empty());
        }
        if trip.amount.map_or(true, |a| a <= Decimal::ZERO) {
            let fare = booking.transport_fare();
            if fare > Decimal::ZERO {
                plan.amount = Some(fare);
            }
        }

        if let Some(property) = property {
            if is_blank(trip.destination_label.as_deref()) {
                plan.destination_label = property.destination_label();
            }
            if trip.destination_lat.is_none() || trip.destination_lng.is_none() {
                if let Some((lat, lng)) = property.coordinates() {
                    plan.destination_lat = trip.destination_lat.is_none().then_some(lat);
                    plan.destination_lng = trip.destination_lng.is_none().then_some(lng);
                }
            }
            if is_blank(trip.currency.as_deref()) && !property.currency.trim().is_empty() {
                plan.currency = Some(property.currency.clone());
            }
        }

        if !trip.has_custom_notes() && trip.notes.as_deref() != Some(TRANSPORT_POLICY_NOTICE) {
            plan.notes = Some(TRANSPORT_POLICY_NOTICE.to_string());
        }

        plan
    }

    pub fn is_empty(&self) -> bool {
        *self == TripBackfill::default()
    }

    /// Applies the planned fields to an in-memory trip
    pub fn apply_to(&self, trip: &mut TransportBooking) {
        if let Some(v) = self.property_id {
            trip.property_id = Some(v);
        }
        if let Some(v) = &self.vehicle_type {
            trip.vehicle_type = Some(v.clone());
        }
        if let Some(v) = self.scheduled_at {
            trip.scheduled_at = Some(v);
        }
        if let Some(v) = &self.origin_address {
            trip.origin_address = Some(v.clone());
        }
        if let Some(v) = &self.destination_label {
            trip.destination_label = Some(v.clone());
        }
        if let Some(v) = self.destination_lat {
            trip.destination_lat = Some(v);
        }
        if let Some(v) = self.destination_lng {
            trip.destination_lng = Some(v);
        }
        if let Some(v) = &self.currency {
            trip.currency = Some(v.clone());
        }
        if let Some(v) = self.amount {
            trip.amount = Some(v);
        }
        if let Some(v) = &self.notes {
            trip.notes = Some(v.clone());
        }
    }
}
