//! Test Data Builders
//!
//! Builders for the records the settlement pipeline reads. Every builder
//! starts from an approved, transport-free stay priced in TZS; tests only
//! set the fields they care about.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::json;

use core_kernel::{BookingId, OwnerId, PropertyId, TransportBookingId};
use domain_booking::{
    correlation_key, Booking, Property, PropertyServices, PropertyStatus, TransportBooking,
    TripPaymentStatus, TripStatus,
};

use crate::fixtures::{AmountFixtures, StayFixtures};

/// Builder for properties
pub struct PropertyBuilder {
    property: Property,
}

impl Default for PropertyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertyBuilder {
    pub fn new() -> Self {
        Self {
            property: Property {
                id: PropertyId::new(1),
                owner_id: OwnerId::new(1),
                title: "Baobab Lodge".to_string(),
                status: PropertyStatus::Approved,
                currency: "TZS".to_string(),
                street: Some("Ali Hassan Mwinyi Rd".to_string()),
                ward: None,
                district: Some("Kinondoni".to_string()),
                region: Some("Dar es Salaam".to_string()),
                city: Some("Dar es Salaam".to_string()),
                latitude: Some(-6.7924),
                longitude: Some(39.2083),
                base_price: Some(AmountFixtures::nightly_rate()),
                services: PropertyServices::default(),
                created_at: Utc::now(),
            },
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.property.id = PropertyId::new(id);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.property.title = title.into();
        self
    }

    pub fn with_status(mut self, status: PropertyStatus) -> Self {
        self.property.status = status;
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.property.currency = currency.into();
        self
    }

    pub fn with_base_price(mut self, price: Option<Decimal>) -> Self {
        self.property.base_price = price;
        self
    }

    /// Sets a per-property commission override as a JSON number
    pub fn with_commission_override(mut self, percent: f64) -> Self {
        self.property.services = PropertyServices::new(json!({ "commissionPercent": percent }));
        self
    }

    pub fn with_services(mut self, services: serde_json::Value) -> Self {
        self.property.services = PropertyServices::new(services);
        self
    }

    pub fn without_location(mut self) -> Self {
        self.property.street = None;
        self.property.ward = None;
        self.property.district = None;
        self.property.region = None;
        self.property.city = None;
        self.property.latitude = None;
        self.property.longitude = None;
        self
    }

    pub fn build(self) -> Property {
        self.property
    }
}

/// Builder for bookings
pub struct BookingBuilder {
    booking: Booking,
}

impl Default for BookingBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BookingBuilder {
    pub fn new() -> Self {
        Self {
            booking: Booking {
                id: BookingId::new(1),
                property_id: PropertyId::new(1),
                check_in: StayFixtures::check_in(),
                check_out: StayFixtures::check_out(),
                rooms: 1,
                total_amount: Some(AmountFixtures::stay_subtotal()),
                include_transport: false,
                transport_fare: None,
                transport_origin_address: None,
                transport_vehicle_type: None,
                transport_scheduled_at: None,
                notes: None,
                created_at: Utc::now(),
            },
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.booking.id = BookingId::new(id);
        self
    }

    pub fn for_property(mut self, property_id: i64) -> Self {
        self.booking.property_id = PropertyId::new(property_id);
        self
    }

    pub fn with_dates(mut self, check_in: DateTime<Utc>, check_out: DateTime<Utc>) -> Self {
        self.booking.check_in = check_in;
        self.booking.check_out = check_out;
        self
    }

    pub fn with_total(mut self, total: Option<Decimal>) -> Self {
        self.booking.total_amount = total;
        self
    }

    /// Adds an airport pickup with an authoritative fare
    ///
    /// The booking total grows by the fare, as the booking flow stores it.
    pub fn with_transport(mut self, fare: Decimal) -> Self {
        self.booking.include_transport = true;
        self.booking.transport_fare = Some(fare);
        self.booking.transport_origin_address = Some("Julius Nyerere International Airport".to_string());
        self.booking.transport_vehicle_type = Some("SEDAN".to_string());
        self.booking.transport_scheduled_at = Some(StayFixtures::pickup());
        self.booking.total_amount = self.booking.total_amount.map(|total| total + fare);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.booking.notes = Some(notes.into());
        self
    }

    pub fn build(self) -> Booking {
        self.booking
    }
}

/// Builder for transport trips awaiting their stay's payment
pub struct TripBuilder {
    trip: TransportBooking,
}

impl TripBuilder {
    /// A bare trip correlated to `booking_id`, with nothing filled in
    pub fn for_booking(booking_id: i64) -> Self {
        let now = Utc::now();
        Self {
            trip: TransportBooking {
                id: TransportBookingId::new(1),
                correlation_key: correlation_key(BookingId::new(booking_id)),
                property_id: None,
                vehicle_type: None,
                scheduled_at: None,
                origin_address: None,
                destination_label: None,
                destination_lat: None,
                destination_lng: None,
                amount: None,
                currency: None,
                status: TripStatus::PendingPayment,
                payment_status: TripPaymentStatus::Unpaid,
                payment_ref: None,
                payment_method: None,
                notes: None,
                created_at: now,
                updated_at: now,
            },
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.trip.id = TransportBookingId::new(id);
        self
    }

    pub fn with_status(mut self, status: TripStatus) -> Self {
        self.trip.status = status;
        self
    }

    pub fn with_payment_status(mut self, status: TripPaymentStatus) -> Self {
        self.trip.payment_status = status;
        self
    }

    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.trip.amount = Some(amount);
        self
    }

    pub fn with_vehicle_type(mut self, vehicle_type: impl Into<String>) -> Self {
        self.trip.vehicle_type = Some(vehicle_type.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.trip.notes = Some(notes.into());
        self
    }

    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.trip.created_at = at;
        self.trip.updated_at = at;
        self
    }

    pub fn build(self) -> TransportBooking {
        self.trip
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Percentage;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_property_is_approved() {
        let property = PropertyBuilder::new().build();
        assert!(property.status.is_approved());
        assert!(property.services.commission_override().is_none());
    }

    #[test]
    fn test_commission_override_is_readable() {
        let property = PropertyBuilder::new().with_commission_override(15.0).build();
        assert_eq!(property.services.commission_override(), Some(Percentage::clamped(dec!(15))));
    }

    #[test]
    fn test_transport_raises_total() {
        let booking = BookingBuilder::new().with_transport(dec!(20000)).build();
        assert_eq!(booking.total_amount, Some(dec!(120000)));
        assert_eq!(booking.transport_fare(), dec!(20000));
        assert_eq!(booking.nights(), 2);
    }

    #[test]
    fn test_trip_awaits_activation() {
        let trip = TripBuilder::for_booking(7).build();
        assert_eq!(trip.correlation_key, "BOOKING:7");
        assert!(trip.awaits_activation());
    }
}
