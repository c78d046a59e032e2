//! Booking Domain - Lodging Reservations and Provisional Trips
//!
//! This crate models the records the settlement pipeline reads:
//!
//! - **Booking**: an accommodation reservation with optional transport add-on
//! - **Property**: the lodging being booked, with approval state and an
//!   embedded services object that may override the platform commission
//! - **TransportBooking**: a ride provisionally attached to a stay through the
//!   `BOOKING:<id>` correlation key, activated only once the stay is paid
//!
//! Bookings and trips are created by flows outside this system; the types here
//! only carry the fields settlement needs plus the backfill rules applied to
//! trips at activation time.

pub mod booking;
pub mod property;
pub mod transport;
pub mod legacy_notes;
pub mod error;

pub use booking::Booking;
pub use property::{Property, PropertyStatus, PropertyServices};
pub use transport::{
    TransportBooking, TripStatus, TripPaymentStatus, TripBackfill,
    correlation_key, parse_correlation_key, AUTO_NOTES_PREFIX, TRANSPORT_POLICY_NOTICE,
};
pub use legacy_notes::parse_legacy_transport_fare;
pub use error::BookingError;
